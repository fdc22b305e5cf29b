//! Integration tests: live pointer input through the headless harness, with
//! real ray casting against procedurally generated meshes.

use egui::{Key, Modifiers, Pos2};
use glam::{Quat, Vec3};
use shared::ToolKind;
use unbox_editor_lib::geometry::primitives::GENERATED_CYLINDER_NAME;
use unbox_editor_lib::geometry::{MeshHandle, MeshId};
use unbox_editor_lib::harness::EditorHarness;

/// Everything undo must bring back, per mesh in scene order
#[derive(Debug)]
struct Snapshot {
    id: MeshId,
    name: String,
    vertices: Vec<Vec3>,
    color: [f32; 3],
    orientation: Quat,
    translation: Vec3,
}

fn snapshot(h: &EditorHarness) -> Vec<Snapshot> {
    h.controller
        .scene()
        .iter()
        .map(|handle| {
            let m = handle.borrow();
            Snapshot {
                id: m.id(),
                name: m.name().to_string(),
                vertices: m.vertices().to_vec(),
                color: m.color(),
                orientation: m.orientation(),
                translation: m.translation(),
            }
        })
        .collect()
}

fn assert_same(before: &[Snapshot], after: &[Snapshot]) {
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after) {
        assert_eq!(b.id, a.id);
        assert_eq!(b.name, a.name);
        assert_eq!(b.vertices, a.vertices);
        assert_eq!(b.color, a.color);
        assert!(b.translation.abs_diff_eq(a.translation, 1e-5), "{b:?} vs {a:?}");
        assert!(b.orientation.abs_diff_eq(a.orientation, 1e-5), "{b:?} vs {a:?}");
    }
}

fn center_pixel(h: &EditorHarness, mesh: &MeshHandle) -> Pos2 {
    let world = {
        let m = mesh.borrow();
        m.model_matrix().transform_point3(m.compute_center())
    };
    h.screen_point_of(world).unwrap()
}

/// Four 2x2x2 boxes around the origin, the origin itself left empty
fn four_boxes(h: &mut EditorHarness) -> [MeshHandle; 4] {
    [
        h.add_box("a", Vec3::new(-3.0, -2.0, 0.0), 2.0, 2.0, 2.0),
        h.add_box("b", Vec3::new(3.0, -2.0, 0.0), 2.0, 2.0, 2.0),
        h.add_box("c", Vec3::new(-3.0, 2.0, 0.0), 2.0, 2.0, 2.0),
        h.add_box("d", Vec3::new(3.0, 2.0, 0.0), 2.0, 2.0, 2.0),
    ]
}

#[test]
fn test_full_session_undoes_to_initial_scene() {
    let mut h = EditorHarness::new();
    let [a, b, c, d] = four_boxes(&mut h);
    let initial = snapshot(&h);

    // move a 50 px right: 50 * 0.2 = 10 units along +X
    h.set_tool(ToolKind::Move).unwrap();
    let from = center_pixel(&h, &a);
    h.drag(from, from + egui::vec2(50.0, 0.0), 5).unwrap();
    assert!(a.borrow().translation().abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4));

    // rotate b by 50 px of drag = 10 degrees about Y
    h.set_tool(ToolKind::Rotate).unwrap();
    let from = center_pixel(&h, &b);
    h.rotate_drag(from, from + egui::vec2(30.0, 40.0), Vec3::Y).unwrap();
    let expected = Quat::from_rotation_y(10f32.to_radians());
    assert!(b.borrow().orientation().abs_diff_eq(expected, 1e-5));

    // delete c
    h.set_tool(ToolKind::Delete).unwrap();
    let at = center_pixel(&h, &c);
    h.click(at).unwrap();
    assert!(!h.controller.scene().contains(&c));

    // replace d by its bounding cylinder, in place
    h.set_tool(ToolKind::Replace).unwrap();
    let at = center_pixel(&h, &d);
    h.click(at).unwrap();
    assert!(!h.controller.scene().contains(&d));
    let last = h.controller.scene().get(2).unwrap().clone();
    assert_eq!(last.borrow().name(), GENERATED_CYLINDER_NAME);

    assert_eq!(
        h.controller.history().labels(),
        vec!["Set tool", "Move", "Set tool", "Rotate", "Set tool", "Delete", "Set tool", "Replace"]
    );

    while h.undo().unwrap() {}
    assert_same(&initial, &snapshot(&h));
    assert_eq!(h.tool(), ToolKind::Default);
    assert_eq!(h.history_len(), 0);
}

#[test]
fn test_click_on_empty_space_changes_nothing() {
    let mut h = EditorHarness::new();
    four_boxes(&mut h);
    let before = snapshot(&h);

    for tool in [ToolKind::Delete, ToolKind::Replace] {
        h.set_tool(tool).unwrap();
        let history = h.history_len();
        h.click(Pos2::new(400.0, 300.0)).unwrap();
        assert_eq!(h.history_len(), history);
        assert_same(&before, &snapshot(&h));
    }
}

#[test]
fn test_nearer_box_is_deleted_first() {
    let mut h = EditorHarness::new();
    let far = h.add_box("far", Vec3::new(0.0, 0.0, -5.0), 2.0, 2.0, 2.0);
    let near = h.add_box("near", Vec3::ZERO, 2.0, 2.0, 2.0);

    h.set_tool(ToolKind::Delete).unwrap();
    h.click(Pos2::new(400.0, 300.0)).unwrap();
    assert!(!h.controller.scene().contains(&near));
    assert!(h.controller.scene().contains(&far));

    h.click(Pos2::new(400.0, 300.0)).unwrap();
    assert_eq!(h.mesh_count(), 0);

    // undo restores in reverse order, each in its original slot
    h.undo().unwrap();
    assert_eq!(h.controller.scene().meshes(), &[far.clone()]);
    h.undo().unwrap();
    assert_eq!(h.controller.scene().meshes(), &[far, near]);
}

#[test]
fn test_moved_mesh_is_picked_where_it_is_drawn() {
    let mut h = EditorHarness::new();
    let a = h.add_box("a", Vec3::ZERO, 2.0, 2.0, 2.0);

    h.set_tool(ToolKind::Move).unwrap();
    let from = Pos2::new(400.0, 300.0);
    h.drag(from, from + egui::vec2(15.0, 0.0), 3).unwrap();
    assert!(a.borrow().translation().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-4));

    h.set_tool(ToolKind::Delete).unwrap();
    h.click(Pos2::new(400.0, 300.0)).unwrap();
    assert_eq!(h.mesh_count(), 1);

    let at = h.screen_point_of(Vec3::new(3.0, 0.0, 1.0)).unwrap();
    h.click(at).unwrap();
    assert_eq!(h.mesh_count(), 0);
}

#[test]
fn test_escape_returns_to_default_tool() {
    let mut h = EditorHarness::new();
    h.set_tool(ToolKind::Rotate).unwrap();
    h.controller.key_pressed(Key::Escape, Modifiers::NONE).unwrap();
    assert_eq!(h.tool(), ToolKind::Default);
    assert_eq!(h.history_len(), 2);

    // undoing a tool switch always lands on the default tool
    h.controller.key_pressed(Key::Z, Modifiers::CTRL).unwrap();
    assert_eq!(h.tool(), ToolKind::Default);
    assert_eq!(h.history_len(), 1);
}

#[test]
fn test_camera_input_requests_redraws() {
    let mut h = EditorHarness::new();
    let before = h.redraw_count();
    h.controller.scroll(1.0);
    h.controller.key_pressed(Key::D, Modifiers::NONE).unwrap();
    assert!(h.redraw_count() >= before + 2);
    assert!(h.camera_position().abs_diff_eq(Vec3::new(1.5, 0.0, 9.0), 1e-4));
}
