use glam::Vec3;
use shared::Rgb;

use super::{EditCommand, EditContext, EditError, Outcome};
use crate::geometry::primitives::{cylinder_mesh, CYLINDER_SEGMENTS};
use crate::geometry::{Mesh, MeshHandle};

struct ReplaceMemento {
    original: MeshHandle,
    replacement: MeshHandle,
    /// Color the original had before it was replaced
    color: Rgb,
}

/// Replace the mesh under the pointer by its bounding cylinder. The target
/// is picked when the command executes.
#[derive(Default)]
pub struct ReplaceCommand {
    mementos: Vec<ReplaceMemento>,
}

impl ReplaceCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Upright cylinder enclosing `mesh`: radius is half the middle dimension,
/// height is the longer horizontal dimension. Carries the mesh's transform.
///
/// Not the `max(min(dx, dz), dy) / 2` radius with `min(dx, dz)` height: that
/// sizing can leave the cylinder shorter than the mesh.
pub fn bounding_cylinder(mesh: &Mesh) -> Mesh {
    let center = mesh.compute_center();
    let dims = mesh.compute_dimensions();

    let mut sorted = dims.to_array();
    sorted.sort_by(f32::total_cmp);
    let radius = sorted[1] * 0.5;
    let height = dims.x.max(dims.z);

    let mut cylinder = cylinder_mesh(center, radius, height, CYLINDER_SEGMENTS, Vec3::Y);
    cylinder.set_transform_from(mesh);
    cylinder
}

impl EditCommand for ReplaceCommand {
    fn label(&self) -> &'static str {
        "Replace"
    }

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        let Some(hit) = ctx.pick() else {
            tracing::debug!("Replace: nothing under pointer");
            return Ok(Outcome::NoOp);
        };

        let (replacement, color) = {
            let original = hit.mesh.borrow();
            (MeshHandle::new(bounding_cylinder(&original)), original.color())
        };
        tracing::info!("Replaced '{}' with a cylinder", hit.mesh.borrow().name());

        ctx.scene.replace(&hit.mesh, replacement.clone());
        self.mementos.push(ReplaceMemento {
            original: hit.mesh,
            replacement,
            color,
        });
        ctx.invalidate();
        Ok(Outcome::Applied)
    }

    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
        let Some(memento) = self.mementos.pop() else {
            return Ok(());
        };
        memento.original.borrow_mut().set_color(memento.color);
        // Back into the replacement's slot
        ctx.scene.replace(&memento.replacement, memento.original);
        ctx.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::test_support::Rig;
    use crate::fixtures::{self, FixedPicker};
    use crate::geometry::primitives::GENERATED_CYLINDER_NAME;

    #[test]
    fn test_bounding_cylinder_size() {
        // dims (2, 4, 6): middle 4 → radius 2, longer horizontal 6 → height 6
        let mesh = fixtures::box_corners("b", Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 2.0, 3.0));
        let cyl = bounding_cylinder(&mesh);
        let dims = cyl.compute_dimensions();
        assert!((dims.x - 4.0).abs() < 1e-3);
        assert!((dims.y - 6.0).abs() < 1e-5);
        assert!(cyl.compute_center().abs_diff_eq(Vec3::ONE, 1e-3));
        assert_eq!(cyl.name(), GENERATED_CYLINDER_NAME);
        assert_eq!(cyl.color(), shared::RED);
    }

    #[test]
    fn test_replace_and_undo_restore_slot_and_color() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let b = rig
            .scene
            .add_mesh(fixtures::box_corners("b", Vec3::ZERO, Vec3::ONE).with_color(shared::CYAN));
        let c = rig.scene.add_mesh(fixtures::unit_triangle("c"));
        rig.picker = FixedPicker::hit(&b);

        let mut cmd = ReplaceCommand::new();
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::Applied);
        assert_eq!(rig.scene.len(), 3);
        assert!(!rig.scene.contains(&b));
        assert_eq!(rig.scene.meshes()[1].borrow().name(), GENERATED_CYLINDER_NAME);

        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(rig.scene.meshes(), &[a, b.clone(), c]);
        assert_eq!(b.borrow().color(), shared::CYAN);
    }

    #[test]
    fn test_replace_miss_is_noop() {
        let mut rig = Rig::new();
        rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let mut cmd = ReplaceCommand::new();
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::NoOp);
        assert!(cmd.undo(&mut rig.ctx()).is_ok());
        assert_eq!(rig.scene.meshes()[0].borrow().name(), "a");
    }
}
