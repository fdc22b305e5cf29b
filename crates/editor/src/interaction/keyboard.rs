//! Keyboard handling for the viewport

use egui::{Key, Modifiers};
use glam::Vec3;
use shared::ToolKind;

use crate::viewport::CameraView;

/// World units the camera travels per key press
pub const KEY_MOVE_SPEED: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    MoveCamera(Vec3),
    Undo,
    SelectTool(ToolKind),
}

/// Map a key press to a viewport action
pub fn map_key(key: Key, modifiers: Modifiers, camera: &dyn CameraView) -> Option<KeyAction> {
    // Ctrl+Z undoes
    if (modifiers.command || modifiers.ctrl) && key == Key::Z {
        return Some(KeyAction::Undo);
    }

    let step = match key {
        Key::W => camera.front(),
        Key::S => -camera.front(),
        Key::A => -camera.right(),
        Key::D => camera.right(),
        // Shift+Space descends
        Key::Space if modifiers.shift => -camera.up(),
        Key::Space => camera.up(),
        Key::Escape => return Some(KeyAction::SelectTool(ToolKind::Default)),
        _ => return None,
    };
    Some(KeyAction::MoveCamera(step * KEY_MOVE_SPEED))
}
