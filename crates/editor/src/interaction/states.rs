//! Per-tool pointer handlers
//!
//! Exactly one state is active. The controller swaps it when the active tool
//! changes; states never switch themselves.

use egui::Pos2;
use glam::Vec3;
use shared::ToolKind;

use super::Sensitivity;
use crate::edit::{DeleteCommand, EditContext, EditError, MoveCommand, ReplaceCommand, RotateCommand};
use crate::geometry::MeshHandle;
use crate::state::scene::CommandHistory;

/// Borrowed view of the controller handed to the active state for one event
pub struct Frame<'a> {
    pub ctx: EditContext<'a>,
    pub history: &'a mut CommandHistory,
    pub sensitivity: &'a Sensitivity,
}

/// Move tool drag state
#[derive(Debug, Clone, Default)]
pub struct MoveDrag {
    pub target: Option<MeshHandle>,
    pub dragging: bool,
    pub last: Pos2,
    pub accumulated: Vec3,
}

/// Rotate tool drag state
#[derive(Debug, Clone)]
pub struct RotateDrag {
    pub target: Option<MeshHandle>,
    /// Set from outside (gizmo handle grabbed)
    pub rotating: bool,
    pub axis: Vec3,
    pub last: Pos2,
    /// Degrees
    pub accumulated: f32,
}

impl Default for RotateDrag {
    fn default() -> Self {
        Self {
            target: None,
            rotating: false,
            axis: Vec3::Y,
            last: Pos2::ZERO,
            accumulated: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum InteractionState {
    /// Hit test only; remembers the last hit for highlighting
    Default { selected: Option<MeshHandle> },
    Move(MoveDrag),
    Rotate(RotateDrag),
    Delete,
    Replace,
}

impl InteractionState {
    pub fn for_tool(tool: ToolKind) -> Self {
        match tool {
            ToolKind::Default => InteractionState::Default { selected: None },
            ToolKind::Move => InteractionState::Move(MoveDrag::default()),
            ToolKind::Rotate => InteractionState::Rotate(RotateDrag::default()),
            ToolKind::Delete => InteractionState::Delete,
            ToolKind::Replace => InteractionState::Replace,
        }
    }

    pub fn tool(&self) -> ToolKind {
        match self {
            InteractionState::Default { .. } => ToolKind::Default,
            InteractionState::Move(_) => ToolKind::Move,
            InteractionState::Rotate(_) => ToolKind::Rotate,
            InteractionState::Delete => ToolKind::Delete,
            InteractionState::Replace => ToolKind::Replace,
        }
    }

    /// Mesh the state currently points at, if any
    pub fn selection(&self) -> Option<&MeshHandle> {
        match self {
            InteractionState::Default { selected } => selected.as_ref(),
            InteractionState::Move(drag) => drag.target.as_ref(),
            InteractionState::Rotate(drag) => drag.target.as_ref(),
            InteractionState::Delete | InteractionState::Replace => None,
        }
    }

    /// Arm the rotate drag about `axis`. Returns false outside the rotate tool.
    pub fn begin_rotation(&mut self, axis: Vec3) -> bool {
        match self {
            InteractionState::Rotate(drag) => {
                drag.rotating = true;
                drag.axis = axis;
                true
            }
            _ => false,
        }
    }

    pub fn on_pointer_down(&mut self, frame: &mut Frame<'_>) -> Result<(), EditError> {
        let pointer = frame.ctx.pointer;
        match self {
            InteractionState::Default { selected } => {
                *selected = frame.ctx.pick().map(|hit| hit.mesh);
                frame.ctx.invalidate();
            }
            InteractionState::Move(drag) => {
                if let Some(hit) = frame.ctx.pick() {
                    drag.target = Some(hit.mesh);
                    drag.dragging = true;
                    drag.last = pointer;
                    drag.accumulated = Vec3::ZERO;
                }
            }
            InteractionState::Rotate(drag) => {
                if let Some(hit) = frame.ctx.pick() {
                    drag.target = Some(hit.mesh);
                }
                drag.last = pointer;
                drag.accumulated = 0.0;
            }
            InteractionState::Delete => {
                frame
                    .history
                    .push_and_execute(Box::new(DeleteCommand::new()), &mut frame.ctx)?;
            }
            InteractionState::Replace => {
                frame
                    .history
                    .push_and_execute(Box::new(ReplaceCommand::new()), &mut frame.ctx)?;
            }
        }
        Ok(())
    }

    pub fn on_pointer_move(&mut self, frame: &mut Frame<'_>) -> Result<(), EditError> {
        let pointer = frame.ctx.pointer;
        match self {
            InteractionState::Move(drag) if drag.dragging => {
                let delta = pointer - drag.last;
                let s = frame.sensitivity.mesh_move;
                drag.accumulated += Vec3::new(delta.x * s, 0.0, delta.y * s);
                drag.last = pointer;
                frame.ctx.invalidate();
            }
            InteractionState::Rotate(drag) => {
                let delta = pointer - drag.last;
                drag.last = pointer;
                if drag.rotating {
                    drag.accumulated += delta.length() * frame.sensitivity.mesh_rotate;
                    frame.ctx.invalidate();
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn on_pointer_up(&mut self, frame: &mut Frame<'_>) -> Result<(), EditError> {
        match self {
            InteractionState::Move(drag) if drag.dragging => {
                let movement = std::mem::take(&mut drag.accumulated);
                drag.dragging = false;
                if let (Some(target), true) = (&drag.target, movement != Vec3::ZERO) {
                    let command = MoveCommand::new(target.clone(), movement);
                    frame.history.push_and_execute(Box::new(command), &mut frame.ctx)?;
                }
            }
            InteractionState::Rotate(drag) if drag.rotating => {
                let angle = std::mem::take(&mut drag.accumulated);
                drag.rotating = false;
                if let (Some(target), true) = (&drag.target, angle != 0.0) {
                    let command = RotateCommand::new(target.clone(), drag.axis, angle);
                    frame.history.push_and_execute(Box::new(command), &mut frame.ctx)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
