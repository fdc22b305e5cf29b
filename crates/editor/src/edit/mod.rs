//! Undoable edit commands
//!
//! Every command keeps its own stack of mementos, one per execution, so an
//! instance can be executed and undone repeatedly in reverse order.

mod delete;
mod move_mesh;
mod replace;
mod rotate;
mod tool;

pub use delete::DeleteCommand;
pub use move_mesh::MoveCommand;
pub use replace::{bounding_cylinder, ReplaceCommand};
pub use rotate::RotateCommand;
pub use tool::SetToolCommand;

use egui::Pos2;
use shared::ToolKind;
use thiserror::Error;

use crate::external::mesh_io::MeshIoError;
use crate::external::ExternalError;
use crate::geometry::{GeometryError, MeshId};
use crate::state::scene::Scene;
use crate::viewport::{CameraView, PickHit, Picker, RenderSurface};

/// Result of a successful `execute`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and a memento was recorded
    Applied,
    /// Nothing to act on; no state changed, no memento recorded
    NoOp,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("cannot undo {0}: nothing was recorded")]
    InvalidState(&'static str),
    #[error("rotation axis must be non-zero")]
    InvalidAxis,
    #[error("mesh {0} is not in the scene")]
    NotInScene(MeshId),
    #[error("no meshes to process")]
    EmptyScene,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    MeshIo(#[from] MeshIoError),
    #[error(transparent)]
    External(#[from] ExternalError),
}

/// Everything a command may touch, borrowed for one execute or undo call.
pub struct EditContext<'a> {
    pub scene: &'a mut Scene,
    pub surface: &'a mut dyn RenderSurface,
    pub camera: &'a dyn CameraView,
    pub picker: &'a dyn Picker,
    /// Pointer position the command was triggered at
    pub pointer: Pos2,
    /// Active tool slot
    pub tool: &'a mut ToolKind,
}

impl EditContext<'_> {
    /// Hit-test the scene at the triggering pointer position
    pub fn pick(&self) -> Option<PickHit> {
        self.picker
            .pick(&*self.scene, self.camera, &*self.surface, self.pointer)
    }

    pub fn invalidate(&mut self) {
        self.surface.invalidate();
    }
}

/// An undoable operation
pub trait EditCommand {
    /// Short name for logs and history display
    fn label(&self) -> &'static str;

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError>;

    /// Reverse the most recent execution
    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError>;
}
