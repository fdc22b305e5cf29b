use glam::{Quat, Vec3};

use super::{EditCommand, EditContext, EditError, Outcome};
use crate::geometry::MeshHandle;

struct RotateMemento {
    mesh: MeshHandle,
    inverse: Quat,
}

/// Rotate a mesh about an axis by an angle in degrees
pub struct RotateCommand {
    mesh: MeshHandle,
    axis: Vec3,
    angle_degrees: f32,
    mementos: Vec<RotateMemento>,
}

impl RotateCommand {
    pub fn new(mesh: MeshHandle, axis: Vec3, angle_degrees: f32) -> Self {
        Self {
            mesh,
            axis,
            angle_degrees,
            mementos: Vec::new(),
        }
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }
}

impl EditCommand for RotateCommand {
    fn label(&self) -> &'static str {
        "Rotate"
    }

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        let axis = self.axis.try_normalize().ok_or(EditError::InvalidAxis)?;
        let rotation = Quat::from_axis_angle(axis, self.angle_degrees.to_radians());

        self.mesh.borrow_mut().rotate(rotation);
        tracing::debug!(
            "Rotated '{}' by {:.2}° about {}",
            self.mesh.borrow().name(),
            self.angle_degrees,
            axis
        );
        self.mementos.push(RotateMemento {
            mesh: self.mesh.clone(),
            inverse: rotation.inverse(),
        });
        ctx.invalidate();
        Ok(Outcome::Applied)
    }

    /// Unlike the other commands, undo with nothing recorded is an error.
    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
        let memento = self
            .mementos
            .pop()
            .ok_or(EditError::InvalidState("rotation"))?;
        memento.mesh.borrow_mut().rotate(memento.inverse);
        ctx.invalidate();
        Ok(())
    }
}
