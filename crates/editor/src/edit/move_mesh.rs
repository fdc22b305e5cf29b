use glam::Vec3;

use super::{EditCommand, EditContext, EditError, Outcome};
use crate::geometry::MeshHandle;

struct MoveMemento {
    mesh: MeshHandle,
    movement: Vec3,
}

/// Translate a mesh by a fixed vector
pub struct MoveCommand {
    mesh: MeshHandle,
    movement: Vec3,
    mementos: Vec<MoveMemento>,
}

impl MoveCommand {
    pub fn new(mesh: MeshHandle, movement: Vec3) -> Self {
        Self {
            mesh,
            movement,
            mementos: Vec::new(),
        }
    }

    pub fn movement(&self) -> Vec3 {
        self.movement
    }
}

impl EditCommand for MoveCommand {
    fn label(&self) -> &'static str {
        "Move"
    }

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        if self.movement == Vec3::ZERO {
            return Ok(Outcome::NoOp);
        }
        self.mesh.borrow_mut().translate(self.movement);
        tracing::debug!("Moved '{}' by {}", self.mesh.borrow().name(), self.movement);
        self.mementos.push(MoveMemento {
            mesh: self.mesh.clone(),
            movement: self.movement,
        });
        ctx.invalidate();
        Ok(Outcome::Applied)
    }

    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
        // Undo before any move is a silent no-op
        let Some(memento) = self.mementos.pop() else {
            return Ok(());
        };
        memento.mesh.borrow_mut().translate(-memento.movement);
        ctx.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::test_support::Rig;
    use crate::fixtures;

    #[test]
    fn test_move_and_undo() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));

        let mut cmd = MoveCommand::new(a.clone(), Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::Applied);
        assert_eq!(a.borrow().translation(), Vec3::new(1.0, 0.0, -2.0));

        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(a.borrow().translation(), Vec3::ZERO);
    }

    #[test]
    fn test_repeated_execute_undoes_in_reverse() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let mut cmd = MoveCommand::new(a.clone(), Vec3::X);

        cmd.execute(&mut rig.ctx()).unwrap();
        cmd.execute(&mut rig.ctx()).unwrap();
        assert_eq!(a.borrow().translation(), Vec3::new(2.0, 0.0, 0.0));
        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(a.borrow().translation(), Vec3::X);
        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(a.borrow().translation(), Vec3::ZERO);
    }

    #[test]
    fn test_zero_move_is_noop() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let mut cmd = MoveCommand::new(a, Vec3::ZERO);
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::NoOp);
        assert_eq!(rig.surface.redraw_count(), 0);
    }

    #[test]
    fn test_undo_without_memento_is_silent() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let mut cmd = MoveCommand::new(a.clone(), Vec3::X);
        assert!(cmd.undo(&mut rig.ctx()).is_ok());
        assert_eq!(a.borrow().translation(), Vec3::ZERO);
    }
}
