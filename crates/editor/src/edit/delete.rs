use shared::Rgb;

use super::{EditCommand, EditContext, EditError, Outcome};
use crate::geometry::MeshHandle;
use crate::state::scene::short_id;

struct DeleteMemento {
    mesh: MeshHandle,
    color: Rgb,
    index: usize,
}

/// Delete the mesh under the pointer. The target is picked when the command
/// executes, not when it is built.
#[derive(Default)]
pub struct DeleteCommand {
    mementos: Vec<DeleteMemento>,
}

impl DeleteCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditCommand for DeleteCommand {
    fn label(&self) -> &'static str {
        "Delete"
    }

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        let Some(hit) = ctx.pick() else {
            tracing::debug!("Delete: nothing under pointer");
            return Ok(Outcome::NoOp);
        };
        let Some(index) = ctx.scene.remove(&hit.mesh) else {
            return Ok(Outcome::NoOp);
        };

        let color = hit.mesh.borrow().color();
        tracing::info!(
            "Deleted '{}' ({})",
            hit.mesh.borrow().name(),
            short_id(&hit.mesh.id().to_string())
        );
        self.mementos.push(DeleteMemento {
            mesh: hit.mesh,
            color,
            index,
        });
        ctx.invalidate();
        Ok(Outcome::Applied)
    }

    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
        let Some(memento) = self.mementos.pop() else {
            return Ok(());
        };
        memento.mesh.borrow_mut().set_color(memento.color);
        tracing::info!("Restored '{}'", memento.mesh.borrow().name());
        ctx.scene.insert(memento.index, memento.mesh);
        ctx.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::test_support::Rig;
    use crate::fixtures::{self, FixedPicker};

    #[test]
    fn test_delete_removes_picked_and_undo_restores_slot() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let b = rig.scene.add_mesh(fixtures::unit_triangle("b"));
        let c = rig.scene.add_mesh(fixtures::unit_triangle("c"));
        rig.picker = FixedPicker::hit(&b);

        let mut cmd = DeleteCommand::new();
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::Applied);
        assert_eq!(rig.scene.meshes(), &[a.clone(), c.clone()]);
        assert_eq!(rig.surface.redraw_count(), 1);

        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(rig.scene.meshes(), &[a, b, c]);
    }

    #[test]
    fn test_delete_miss_is_noop() {
        let mut rig = Rig::new();
        rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let version = rig.scene.version();

        let mut cmd = DeleteCommand::new();
        assert_eq!(cmd.execute(&mut rig.ctx()).unwrap(), Outcome::NoOp);
        assert_eq!(rig.scene.len(), 1);
        assert_eq!(rig.scene.version(), version);
        assert_eq!(rig.surface.redraw_count(), 0);
    }

    #[test]
    fn test_undo_without_memento_is_silent() {
        let mut rig = Rig::new();
        let mut cmd = DeleteCommand::new();
        assert!(cmd.undo(&mut rig.ctx()).is_ok());
    }

    #[test]
    fn test_memento_keeps_mesh_alive() {
        let mut rig = Rig::new();
        let a = rig.scene.add_mesh(fixtures::unit_triangle("a"));
        let id = a.id();
        rig.picker = FixedPicker::hit(&a);

        let mut cmd = DeleteCommand::new();
        cmd.execute(&mut rig.ctx()).unwrap();
        rig.picker = FixedPicker::miss();
        assert!(rig.scene.is_empty());
        // our handle plus the memento
        assert_eq!(a.ref_count(), 2);
        drop(a);

        cmd.undo(&mut rig.ctx()).unwrap();
        assert_eq!(rig.scene.meshes()[0].id(), id);
    }
}
