use shared::ToolKind;

use super::{EditCommand, EditContext, EditError, Outcome};

/// Switch the active tool. Undo always returns to the default tool.
pub struct SetToolCommand {
    tool: ToolKind,
}

impl SetToolCommand {
    pub fn new(tool: ToolKind) -> Self {
        Self { tool }
    }
}

impl EditCommand for SetToolCommand {
    fn label(&self) -> &'static str {
        "Set tool"
    }

    fn execute(&mut self, ctx: &mut EditContext<'_>) -> Result<Outcome, EditError> {
        if *ctx.tool == self.tool {
            return Ok(Outcome::NoOp);
        }
        tracing::debug!("Tool {:?} -> {:?}", ctx.tool, self.tool);
        *ctx.tool = self.tool;
        Ok(Outcome::Applied)
    }

    fn undo(&mut self, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
        *ctx.tool = ToolKind::Default;
        Ok(())
    }
}
