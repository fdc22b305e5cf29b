//! Undo history of executed edit commands

use std::collections::VecDeque;

use crate::edit::{EditCommand, EditContext, EditError, Outcome};

/// Oldest entries are dropped past this depth
pub const MAX_HISTORY: usize = 100;

/// LIFO stack of executed commands
#[derive(Default)]
pub struct CommandHistory {
    stack: VecDeque<Box<dyn EditCommand>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Box<dyn EditCommand>) {
        self.stack.push_back(command);
        self.trim();
    }

    /// Most recently pushed command, or `None` when empty
    pub fn pop(&mut self) -> Option<Box<dyn EditCommand>> {
        self.stack.pop_back()
    }

    /// Push, then execute. A `NoOp` outcome takes the entry back out so the
    /// history only grows for commands that changed something; an error
    /// leaves the attempted entry in place. The oldest entry is only
    /// dropped once the new one is known to stay.
    pub fn push_and_execute(
        &mut self,
        command: Box<dyn EditCommand>,
        ctx: &mut EditContext<'_>,
    ) -> Result<Outcome, EditError> {
        let label = command.label();
        self.stack.push_back(command);
        let Some(pushed) = self.stack.back_mut() else {
            return Ok(Outcome::NoOp);
        };
        let result = pushed.execute(ctx);
        match result {
            Ok(Outcome::NoOp) => {
                self.stack.pop_back();
            }
            Ok(Outcome::Applied) => {
                self.trim();
                tracing::debug!("History: {label} ({} entries)", self.stack.len());
            }
            Err(_) => self.trim(),
        }
        result
    }

    fn trim(&mut self) {
        while self.stack.len() > MAX_HISTORY {
            self.stack.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Label of the command `pop` would return
    pub fn peek_label(&self) -> Option<&'static str> {
        self.stack.back().map(|c| c.label())
    }

    /// Labels from oldest to newest
    pub fn labels(&self) -> Vec<&'static str> {
        self.stack.iter().map(|c| c.label()).collect()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
