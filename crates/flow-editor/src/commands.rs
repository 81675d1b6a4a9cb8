//! Undo/redo command stack.
//!
//! Each undo step records the graph snapshot before and after a mutation.
//! Snapshots are `Arc`s shared with the engine, so recording one costs a
//! pointer clone.
//!
//! Drag gestures are batched: every move of one drag is applied live, and
//! a single step spanning the whole drag is pushed when the batch closes.

use crate::engine::{Applied, Engine, GraphMutation};
use flow_core::{FlowError, Graph};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Command {
    before: Arc<Graph>,
    after: Arc<Graph>,
    description: String,
}

/// Undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<Arc<Graph>>,
    batch_description: String,
    /// Whether any mutation succeeded during the current batch.
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_description: String::new(),
            batch_dirty: false,
        }
    }

    /// Start a batch. Mutations until the matching [`end_batch`](Self::end_batch)
    /// become one undo step.
    pub fn begin_batch(&mut self, engine: &Engine, description: &str) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(engine.snapshot());
            self.batch_description = description.to_string();
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes after at least one
    /// successful mutation, push one step.
    pub fn end_batch(&mut self, engine: &Engine) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if let Some(before) = self.batch_snapshot.take()
            && self.batch_dirty
        {
            let description = std::mem::take(&mut self.batch_description);
            self.push(Command {
                before,
                after: engine.snapshot(),
                description,
            });
        }
        self.batch_dirty = false;
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply a mutation and record it. Failed mutations record nothing.
    pub fn execute(
        &mut self,
        engine: &mut Engine,
        mutation: GraphMutation,
        description: &str,
    ) -> Result<Applied, FlowError> {
        let before = engine.snapshot();
        let applied = engine.apply(mutation)?;

        if self.batch_depth > 0 {
            self.batch_dirty = true;
        } else {
            self.push(Command {
                before,
                after: engine.snapshot(),
                description: description.to_string(),
            });
        }
        Ok(applied)
    }

    /// Undo the last step, returning its description.
    pub fn undo(&mut self, engine: &mut Engine) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        engine.restore(&cmd.before);
        let description = cmd.description.clone();
        self.redo_stack.push(cmd);
        log::debug!("undo: {description}");
        Some(description)
    }

    /// Redo the last undone step, returning its description.
    pub fn redo(&mut self, engine: &mut Engine) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        engine.restore(&cmd.after);
        let description = cmd.description.clone();
        self.undo_stack.push(cmd);
        log::debug!("redo: {description}");
        Some(description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all history (e.g. after the host reloads the document).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}
