use strum::{Display, EnumString};

use crate::state::graphics_state::GraphicsState;

/// What a saved-state guard does when its body unwinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum UnwindPolicy {
    /// Pop the state and restore the canvas on every exit path.
    #[default]
    Restore,
    /// Leave state and canvas as they were when the body aborted.
    Leave,
}

/// Restore points of the graphics state, last in first out.
#[derive(Debug, Default)]
pub struct StateStack {
    saved: Vec<GraphicsState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a copy of `current` as the next restore point.
    pub fn push(&mut self, current: &GraphicsState) {
        self.saved.push(current.copy());
    }

    pub fn pop(&mut self) -> Option<GraphicsState> {
        self.saved.pop()
    }

    /// Number of unmatched pushes.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
