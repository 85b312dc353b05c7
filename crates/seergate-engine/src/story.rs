//! The story-engine boundary trait.

use seergate_core::error::GateError;
use serde::{Deserialize, Serialize};

/// One selectable choice, in the engine's native order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Position within the engine's current choice list.
    pub index: usize,
    /// Display text.
    pub text: String,
}

/// Opaque external narrative session.
///
/// The engine owns the script position and a named-variable map, and can
/// serialize its full state as an opaque string for persistence. Everything
/// Seergate knows about the narrative flows through this trait.
pub trait StoryEngine: Send {
    /// Whether another unit of output is available.
    fn can_continue(&self) -> bool;

    /// Advances one unit and returns the emitted text, trimmed. May be empty.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the script is exhausted or corrupt.
    fn next_line(&mut self) -> Result<String, GateError>;

    /// Tags attached to the most recently emitted unit.
    fn current_tags(&self) -> Vec<String>;

    /// Choices currently on offer (empty while output remains).
    fn current_choices(&self) -> Vec<Choice>;

    /// Selects a choice by index.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if no such choice is on offer.
    fn choose(&mut self, index: usize) -> Result<(), GateError>;

    /// Discards all progress and returns to the script's starting state.
    fn reset(&mut self);

    /// Reads a named variable, or `None` if unset.
    fn get_var(&self, name: &str) -> Option<serde_json::Value>;

    /// Writes a named variable.
    fn set_var(&mut self, name: &str, value: serde_json::Value);

    /// Serializes the full engine state as an opaque string.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if serialization fails.
    fn state_json(&self) -> Result<String, GateError>;

    /// Restores the engine from a snapshot produced by [`state_json`].
    ///
    /// # Errors
    ///
    /// Returns `GateError::Engine` if the snapshot is corrupt. Callers on
    /// the boot path log the error and continue from fresh state.
    ///
    /// [`state_json`]: StoryEngine::state_json
    fn restore_state(&mut self, snapshot: &str) -> Result<(), GateError>;
}
