//! Interpreter tuning knobs.

use serde::{Deserialize, Serialize};

/// Options controlling a single interpreter.
///
/// Every field has a default, so a partial JSON object deserializes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterOptions {
    /// Maximum eventless transitions followed within one macrostep.
    pub max_microsteps: usize,

    /// Number of transition records kept in the interpreter history.
    pub history_limit: usize,
}

impl InterpreterOptions {
    pub const DEFAULT_MAX_MICROSTEPS: usize = 32;
    pub const DEFAULT_HISTORY_LIMIT: usize = 128;

    pub fn with_max_microsteps(mut self, max_microsteps: usize) -> Self {
        self.max_microsteps = max_microsteps;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_microsteps: Self::DEFAULT_MAX_MICROSTEPS,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }
}
