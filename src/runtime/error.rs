//! Errors reported by interpreters.

use crate::effects::ActionError;
use thiserror::Error;

/// Errors returned by [`Interpreter`](crate::runtime::Interpreter)
/// operations.
///
/// Guard misses and stale service outcomes are not errors; they are
/// absorbed by the interpreter and only logged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InterpreterError {
    #[error("Interpreter already started")]
    AlreadyStarted,

    #[error("Interpreter has not been started. Call .start() before sending events")]
    NotStarted,

    #[error("Machine invokes services or arms delays but no tokio runtime is available")]
    NoRuntime,

    #[error("Action '{action}' failed in state '{state}': {source}")]
    EffectFailed {
        state: String,
        action: &'static str,
        source: ActionError,
    },

    #[error("State '{state}' did not settle within {limit} eventless transitions")]
    MicrostepLimit { state: String, limit: usize },
}
