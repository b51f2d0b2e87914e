//! The imperative shell: interpreters running state graphs.
//!
//! An [`Interpreter`] owns one live snapshot of a [`StateGraph`], a FIFO
//! mailbox and the tokio tasks of the live state instance. Stepping is
//! synchronous and serialized; services and timers re-enter only through
//! the mailbox, tagged with the generation of the state instance that
//! started them.
//!
//! [`StateGraph`]: crate::graph::StateGraph

mod activity;
mod error;
mod interpreter;
mod options;
mod step;
mod subscription;

pub use error::InterpreterError;
pub use interpreter::Interpreter;
pub use options::InterpreterOptions;
pub use subscription::{Listener, Subscription};
