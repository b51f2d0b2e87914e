//! Immutable views of a running machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Constructed; `start` has not been called.
    NotStarted,
    /// Accepting and processing events.
    Running,
    /// Settled into a final state; further events are dropped.
    Done,
    /// Stopped by the owner; further events are dropped.
    Stopped,
    /// A service or timer outcome could not be processed. The live
    /// activities were cancelled and further events are dropped.
    Failed,
}

impl Status {
    /// Whether events sent now would be processed.
    pub fn accepts_events(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Whether the interpreter has finished for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Done | Status::Stopped | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::NotStarted => "not started",
            Status::Running => "running",
            Status::Done => "done",
            Status::Stopped => "stopped",
            Status::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The current state id and context, as published to subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<S, C> {
    pub state: S,
    pub context: C,
    pub status: Status,
}

impl<S: PartialEq, C> Snapshot<S, C> {
    /// Whether the machine currently sits in `state`.
    pub fn matches(&self, state: S) -> bool {
        self.state == state
    }
}
