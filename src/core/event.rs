//! Events consumed by the interpreter.
//!
//! Caller events and internal completions share one tagged union so that
//! guards and actions can match on a typed payload instead of casting.

use super::machine::{EventKind, Machine, MachineEvent};
use super::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-interpreter counter identifying one entry into a state.
///
/// Every state entry allocates a fresh generation, so a completion tagged
/// with an older generation belongs to an instance that has been exited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The state instance an asynchronous completion belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Origin<S: State> {
    pub state: S,
    pub generation: Generation,
}

/// An event as seen by guards and actions.
pub enum Event<M: Machine> {
    /// Seen by the entry actions of the initial state.
    Init,

    /// Delivered by a caller through `send`.
    External(M::Event),

    /// The state's invoked service resolved.
    Done {
        origin: Origin<M::State>,
        output: M::Output,
    },

    /// The state's invoked service rejected.
    Failed {
        origin: Origin<M::State>,
        error: M::Error,
    },

    /// The state's delay elapsed.
    After { origin: Origin<M::State> },
}

impl<M: Machine> Event<M> {
    /// Origin of an internal completion; `None` for `Init` and caller events.
    pub fn origin(&self) -> Option<Origin<M::State>> {
        match self {
            Event::Done { origin, .. } | Event::Failed { origin, .. } | Event::After { origin } => {
                Some(*origin)
            }
            Event::Init | Event::External(_) => None,
        }
    }

    pub fn kind(&self) -> Option<EventKind<M>> {
        match self {
            Event::External(event) => Some(event.kind()),
            _ => None,
        }
    }

    pub fn external(&self) -> Option<&M::Event> {
        match self {
            Event::External(event) => Some(event),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&M::Output> {
        match self {
            Event::Done { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&M::Error> {
        match self {
            Event::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Short label for logs and history records.
    pub fn label(&self) -> String {
        match self {
            Event::Init => "init".to_string(),
            Event::External(event) => format!("{:?}", event.kind()),
            Event::Done { .. } => "done".to_string(),
            Event::Failed { .. } => "error".to_string(),
            Event::After { .. } => "after".to_string(),
        }
    }
}

impl<M: Machine> fmt::Debug for Event<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Init => f.write_str("Init"),
            Event::External(event) => f.debug_tuple("External").field(event).finish(),
            Event::Done { origin, output } => f
                .debug_struct("Done")
                .field("origin", origin)
                .field("output", output)
                .finish(),
            Event::Failed { origin, error } => f
                .debug_struct("Failed")
                .field("origin", origin)
                .field("error", error)
                .finish(),
            Event::After { origin } => f.debug_struct("After").field("origin", origin).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_enum;

    state_enum! {
        enum Phase {
            Waiting,
            Running,
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Ping {
        Ping,
    }

    impl MachineEvent for Ping {
        type Kind = Ping;

        fn kind(&self) -> Ping {
            *self
        }
    }

    struct PingMachine;

    impl Machine for PingMachine {
        type State = Phase;
        type Context = ();
        type Event = Ping;
        type Output = u32;
        type Error = String;
        type Env = ();
    }

    fn origin() -> Origin<Phase> {
        Origin {
            state: Phase::Running,
            generation: Generation::default().next(),
        }
    }

    #[test]
    fn generations_are_monotonic() {
        let first = Generation::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(second.to_string(), "#1");
    }

    #[test]
    fn only_internal_events_carry_an_origin() {
        assert!(Event::<PingMachine>::Init.origin().is_none());
        assert!(Event::<PingMachine>::External(Ping::Ping).origin().is_none());

        let done: Event<PingMachine> = Event::Done {
            origin: origin(),
            output: 42,
        };
        assert_eq!(done.origin(), Some(origin()));
        assert_eq!(done.output(), Some(&42));
        assert!(done.error().is_none());
    }

    #[test]
    fn kind_is_only_defined_for_external_events() {
        let event: Event<PingMachine> = Event::External(Ping::Ping);
        assert_eq!(event.kind(), Some(Ping::Ping));
        assert_eq!(event.label(), "Ping");

        let failed: Event<PingMachine> = Event::Failed {
            origin: origin(),
            error: "boom".to_string(),
        };
        assert!(failed.kind().is_none());
        assert_eq!(failed.error().map(String::as_str), Some("boom"));
        assert_eq!(failed.label(), "error");
    }
}
