//! Core statechart types and logic.
//!
//! This module contains the pure functional core of the engine:
//! - State identifiers via the `State` trait
//! - The `Machine` description tying the machine's types together
//! - The tagged `Event` union and generation-tagged origins
//! - Guard predicates for transition control
//! - Immutable snapshots and transition history
//!
//! Nothing in this module performs I/O or spawns work.

mod event;
mod guard;
mod history;
mod machine;
mod snapshot;
mod state;

pub use event::{Event, Generation, Origin};
pub use guard::Guard;
pub use history::{StateHistory, TransitionRecord};
pub use machine::{EventKind, Machine, MachineEvent};
pub use snapshot::{Snapshot, Status};
pub use state::State;

/// Snapshot type of a machine.
pub type MachineSnapshot<M> = Snapshot<<M as Machine>::State, <M as Machine>::Context>;
