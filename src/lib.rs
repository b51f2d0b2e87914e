//! Keystate: a run-to-completion statechart interpreter
//!
//! Keystate keeps Stillwater's "pure core, imperative shell" split. State
//! graphs are plain data built once and validated up front; guards and
//! `assign` actions are pure functions; side effects live in `effect`
//! actions and in invoked services described as Stillwater effects. The
//! [`runtime::Interpreter`] is the shell that runs them.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state ids via the `State` trait and `state_enum!`
//! - **Machine**: Ties together state, context, event, service and
//!   environment types
//! - **Guards**: Pure predicates over context and event
//! - **Actions**: Ordered `assign` and `effect` steps on transitions, entry
//!   and exit
//! - **Services and delays**: Asynchronous work bound to one state instance
//!   and cancelled when it is exited
//! - **Interpreter**: FIFO mailbox, macrosteps, snapshots and subscribers
//!
//! # Example
//!
//! ```rust
//! use keystate::builder::{MachineBuilder, StateNodeBuilder, TransitionBuilder};
//! use keystate::core::{Machine, MachineEvent};
//! use keystate::runtime::Interpreter;
//! use keystate::state_enum;
//!
//! state_enum! {
//!     pub enum Counter {
//!         Counting,
//!         Full,
//!     }
//!     final: [Full]
//! }
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! pub enum CounterEvent {
//!     Increment,
//! }
//!
//! impl MachineEvent for CounterEvent {
//!     type Kind = CounterEvent;
//!     fn kind(&self) -> CounterEvent {
//!         *self
//!     }
//! }
//!
//! pub struct CounterMachine;
//!
//! impl Machine for CounterMachine {
//!     type State = Counter;
//!     type Context = u32;
//!     type Event = CounterEvent;
//!     type Output = ();
//!     type Error = ();
//!     type Env = ();
//! }
//!
//! let graph = MachineBuilder::<CounterMachine>::new("counter")
//!     .initial(Counter::Counting)
//!     .context(0)
//!     .state(
//!         StateNodeBuilder::new(Counter::Counting)
//!             .on(
//!                 CounterEvent::Increment,
//!                 TransitionBuilder::new().assign("increment", |n: &u32, _| n + 1),
//!             )
//!             .always(TransitionBuilder::new().to(Counter::Full).when(|n: &u32, _| *n >= 2)),
//!     )
//!     .state(StateNodeBuilder::new(Counter::Full))
//!     .build()
//!     .unwrap();
//!
//! let counter = Interpreter::new(graph, ());
//! counter.start().unwrap();
//! counter.send(CounterEvent::Increment).unwrap();
//! counter.send(CounterEvent::Increment).unwrap();
//!
//! let snapshot = counter.snapshot();
//! assert_eq!(snapshot.state, Counter::Full);
//! assert_eq!(snapshot.context, 2);
//! assert!(snapshot.status.is_terminal());
//! ```

pub mod auth;
pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod graph;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, StateNodeBuilder, TransitionBuilder};
pub use core::{Event, Guard, Machine, MachineEvent, Snapshot, State, StateHistory, Status};
pub use runtime::{Interpreter, InterpreterError, InterpreterOptions, Subscription};
