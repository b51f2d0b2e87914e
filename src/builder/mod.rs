//! Builder API for ergonomic state graph construction.
//!
//! This module provides fluent builders and macros for declaring state
//! graphs with minimal boilerplate while maintaining type safety. Guards,
//! actions and services are closures attached directly to the graph, so a
//! reference to an undefined one cannot be written down at all; references
//! to undeclared states are reported by [`MachineBuilder::build`].

pub mod error;
pub mod machine;
pub mod macros;
pub mod node;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use node::{InvokeBuilder, StateNodeBuilder};
pub use transition::TransitionBuilder;

use crate::core::{Event, Machine};

/// Create an unguarded transition to `target`.
///
/// # Example
///
/// ```
/// use keystate::builder::transition_to;
/// use keystate::core::{Machine, MachineEvent};
/// use keystate::state_enum;
///
/// state_enum! {
///     pub enum Step {
///         Start,
///         End,
///     }
///     final: [End]
/// }
///
/// #[derive(Debug)]
/// pub struct Next;
///
/// impl MachineEvent for Next {
///     type Kind = ();
///     fn kind(&self) {}
/// }
///
/// pub struct Steps;
///
/// impl Machine for Steps {
///     type State = Step;
///     type Context = ();
///     type Event = Next;
///     type Output = ();
///     type Error = ();
///     type Env = ();
/// }
///
/// let transition = transition_to::<Steps>(Step::End).build();
/// assert_eq!(transition.target, Some(Step::End));
/// ```
pub fn transition_to<M: Machine>(target: M::State) -> TransitionBuilder<M> {
    TransitionBuilder::new().to(target)
}

/// Create a transition to `target` guarded by a predicate.
pub fn guarded_transition<M, F>(target: M::State, guard: F) -> TransitionBuilder<M>
where
    M: Machine,
    F: Fn(&M::Context, &Event<M>) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new().to(target).when(guard)
}
