//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the current context and the
//! event being processed. They decide whether a transition is eligible and
//! never have side effects.

use super::event::Event;
use super::machine::Machine;

/// Pure predicate that determines if a transition can be taken.
///
/// Guards of the transitions declared for one trigger are evaluated in
/// declaration order; the first one that passes wins.
///
/// # Example
///
/// ```rust
/// use keystate::core::{Event, Guard, Machine, MachineEvent};
/// use keystate::state_enum;
///
/// state_enum! {
///     pub enum Counter {
///         Counting,
///     }
/// }
///
/// #[derive(Debug)]
/// pub struct Add(u32);
///
/// impl MachineEvent for Add {
///     type Kind = ();
///     fn kind(&self) {}
/// }
///
/// pub struct CounterMachine;
///
/// impl Machine for CounterMachine {
///     type State = Counter;
///     type Context = u32;
///     type Event = Add;
///     type Output = ();
///     type Error = ();
///     type Env = ();
/// }
///
/// let below_limit = Guard::<CounterMachine>::new(|total, event| match event {
///     Event::External(Add(n)) => total + n <= 10,
///     _ => false,
/// });
///
/// assert!(below_limit.check(&3, &Event::External(Add(7))));
/// assert!(!below_limit.check(&3, &Event::External(Add(8))));
/// ```
pub struct Guard<M: Machine> {
    predicate: Box<dyn Fn(&M::Context, &Event<M>) -> bool + Send + Sync>,
}

impl<M: Machine> Guard<M> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and side-effect free.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that only looks at the context.
    pub fn context<F>(predicate: F) -> Self
    where
        F: Fn(&M::Context) -> bool + Send + Sync + 'static,
    {
        Self::new(move |context, _| predicate(context))
    }

    /// Check if the guard allows the transition.
    pub fn check(&self, context: &M::Context, event: &Event<M>) -> bool {
        (self.predicate)(context, event)
    }
}
