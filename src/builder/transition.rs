//! Builder for constructing state transitions.

use crate::core::{Event, Guard, Machine};
use crate::effects::{Action, ActionError, Transition};

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<M: Machine> {
    target: Option<M::State>,
    guard: Option<Guard<M>>,
    actions: Vec<Action<M>>,
}

impl<M: Machine> TransitionBuilder<M> {
    /// Create a new transition builder. Without a target the transition is
    /// internal: it runs its actions without leaving the state.
    pub fn new() -> Self {
        Self {
            target: None,
            guard: None,
            actions: Vec::new(),
        }
    }

    /// Set the target state.
    pub fn to(mut self, state: M::State) -> Self {
        self.target = Some(state);
        self
    }

    /// Add a guard predicate (optional).
    pub fn guard(mut self, guard: Guard<M>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Append an action.
    pub fn action(mut self, action: Action<M>) -> Self {
        self.actions.push(action);
        self
    }

    /// Append an `assign` action.
    pub fn assign<F>(self, name: &'static str, update: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>) -> M::Context + Send + Sync + 'static,
    {
        self.action(Action::assign(name, update))
    }

    /// Append an `effect` action.
    pub fn effect<F>(self, name: &'static str, effect: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>, &M::Env) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.action(Action::effect(name, effect))
    }

    /// Build the transition.
    pub fn build(self) -> Transition<M> {
        Transition {
            guard: self.guard,
            actions: self.actions,
            target: self.target,
        }
    }
}

impl<M: Machine> Default for TransitionBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Machine> From<TransitionBuilder<M>> for Transition<M> {
    fn from(builder: TransitionBuilder<M>) -> Self {
        builder.build()
    }
}
