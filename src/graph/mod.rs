//! The static state graph.
//!
//! A [`StateGraph`] is built once through
//! [`MachineBuilder`](crate::builder::MachineBuilder), validated, and then
//! only read by interpreters.

mod node;

pub use node::{After, StateNode};

use crate::core::Machine;
use std::collections::HashMap;

/// Validated definition of a machine: its states, initial state and
/// initial context.
pub struct StateGraph<M: Machine> {
    id: String,
    initial: M::State,
    context: M::Context,
    nodes: HashMap<M::State, StateNode<M>>,
}

impl<M: Machine> StateGraph<M> {
    /// Assemble a graph. Callers go through the builder, which validates
    /// that every referenced state exists.
    pub(crate) fn new(
        id: String,
        initial: M::State,
        context: M::Context,
        nodes: HashMap<M::State, StateNode<M>>,
    ) -> Self {
        Self {
            id,
            initial,
            context,
            nodes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial(&self) -> M::State {
        self.initial
    }

    pub fn initial_context(&self) -> &M::Context {
        &self.context
    }

    pub fn node(&self, state: M::State) -> Option<&StateNode<M>> {
        self.nodes.get(&state)
    }

    pub fn states(&self) -> impl Iterator<Item = M::State> + '_ {
        self.nodes.keys().copied()
    }

    /// Whether any state invokes a service or arms a delay, which requires
    /// a tokio runtime when the interpreter starts.
    pub fn requires_runtime(&self) -> bool {
        self.nodes.values().any(StateNode::has_activities)
    }
}
