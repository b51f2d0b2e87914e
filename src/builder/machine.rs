//! Builder for constructing state graphs.

use crate::builder::error::BuildError;
use crate::builder::node::StateNodeBuilder;
use crate::core::{Machine, State};
use crate::graph::{StateGraph, StateNode};
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<BuildError>>;

/// Builder for constructing state graphs with a fluent API.
///
/// `build` validates the whole graph and reports every problem it finds,
/// not just the first one.
pub struct MachineBuilder<M: Machine> {
    id: String,
    initial: Option<M::State>,
    context: Option<M::Context>,
    states: Vec<StateNodeBuilder<M>>,
}

impl<M: Machine> MachineBuilder<M> {
    /// Create a new builder for a machine named `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: None,
            context: None,
            states: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: M::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the initial context (required).
    pub fn context(mut self, context: M::Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a state node.
    pub fn state(mut self, state: StateNodeBuilder<M>) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple state nodes at once.
    pub fn states(mut self, states: Vec<StateNodeBuilder<M>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Validate and build the graph.
    pub fn build(self) -> Result<StateGraph<M>, BuildError> {
        let mut checks: Vec<Check> = Vec::new();

        if self.initial.is_none() {
            checks.push(Validation::fail(BuildError::MissingInitialState));
        }
        if self.context.is_none() {
            checks.push(Validation::fail(BuildError::MissingContext));
        }
        if self.states.is_empty() {
            checks.push(Validation::fail(BuildError::NoStates));
        }

        let mut nodes: HashMap<M::State, StateNode<M>> = HashMap::new();
        for builder in self.states {
            let (node, errors) = builder.finish();
            checks.extend(errors.into_iter().map(Validation::fail));
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                checks.push(Validation::fail(BuildError::DuplicateState {
                    state: id.name().to_string(),
                }));
            }
        }

        if let Some(initial) = self.initial {
            if !nodes.is_empty() && !nodes.contains_key(&initial) {
                checks.push(Validation::fail(BuildError::UnknownInitialState {
                    state: initial.name().to_string(),
                }));
            }
        }

        checks.extend(check_targets(&nodes));

        match (Validation::all_vec(checks), self.initial, self.context) {
            (Validation::Success(_), Some(initial), Some(context)) => {
                Ok(StateGraph::new(self.id, initial, context, nodes))
            }
            (Validation::Failure(violations), _, _) => Err(BuildError::from_violations(violations)),
            (Validation::Success(_), None, _) => Err(BuildError::MissingInitialState),
            (Validation::Success(_), _, None) => Err(BuildError::MissingContext),
        }
    }
}

/// Every transition target must name a declared state.
fn check_targets<M: Machine>(nodes: &HashMap<M::State, StateNode<M>>) -> Vec<Check> {
    let mut checks = Vec::new();
    for node in nodes.values() {
        for target in node.transitions().filter_map(|t| t.target) {
            if !nodes.contains_key(&target) {
                checks.push(Validation::fail(BuildError::UnknownTarget {
                    from: node.id.name().to_string(),
                    target: target.name().to_string(),
                }));
            }
        }
    }
    checks
}

impl<M: Machine> Default for MachineBuilder<M> {
    fn default() -> Self {
        Self::new("machine")
    }
}
