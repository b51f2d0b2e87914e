//! Builders for state nodes and their invoked services.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Event, EventKind, Machine, State};
use crate::effects::{Action, Invoke, ServiceFactory};
use crate::graph::{After, StateNode};
use std::sync::Arc;
use std::time::Duration;
use stillwater::effect::BoxedEffect;

/// Builder for an invoked service and its outcome transitions.
pub struct InvokeBuilder<M: Machine> {
    id: &'static str,
    src: ServiceFactory<M>,
    on_done: Vec<TransitionBuilder<M>>,
    on_error: Vec<TransitionBuilder<M>>,
}

impl<M: Machine> InvokeBuilder<M> {
    /// Declare a service. `src` creates a fresh effect on every entry.
    pub fn new<F>(id: &'static str, src: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>) -> BoxedEffect<M::Output, M::Error, M::Env>
            + Send
            + Sync
            + 'static,
    {
        Self {
            id,
            src: Arc::new(src),
            on_done: Vec::new(),
            on_error: Vec::new(),
        }
    }

    /// Add a transition taken when the service resolves.
    pub fn on_done(mut self, transition: TransitionBuilder<M>) -> Self {
        self.on_done.push(transition);
        self
    }

    /// Add a transition taken when the service rejects.
    pub fn on_error(mut self, transition: TransitionBuilder<M>) -> Self {
        self.on_error.push(transition);
        self
    }

    fn build(self) -> Invoke<M> {
        Invoke {
            id: self.id,
            src: self.src,
            on_done: self.on_done.into_iter().map(TransitionBuilder::build).collect(),
            on_error: self.on_error.into_iter().map(TransitionBuilder::build).collect(),
        }
    }
}

/// Builder for a single state node.
pub struct StateNodeBuilder<M: Machine> {
    node: StateNode<M>,
    errors: Vec<BuildError>,
}

impl<M: Machine> StateNodeBuilder<M> {
    pub fn new(id: M::State) -> Self {
        Self {
            node: StateNode::new(id),
            errors: Vec::new(),
        }
    }

    /// Append an entry action.
    pub fn entry(mut self, action: Action<M>) -> Self {
        self.node.entry.push(action);
        self
    }

    /// Append an exit action.
    pub fn exit(mut self, action: Action<M>) -> Self {
        self.node.exit.push(action);
        self
    }

    /// Add a transition for an event kind. Transitions for the same kind
    /// are tried in the order they are added.
    pub fn on(mut self, kind: EventKind<M>, transition: TransitionBuilder<M>) -> Self {
        self.node
            .on
            .entry(kind)
            .or_default()
            .push(transition.build());
        self
    }

    /// Add an eventless transition, tried whenever the state is settled.
    pub fn always(mut self, transition: TransitionBuilder<M>) -> Self {
        self.node.always.push(transition.build());
        self
    }

    /// Declare the state's invoked service.
    pub fn invoke(mut self, invoke: InvokeBuilder<M>) -> Self {
        if self.node.invoke.is_some() {
            self.errors.push(BuildError::MultipleServices {
                state: self.node.id.name().to_string(),
            });
        } else {
            self.node.invoke = Some(invoke.build());
        }
        self
    }

    /// Add a transition taken `delay` after the state was entered. Several
    /// guarded transitions may share the state's single delay.
    pub fn after(mut self, delay: Duration, transition: TransitionBuilder<M>) -> Self {
        match &mut self.node.after {
            Some(after) if after.delay == delay => after.transitions.push(transition.build()),
            Some(_) => self.errors.push(BuildError::MultipleDelays {
                state: self.node.id.name().to_string(),
            }),
            None => {
                self.node.after = Some(After {
                    delay,
                    transitions: vec![transition.build()],
                })
            }
        }
        self
    }

    pub fn id(&self) -> M::State {
        self.node.id
    }

    pub(crate) fn finish(self) -> (StateNode<M>, Vec<BuildError>) {
        (self.node, self.errors)
    }
}
