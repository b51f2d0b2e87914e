//! State nodes of the graph.

use crate::core::{Event, EventKind, Machine};
use crate::effects::{Action, Invoke, Transition};
use std::collections::HashMap;
use std::time::Duration;

/// A delayed transition armed on state entry.
pub struct After<M: Machine> {
    pub delay: Duration,
    pub transitions: Vec<Transition<M>>,
}

/// A named state with its actions, outgoing transitions and activities.
pub struct StateNode<M: Machine> {
    pub id: M::State,
    pub entry: Vec<Action<M>>,
    pub exit: Vec<Action<M>>,
    pub on: HashMap<EventKind<M>, Vec<Transition<M>>>,
    pub always: Vec<Transition<M>>,
    pub invoke: Option<Invoke<M>>,
    pub after: Option<After<M>>,
}

impl<M: Machine> StateNode<M> {
    pub fn new(id: M::State) -> Self {
        Self {
            id,
            entry: Vec::new(),
            exit: Vec::new(),
            on: HashMap::new(),
            always: Vec::new(),
            invoke: None,
            after: None,
        }
    }

    /// Candidate transitions for an event, in declaration order.
    ///
    /// Completions are routed to this node's own service or delay; the
    /// caller is responsible for discarding completions of exited instances.
    pub fn candidates(&self, event: &Event<M>) -> &[Transition<M>] {
        match event {
            Event::Init => &[],
            Event::External(_) => event
                .kind()
                .and_then(|kind| self.on.get(&kind))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            Event::Done { .. } => self
                .invoke
                .as_ref()
                .map(|i| i.on_done.as_slice())
                .unwrap_or(&[]),
            Event::Failed { .. } => self
                .invoke
                .as_ref()
                .map(|i| i.on_error.as_slice())
                .unwrap_or(&[]),
            Event::After { .. } => self
                .after
                .as_ref()
                .map(|a| a.transitions.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Whether entering this node starts asynchronous work.
    pub fn has_activities(&self) -> bool {
        self.invoke.is_some() || self.after.is_some()
    }

    /// Every transition declared on this node.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition<M>> {
        self.on
            .values()
            .flatten()
            .chain(self.always.iter())
            .chain(self.invoke.iter().flat_map(|i| i.on_done.iter().chain(i.on_error.iter())))
            .chain(self.after.iter().flat_map(|a| a.transitions.iter()))
    }
}
