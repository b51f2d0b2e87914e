//! Transitions between state nodes.

use crate::core::{Event, Guard, Machine};
use crate::effects::action::Action;

/// A guarded, action-carrying edge of the state graph.
///
/// A transition with a target exits the source and enters the target, even
/// when both are the same state. A transition without a target only runs
/// its actions; the source is neither exited nor re-entered.
pub struct Transition<M: Machine> {
    pub guard: Option<Guard<M>>,
    pub actions: Vec<Action<M>>,
    pub target: Option<M::State>,
}

impl<M: Machine> Transition<M> {
    /// Check if this transition can be taken (pure)
    pub fn can_execute(&self, context: &M::Context, event: &Event<M>) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(context, event))
    }

    pub fn is_internal(&self) -> bool {
        self.target.is_none()
    }
}

/// First transition in declaration order whose guard passes.
pub fn select<'a, M: Machine>(
    candidates: &'a [Transition<M>],
    context: &M::Context,
    event: &Event<M>,
) -> Option<&'a Transition<M>> {
    candidates.iter().find(|t| t.can_execute(context, event))
}
