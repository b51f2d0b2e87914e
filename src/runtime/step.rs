//! Macrostep resolution.
//!
//! A [`Stepper`] computes the outcome of one event against a state and
//! context without touching the interpreter: it selects transitions, runs
//! actions and follows eventless transitions until the state settles. The
//! interpreter commits the resulting [`Step`] or discards it on error.

use crate::core::{Event, Machine, State, TransitionRecord};
use crate::effects::{run_actions, select, Action, Transition};
use crate::graph::StateGraph;
use crate::runtime::error::InterpreterError;
use chrono::Utc;
use std::time::Duration;
use stillwater::effect::BoxedEffect;

/// Trigger label recorded for eventless transitions.
const ALWAYS: &str = "always";

/// Activities of the state instance a step entered last.
pub(crate) struct Entry<M: Machine> {
    pub service: Option<BoxedEffect<M::Output, M::Error, M::Env>>,
    pub delay: Option<Duration>,
}

/// Outcome of one macrostep.
pub(crate) struct Step<M: Machine> {
    pub state: M::State,
    pub context: M::Context,
    /// Set when at least one targeted transition was taken.
    pub entry: Option<Entry<M>>,
    pub records: Vec<TransitionRecord<M::State>>,
    /// Whether any transition, internal or not, was taken.
    pub taken: bool,
}

impl<M: Machine> Step<M> {
    fn unchanged(state: M::State, context: M::Context) -> Self {
        Self {
            state,
            context,
            entry: None,
            records: Vec::new(),
            taken: false,
        }
    }
}

pub(crate) struct Stepper<'a, M: Machine> {
    graph: &'a StateGraph<M>,
    env: &'a M::Env,
    max_microsteps: usize,
}

impl<'a, M: Machine> Stepper<'a, M> {
    pub fn new(graph: &'a StateGraph<M>, env: &'a M::Env, max_microsteps: usize) -> Self {
        Self {
            graph,
            env,
            max_microsteps,
        }
    }

    /// Enter the initial state with `Init` and settle.
    pub fn initial(&self) -> Result<Step<M>, InterpreterError> {
        let event = Event::Init;
        let initial = self.graph.initial();
        let step = Step {
            taken: true,
            ..Step::unchanged(initial, self.graph.initial_context().clone())
        };
        let step = self.enter(step, initial, &event)?;
        self.settle(step, &event)
    }

    /// React to `event` in `state`. Returns an untaken step when no
    /// transition is enabled.
    pub fn react(
        &self,
        state: M::State,
        context: M::Context,
        event: &Event<M>,
    ) -> Result<Step<M>, InterpreterError> {
        let step = Step::unchanged(state, context);
        let candidates = self
            .graph
            .node(state)
            .map(|node| node.candidates(event))
            .unwrap_or(&[]);

        let Some(transition) = select(candidates, &step.context, event) else {
            tracing::trace!(
                state = state.name(),
                event = %event.label(),
                "no enabled transition"
            );
            return Ok(step);
        };

        let step = self.take(step, transition, event, &event.label())?;
        self.settle(step, event)
    }

    /// Follow eventless transitions until none is enabled.
    fn settle(&self, mut step: Step<M>, event: &Event<M>) -> Result<Step<M>, InterpreterError> {
        let mut microsteps = 0;
        loop {
            let Some(node) = self.graph.node(step.state) else {
                return Ok(step);
            };
            let Some(transition) = select(&node.always, &step.context, event) else {
                return Ok(step);
            };
            if microsteps == self.max_microsteps {
                return Err(InterpreterError::MicrostepLimit {
                    state: step.state.name().to_string(),
                    limit: self.max_microsteps,
                });
            }
            microsteps += 1;
            step = self.take(step, transition, event, ALWAYS)?;
        }
    }

    fn take(
        &self,
        mut step: Step<M>,
        transition: &Transition<M>,
        event: &Event<M>,
        trigger: &str,
    ) -> Result<Step<M>, InterpreterError> {
        let source = step.state;
        step.taken = true;

        let Some(target) = transition.target else {
            step.context = self.run(source, &transition.actions, step.context, event)?;
            return Ok(step);
        };

        let exit = self
            .graph
            .node(source)
            .map(|node| node.exit.as_slice())
            .unwrap_or(&[]);
        let context = self.run(source, exit, step.context, event)?;
        step.context = self.run(source, &transition.actions, context, event)?;
        step.records.push(TransitionRecord {
            from: source,
            to: target,
            trigger: trigger.to_string(),
            timestamp: Utc::now(),
        });
        self.enter(step, target, event)
    }

    fn enter(
        &self,
        mut step: Step<M>,
        target: M::State,
        event: &Event<M>,
    ) -> Result<Step<M>, InterpreterError> {
        let node = self.graph.node(target);
        let entry = node.map(|n| n.entry.as_slice()).unwrap_or(&[]);

        step.context = self.run(target, entry, step.context, event)?;
        step.state = target;
        step.entry = Some(Entry {
            service: node
                .and_then(|n| n.invoke.as_ref())
                .map(|invoke| invoke.create(&step.context, event)),
            delay: node.and_then(|n| n.after.as_ref()).map(|after| after.delay),
        });
        Ok(step)
    }

    fn run(
        &self,
        state: M::State,
        actions: &[Action<M>],
        context: M::Context,
        event: &Event<M>,
    ) -> Result<M::Context, InterpreterError> {
        run_actions(actions, context, event, self.env).map_err(|(action, source)| {
            InterpreterError::EffectFailed {
                state: state.name().to_string(),
                action,
                source,
            }
        })
    }
}
