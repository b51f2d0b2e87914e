//! Actions run on entry, exit and transitions.

use crate::core::{Event, Machine};
use thiserror::Error;

/// Failure of an `effect` action.
///
/// The state graph has no recovery path for a failing effect, so the
/// interpreter abandons the step and hands this back to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Pure context update: returns the next context.
pub type AssignFn<M> = Box<
    dyn Fn(&<M as Machine>::Context, &Event<M>) -> <M as Machine>::Context + Send + Sync,
>;

/// Side effect against the machine environment.
pub type EffectFn<M> = Box<
    dyn Fn(&<M as Machine>::Context, &Event<M>, &<M as Machine>::Env) -> Result<(), ActionError>
        + Send
        + Sync,
>;

/// Context update read from the machine environment.
pub type LoadFn<M> = Box<
    dyn Fn(
            &<M as Machine>::Context,
            &Event<M>,
            &<M as Machine>::Env,
        ) -> Result<<M as Machine>::Context, ActionError>
        + Send
        + Sync,
>;

pub enum ActionKind<M: Machine> {
    Assign(AssignFn<M>),
    Effect(EffectFn<M>),
    Load(LoadFn<M>),
}

/// A named action. The name is only used for diagnostics.
pub struct Action<M: Machine> {
    name: &'static str,
    kind: ActionKind<M>,
}

impl<M: Machine> Action<M> {
    /// Replace the context with a value computed from the current context
    /// and event.
    pub fn assign<F>(name: &'static str, update: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>) -> M::Context + Send + Sync + 'static,
    {
        Self {
            name,
            kind: ActionKind::Assign(Box::new(update)),
        }
    }

    /// Run a side effect. The context is left untouched.
    pub fn effect<F>(name: &'static str, effect: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>, &M::Env) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self {
            name,
            kind: ActionKind::Effect(Box::new(effect)),
        }
    }

    /// Replace the context with a value read through the environment,
    /// such as state restored from storage. Fails like an effect.
    pub fn load<F>(name: &'static str, load: F) -> Self
    where
        F: Fn(&M::Context, &Event<M>, &M::Env) -> Result<M::Context, ActionError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            kind: ActionKind::Load(Box::new(load)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_assign(&self) -> bool {
        matches!(self.kind, ActionKind::Assign(_))
    }

    /// Execute against `context`, returning the context the next action sees.
    pub fn execute(
        &self,
        context: M::Context,
        event: &Event<M>,
        env: &M::Env,
    ) -> Result<M::Context, ActionError> {
        match &self.kind {
            ActionKind::Assign(update) => Ok(update(&context, event)),
            ActionKind::Effect(effect) => {
                effect(&context, event, env)?;
                Ok(context)
            }
            ActionKind::Load(load) => load(&context, event, env),
        }
    }
}

/// Run `actions` in declaration order, threading the context through.
///
/// Stops at the first failing effect and reports its name.
pub fn run_actions<M: Machine>(
    actions: &[Action<M>],
    context: M::Context,
    event: &Event<M>,
    env: &M::Env,
) -> Result<M::Context, (&'static str, ActionError)> {
    actions.iter().try_fold(context, |context, action| {
        tracing::trace!(action = action.name(), "running action");
        action
            .execute(context, event, env)
            .map_err(|err| (action.name(), err))
    })
}
