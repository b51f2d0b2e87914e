//! Effectful building blocks of a state graph, using Stillwater 0.11.0.
//!
//! Everything here describes work; nothing runs until the interpreter
//! executes it.
//!
//! # Key Concepts
//!
//! - **Actions**: `assign` replaces the context, `effect` talks to the
//!   environment, `load` replaces the context with data read from it
//! - **Transitions**: guarded edges carrying ordered actions
//! - **Services**: factories of `BoxedEffect`s run while their state is live

mod action;
mod service;
mod transition;

pub use action::{run_actions, Action, ActionError, ActionKind, AssignFn, EffectFn, LoadFn};
pub use service::{Invoke, ServiceFactory};
pub use transition::{select, Transition};
