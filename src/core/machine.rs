//! Type-level description of a machine.
//!
//! A [`Machine`] is a marker type that ties together every type a state
//! graph and its interpreter work with. Nothing is looked up by name at
//! runtime: triggers are keyed by the event's closed [`MachineEvent::Kind`].

use super::state::State;
use std::fmt::Debug;
use std::hash::Hash;

/// An externally delivered event.
///
/// `Kind` is the payload-free discriminant transitions are keyed by. For
/// events without payloads the event type itself can serve as its kind.
pub trait MachineEvent: Debug + Send + 'static {
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Types shared by a state graph and its interpreter.
///
/// # Example
///
/// ```rust
/// use keystate::core::{Machine, MachineEvent};
/// use keystate::state_enum;
///
/// state_enum! {
///     pub enum Light {
///         Off,
///         On,
///     }
/// }
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// pub enum Toggle {
///     Flip,
/// }
///
/// impl MachineEvent for Toggle {
///     type Kind = Toggle;
///
///     fn kind(&self) -> Toggle {
///         *self
///     }
/// }
///
/// pub struct LightMachine;
///
/// impl Machine for LightMachine {
///     type State = Light;
///     type Context = u32;
///     type Event = Toggle;
///     type Output = ();
///     type Error = ();
///     type Env = ();
/// }
/// ```
pub trait Machine: Sized + Send + Sync + 'static {
    /// State identifiers.
    type State: State;

    /// Extended state, replaced by `assign` actions.
    type Context: Clone + Debug + Send + Sync + 'static;

    /// Events sent by callers.
    type Event: MachineEvent;

    /// Success payload of invoked services.
    type Output: Debug + Send + Sync + 'static;

    /// Failure payload of invoked services.
    type Error: Debug + Send + Sync + 'static;

    /// Environment handed to effects and services.
    type Env: Clone + Send + Sync + 'static;
}

/// Shorthand for the trigger kind of a machine's events.
pub type EventKind<M> = <<M as Machine>::Event as MachineEvent>::Kind;
