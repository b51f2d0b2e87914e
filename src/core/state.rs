//! Core State trait for statechart state identifiers.
//!
//! A state id names a node of the state graph. It is a small, copyable
//! value; everything that varies at runtime lives in the machine context.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for statechart state identifiers.
///
/// All methods are pure - no side effects.
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: ids key the state graph and generation origins
/// - `Debug`: ids appear in diagnostics
/// - `Serialize` + `Deserialize`: ids appear in transition history records
///
/// # Example
///
/// ```rust
/// use keystate::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
///     Broken,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "Open");
/// assert!(Door::Broken.is_final());
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// Settling into a final state completes the interpreter: its activities
    /// are cancelled and further events are dropped.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
