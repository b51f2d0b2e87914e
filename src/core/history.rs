//! State transition history tracking.
//!
//! Provides immutable tracking of the transitions an interpreter has taken,
//! following functional programming principles.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use keystate::core::TransitionRecord;
/// use keystate::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     pub enum Task {
///         Pending,
///         Running,
///     }
/// }
///
/// let record = TransitionRecord {
///     from: Task::Pending,
///     to: Task::Running,
///     trigger: "Start".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.trigger, "Start");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<S: State> {
    /// The state being exited
    pub from: S,
    /// The state being entered
    pub to: S,
    /// Label of the event that caused the transition (`always` for
    /// eventless microsteps)
    pub trigger: String,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded history of state transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition added. A bounded history forgets its oldest records first.
///
/// # Example
///
/// ```rust
/// use keystate::core::{StateHistory, TransitionRecord};
/// use keystate::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     pub enum Work {
///         Start,
///         Middle,
///         End,
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(TransitionRecord {
///         from: Work::Start,
///         to: Work::Middle,
///         trigger: "Go".to_string(),
///         timestamp: Utc::now(),
///     })
///     .record(TransitionRecord {
///         from: Work::Middle,
///         to: Work::End,
///         trigger: "always".to_string(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec![&Work::Start, &Work::Middle, &Work::End]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<TransitionRecord<S>>,
    limit: Option<usize>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty, unbounded history.
    pub fn new() -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: None,
        }
    }

    /// Create an empty history keeping at most `limit` records.
    pub fn bounded(limit: usize) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// This is a pure function - it does not mutate the existing history.
    pub fn record(&self, transition: TransitionRecord<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push_back(transition);
        if let Some(limit) = self.limit {
            while transitions.len() > limit {
                transitions.pop_front();
            }
        }
        Self {
            transitions,
            limit: self.limit,
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record, then the
    /// `to` state of each record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last retained transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Number of times `state` was entered within the retained records.
    pub fn entries(&self, state: S) -> usize {
        self.transitions.iter().filter(|t| t.to == state).count()
    }

    /// Iterate over retained records, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
