//! Build errors for state graphs.

use stillwater::NonEmptyVec;
use thiserror::Error;

/// Errors that can occur when building a state graph.
///
/// Validation does not stop at the first problem: when several are found
/// they are reported together as [`BuildError::Multiple`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Initial state '{state}' is not declared")]
    UnknownInitialState { state: String },

    #[error("State '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("Transition from '{from}' targets undeclared state '{target}'")]
    UnknownTarget { from: String, target: String },

    #[error("State '{state}' declares more than one invoked service")]
    MultipleServices { state: String },

    #[error("State '{state}' declares more than one delay")]
    MultipleDelays { state: String },

    #[error("{} problems: {}", .0.len(), join(.0))]
    Multiple(Vec<BuildError>),
}

impl BuildError {
    /// Collapse accumulated violations into a single error.
    pub(crate) fn from_violations(violations: NonEmptyVec<BuildError>) -> Self {
        match <[BuildError; 1]>::try_from(violations.into_vec()) {
            Ok([single]) => single,
            Err(all) => BuildError::Multiple(all),
        }
    }

    /// The individual violations, flattened.
    pub fn violations(&self) -> Vec<&BuildError> {
        match self {
            BuildError::Multiple(all) => all.iter().collect(),
            single => vec![single],
        }
    }
}

fn join(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_violation_is_reported_as_is() {
        let err = BuildError::from_violations(NonEmptyVec::singleton(BuildError::NoStates));
        assert_eq!(err, BuildError::NoStates);
        assert_eq!(err.violations(), vec![&BuildError::NoStates]);
    }

    #[test]
    fn several_violations_are_grouped() {
        let err = BuildError::from_violations(NonEmptyVec::new(
            BuildError::MissingInitialState,
            vec![BuildError::MissingContext],
        ));

        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().starts_with("2 problems: Initial state not specified"));
    }
}
