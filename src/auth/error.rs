//! Errors of the authentication collaborators.

use crate::effects::ActionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Rejection reported by an [`Authenticator`](crate::auth::Authenticator).
///
/// Only [`AuthError::MfaRequired`] is kept in the machine context; every
/// other rejection is logged and dropped.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthError {
    #[error("Multi-factor authentication required: {message}")]
    MfaRequired { message: String },

    #[error("Credentials rejected: {reason}")]
    Rejected { reason: String },

    #[error("Authentication service unreachable: {message}")]
    Network { message: String },
}

impl AuthError {
    pub fn mfa_required(message: impl Into<String>) -> Self {
        AuthError::MfaRequired {
            message: message.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        AuthError::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_mfa_required(&self) -> bool {
        matches!(self, AuthError::MfaRequired { .. })
    }
}

/// Failure of an [`IdentityStore`](crate::auth::IdentityStore) write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write identity store at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode identity: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Identity store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        ActionError::new(err.to_string())
    }
}
