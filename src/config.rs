//! Configuration of an authentication session.

use crate::auth::Credentials;
use crate::runtime::InterpreterOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings of an [`AuthSession`](crate::auth::AuthSession).
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Graph id, used in log fields.
    pub machine_id: String,

    /// Credentials sent by `login()`.
    pub credentials: Credentials,

    /// Interval between token renewals while authenticated. Unset disables
    /// renewal.
    pub renew_interval_ms: Option<u64>,

    /// File backing a [`FileStore`](crate::auth::FileStore).
    pub store_path: Option<PathBuf>,

    pub interpreter: InterpreterOptions,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            machine_id: "authentication".to_string(),
            credentials: Credentials::default(),
            renew_interval_ms: None,
            store_path: None,
            interpreter: InterpreterOptions::default(),
        }
    }
}

impl AuthConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.machine_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "machine_id",
                reason: "must not be empty".to_string(),
            });
        }

        if self.renew_interval_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "renew_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        // Init and the transient states each need one eventless step.
        if self.interpreter.max_microsteps == 0 {
            return Err(ConfigError::Invalid {
                field: "interpreter.max_microsteps",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn renew_interval(&self) -> Option<Duration> {
        self.renew_interval_ms.map(Duration::from_millis)
    }
}
