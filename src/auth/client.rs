//! The authentication service port.

use crate::auth::context::{Credentials, Identity};
use crate::auth::error::AuthError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Verifies credentials against an identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: Credentials) -> Result<Identity, AuthError>;
}

/// Authenticator answering every request with the same outcome after a
/// fixed latency.
#[derive(Debug)]
pub struct SimulatedAuthenticator {
    latency: Duration,
    outcome: Result<Identity, AuthError>,
    calls: AtomicUsize,
}

impl SimulatedAuthenticator {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(5000);

    pub fn new(latency: Duration, outcome: Result<Identity, AuthError>) -> Self {
        Self {
            latency,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding(latency: Duration, identity: Identity) -> Self {
        Self::new(latency, Ok(identity))
    }

    pub fn failing(latency: Duration, error: AuthError) -> Self {
        Self::new(latency, Err(error))
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Number of authentication attempts started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedAuthenticator {
    fn default() -> Self {
        Self::succeeding(Self::DEFAULT_LATENCY, Identity::new("me"))
    }
}

#[async_trait]
impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, credentials: Credentials) -> Result<Identity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(user = %credentials.user_name, "authenticating");
        tokio::time::sleep(self.latency).await;
        self.outcome.clone()
    }
}
