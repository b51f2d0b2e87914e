//! Command surface over a running authentication machine.

use crate::auth::context::{AuthEvent, Credentials};
use crate::auth::machine::{authentication_graph, AuthEnv, AuthMachine, AuthState};
use crate::builder::BuildError;
use crate::config::AuthConfig;
use crate::core::{MachineSnapshot, StateHistory, Status};
use crate::runtime::{Interpreter, InterpreterError, Subscription};

pub type AuthSnapshot = MachineSnapshot<AuthMachine>;

/// An authentication machine instance with login and logout commands.
///
/// Commands only send events; their results are observed through
/// [`subscribe`](AuthSession::subscribe) or [`snapshot`](AuthSession::snapshot).
/// An `Err` means a storage write failed while the event was processed.
pub struct AuthSession {
    interpreter: Interpreter<AuthMachine>,
    credentials: Credentials,
}

impl AuthSession {
    pub fn new(env: AuthEnv, config: &AuthConfig) -> Result<Self, BuildError> {
        let graph = authentication_graph(config.machine_id.clone(), config.renew_interval())?;

        Ok(Self {
            interpreter: Interpreter::with_options(graph, env, config.interpreter.clone()),
            credentials: config.credentials.clone(),
        })
    }

    /// Restore the persisted identity and publish the first snapshot.
    pub fn start(&self) -> Result<AuthSnapshot, InterpreterError> {
        self.interpreter.start()
    }

    /// Log in with the configured credentials.
    pub fn login(&self) -> Result<(), InterpreterError> {
        self.login_as(self.credentials.clone())
    }

    pub fn login_as(&self, credentials: Credentials) -> Result<(), InterpreterError> {
        self.interpreter.send(AuthEvent::Login { credentials })
    }

    pub fn logout(&self) -> Result<(), InterpreterError> {
        self.interpreter.send(AuthEvent::Logout)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription<AuthMachine>
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        self.interpreter.subscribe(listener)
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.interpreter.snapshot()
    }

    pub fn state(&self) -> AuthState {
        self.snapshot().state
    }

    pub fn status(&self) -> Status {
        self.interpreter.status()
    }

    /// Why the session failed, once [`status`](Self::status) reports
    /// [`Status::Failed`].
    pub fn fault(&self) -> Option<InterpreterError> {
        self.interpreter.fault()
    }

    pub fn history(&self) -> StateHistory<AuthState> {
        self.interpreter.history()
    }

    pub fn stop(&self) {
        self.interpreter.stop()
    }

    pub fn interpreter(&self) -> &Interpreter<AuthMachine> {
        &self.interpreter
    }
}
