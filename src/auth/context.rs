//! Extended state and events of the authentication machine.

use crate::auth::error::AuthError;
use crate::core::MachineEvent;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// The authenticated user, as returned by the authenticator and persisted
/// by the identity store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Input of an authentication attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("me", "psw")
    }
}

/// Context of the authentication machine.
///
/// `status` is `Authenticated` exactly when `user` is present. `error` is
/// only set by an MFA rejection and survives until the next completed
/// login.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub status: AuthStatus,
    pub is_loading: bool,
    pub user: Option<Identity>,
    pub error: Option<AuthError>,
}

impl AuthContext {
    /// Context matching a restored identity, or the signed-out context.
    pub fn restored(user: Option<Identity>) -> Self {
        let status = if user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        };
        Self {
            status,
            user,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// Whether `status` agrees with the presence of `user`.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated() == self.user.is_some()
    }
}

/// Events accepted by the authentication machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    Login { credentials: Credentials },
    Logout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthEventKind {
    Login,
    Logout,
}

impl MachineEvent for AuthEvent {
    type Kind = AuthEventKind;

    fn kind(&self) -> AuthEventKind {
        match self {
            AuthEvent::Login { .. } => AuthEventKind::Login,
            AuthEvent::Logout => AuthEventKind::Logout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restored_context_is_consistent() {
        let signed_in = AuthContext::restored(Some(Identity::new("me")));
        let signed_out = AuthContext::restored(None);

        assert!(signed_in.is_authenticated());
        assert!(signed_in.is_consistent());
        assert!(!signed_out.is_authenticated());
        assert!(signed_out.is_consistent());
        assert!(!signed_in.is_loading);
    }

    #[test]
    fn status_without_user_is_inconsistent() {
        let context = AuthContext {
            status: AuthStatus::Authenticated,
            ..AuthContext::default()
        };

        assert!(!context.is_consistent());
    }

    #[test]
    fn default_credentials() {
        let credentials = Credentials::default();

        assert_eq!(credentials.user_name, "me");
        assert_eq!(credentials.password, "psw");
    }

    #[test]
    fn event_kinds() {
        let login = AuthEvent::Login {
            credentials: Credentials::default(),
        };

        assert_eq!(login.kind(), AuthEventKind::Login);
        assert_eq!(AuthEvent::Logout.kind(), AuthEventKind::Logout);
    }

    #[test]
    fn identity_round_trips_as_plain_json() {
        let json = serde_json::to_string(&Identity::new("me")).unwrap();

        assert_eq!(json, r#"{"name":"me"}"#);
    }
}
