//! Authentication machine built on the interpreter.
//!
//! [`AuthSession`] restores a persisted identity on start, logs in through
//! an injected [`Authenticator`], persists the identity on success and
//! clears it on logout. An MFA rejection is kept in the context so callers
//! can prompt for a second factor; other rejections are only logged.
//!
//! # Example
//!
//! ```rust
//! use keystate::auth::{
//!     AuthEnv, AuthSession, AuthState, Identity, MemoryStore, SimulatedAuthenticator,
//! };
//! use keystate::config::AuthConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! let authenticator = Arc::new(SimulatedAuthenticator::succeeding(
//!     Duration::from_millis(50),
//!     Identity::new("me"),
//! ));
//! let session = AuthSession::new(
//!     AuthEnv::new(store.clone(), authenticator),
//!     &AuthConfig::default(),
//! )
//! .unwrap();
//!
//! session.start().unwrap();
//! session.login().unwrap();
//! assert_eq!(session.state(), AuthState::ProcessAuthentication);
//!
//! tokio::time::sleep(Duration::from_millis(60)).await;
//! assert_eq!(session.state(), AuthState::Authenticated);
//! assert_eq!(store.saves(), 1);
//! # }
//! ```

mod client;
mod context;
mod error;
mod machine;
mod session;
mod store;

pub use client::{Authenticator, SimulatedAuthenticator};
pub use context::{AuthContext, AuthEvent, AuthEventKind, AuthStatus, Credentials, Identity};
pub use error::{AuthError, StoreError};
pub use machine::{authentication_graph, AuthEnv, AuthMachine, AuthState};
pub use session::{AuthSession, AuthSnapshot};
pub use store::{FileStore, IdentityStore, MemoryStore};
