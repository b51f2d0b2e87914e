//! The authentication state graph.
//!
//! ```text
//! Init ──always──▶ Authenticated | Unauthenticated
//! Unauthenticated ──login──▶ ProcessAuthentication
//! ProcessAuthentication ──done──▶ Authenticated
//!                       ──error──▶ Unauthenticated
//! Authenticated ──after(renew)──▶ ProcessRenewToken ──always──▶ Authenticated
//!               ──logout──▶ ProcessUnAuthentication ──always──▶ Unauthenticated
//! ```

use crate::auth::client::Authenticator;
use crate::auth::context::{AuthContext, AuthEvent, AuthEventKind, AuthStatus, Credentials, Identity};
use crate::auth::error::AuthError;
use crate::auth::store::IdentityStore;
use crate::builder::{BuildError, InvokeBuilder, MachineBuilder, StateNodeBuilder, TransitionBuilder};
use crate::core::{Event, Machine};
use crate::effects::Action;
use crate::graph::StateGraph;
use crate::state_enum;
use std::sync::Arc;
use std::time::Duration;
use stillwater::prelude::*;

state_enum! {
    /// States of the authentication machine.
    pub enum AuthState {
        /// Reads the persisted identity and redirects.
        Init,
        Unauthenticated,
        /// Waiting for the authenticator.
        ProcessAuthentication,
        Authenticated,
        /// Transient state re-entered on every renewal interval.
        ProcessRenewToken,
        /// Transient state clearing the stored identity.
        ProcessUnAuthentication,
    }
}

/// Collaborators of the authentication machine.
#[derive(Clone)]
pub struct AuthEnv {
    pub store: Arc<dyn IdentityStore>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AuthEnv {
    pub fn new(store: Arc<dyn IdentityStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }
}

/// Type-level description of the authentication machine.
pub struct AuthMachine;

impl Machine for AuthMachine {
    type State = AuthState;
    type Context = AuthContext;
    type Event = AuthEvent;
    type Output = Identity;
    type Error = AuthError;
    type Env = AuthEnv;
}

type AuthEvt = Event<AuthMachine>;
type Node = StateNodeBuilder<AuthMachine>;
type Edge = TransitionBuilder<AuthMachine>;
type Act = Action<AuthMachine>;

/// Build the authentication graph.
///
/// Every storage access goes through the interpreter's [`AuthEnv`]. Without
/// a `renew_interval` the `Authenticated` state never renews.
pub fn authentication_graph(
    id: impl Into<String>,
    renew_interval: Option<Duration>,
) -> Result<StateGraph<AuthMachine>, BuildError> {
    let mut authenticated = Node::new(AuthState::Authenticated)
        .entry(persist_identity())
        .on(
            AuthEventKind::Logout,
            Edge::new().to(AuthState::ProcessUnAuthentication),
        );
    if let Some(interval) = renew_interval {
        authenticated = authenticated.after(
            interval,
            Edge::new().to(AuthState::ProcessRenewToken),
        );
    }

    MachineBuilder::<AuthMachine>::new(id)
        .initial(AuthState::Init)
        .context(AuthContext::default())
        .state(
            Node::new(AuthState::Init)
                .entry(Act::load("restoreAuthentication", |_, _, env: &AuthEnv| {
                    Ok(AuthContext::restored(env.store.load()))
                }))
                .always(
                    Edge::new()
                        .to(AuthState::Authenticated)
                        .when(|ctx: &AuthContext, _| ctx.user.is_some()),
                )
                .always(Edge::new().to(AuthState::Unauthenticated)),
        )
        .state(Node::new(AuthState::Unauthenticated).on(
            AuthEventKind::Login,
            Edge::new().to(AuthState::ProcessAuthentication),
        ))
        .state(
            Node::new(AuthState::ProcessAuthentication)
                .entry(Act::assign("setIsLoading", |ctx: &AuthContext, _| {
                    AuthContext {
                        is_loading: true,
                        ..ctx.clone()
                    }
                }))
                .invoke(
                    InvokeBuilder::<AuthMachine>::new("authenticate", authenticate)
                        .on_done(
                            Edge::new()
                                .to(AuthState::Authenticated)
                                .assign("setAuthentication", set_authentication)
                                .effect("handleIsAuthenticated", |ctx: &AuthContext, _, _| {
                                    if let Some(user) = &ctx.user {
                                        tracing::info!(user = %user.name, "user authenticated");
                                    }
                                    Ok(())
                                }),
                        )
                        .on_error(
                            Edge::new()
                                .to(AuthState::Unauthenticated)
                                .when(|_, event: &AuthEvt| {
                                    event.error().is_some_and(AuthError::is_mfa_required)
                                })
                                .assign("setError", |ctx: &AuthContext, event: &AuthEvt| {
                                    AuthContext {
                                        is_loading: false,
                                        error: event.error().cloned(),
                                        ..ctx.clone()
                                    }
                                }),
                        )
                        .on_error(
                            Edge::new()
                                .to(AuthState::Unauthenticated)
                                .effect("handleError", |_, event: &AuthEvt, _| {
                                    if let Some(error) = event.error() {
                                        tracing::warn!(%error, "authentication failed");
                                    }
                                    Ok(())
                                })
                                .assign("resetLoading", |ctx: &AuthContext, _| AuthContext {
                                    is_loading: false,
                                    error: None,
                                    ..ctx.clone()
                                }),
                        ),
                ),
        )
        .state(authenticated)
        .state(
            Node::new(AuthState::ProcessRenewToken)
                .entry(Act::effect("renewToken", |ctx: &AuthContext, _, _| {
                    if let Some(user) = &ctx.user {
                        tracing::info!(user = %user.name, "renewing token");
                    }
                    Ok(())
                }))
                .always(Edge::new().to(AuthState::Authenticated)),
        )
        .state(
            Node::new(AuthState::ProcessUnAuthentication)
                .entry(Act::assign(
                    "clearAuthentication",
                    |ctx: &AuthContext, _| AuthContext {
                        status: AuthStatus::Unauthenticated,
                        user: None,
                        ..ctx.clone()
                    },
                ))
                .entry(Act::effect(
                    "deleteAuthentication",
                    |_, _, env: &AuthEnv| Ok(env.store.clear()?),
                ))
                .always(Edge::new().to(AuthState::Unauthenticated)),
        )
        .build()
}

/// Service attempting a login with the credentials carried by the event.
fn authenticate(
    _: &AuthContext,
    event: &AuthEvt,
) -> BoxedEffect<Identity, AuthError, AuthEnv> {
    let credentials = match event.external() {
        Some(AuthEvent::Login { credentials }) => credentials.clone(),
        _ => Credentials::default(),
    };
    from_async(move |env: &AuthEnv| {
        let authenticator = Arc::clone(&env.authenticator);
        async move { authenticator.authenticate(credentials).await }
    })
    .boxed()
}

fn set_authentication(ctx: &AuthContext, event: &AuthEvt) -> AuthContext {
    let user = event.output().cloned();
    AuthContext {
        status: if user.is_some() {
            AuthStatus::Authenticated
        } else {
            ctx.status
        },
        is_loading: false,
        user: user.or_else(|| ctx.user.clone()),
        error: None,
    }
}

fn persist_identity() -> Act {
    Act::effect("persistIdentity", |ctx: &AuthContext, _, env: &AuthEnv| {
        if let Some(user) = &ctx.user {
            env.store.save(user)?;
        }
        Ok(())
    })
}
