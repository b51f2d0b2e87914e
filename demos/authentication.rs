//! Authentication Session
//!
//! Runs the authentication machine against a file-backed identity store and
//! a simulated authenticator with a five second latency.
//!
//! Key concepts:
//! - Restoring a persisted identity on start
//! - Observing snapshots through a subscription
//! - Cancellation of pending work on stop
//!
//! Run with: cargo run --example authentication [config.json]
//!
//! Set `RUST_LOG=keystate=debug` to see the interpreter's structured logs.

use keystate::auth::{
    AuthEnv, AuthSession, AuthSnapshot, FileStore, Identity, SimulatedAuthenticator,
};
use keystate::config::AuthConfig;
use keystate::core::State;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keystate=info")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => AuthConfig::from_file(path)?,
        None => AuthConfig::default(),
    };
    let store_path = config
        .store_path
        .get_or_insert_with(|| std::env::temp_dir().join("keystate-authentication.json"))
        .clone();

    println!("=== Authentication Session ===\n");
    println!("Identity file: {}", store_path.display());

    let env = AuthEnv::new(
        Arc::new(FileStore::new(store_path)),
        Arc::new(SimulatedAuthenticator::succeeding(
            SimulatedAuthenticator::DEFAULT_LATENCY,
            Identity::new(config.credentials.user_name.clone()),
        )),
    );
    let session = AuthSession::new(env, &config)?;
    let _subscription = session.subscribe(|snapshot: &AuthSnapshot| {
        println!(
            "  [{}] {:<24} user={:<8} loading={}",
            snapshot.status,
            snapshot.state.name(),
            snapshot
                .context
                .user
                .as_ref()
                .map_or("-", |user| user.name.as_str()),
            snapshot.context.is_loading,
        );
    });

    println!("\nStarting:");
    session.start()?;

    println!("\nLogging in as '{}':", config.credentials.user_name);
    session.login()?;
    tokio::time::sleep(SimulatedAuthenticator::DEFAULT_LATENCY + Duration::from_millis(100)).await;

    println!("\nLogging out:");
    session.logout()?;

    println!("\nLogging in again, then stopping before the answer:");
    session.login()?;
    session.stop();
    session.login()?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\nFinal state: {} ({})", session.state().name(), session.status());
    println!("Transitions taken:");
    for record in session.history().transitions() {
        println!("  {:>24} -> {:<24} on {}", record.from.name(), record.to.name(), record.trigger);
    }

    Ok(())
}
