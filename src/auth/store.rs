//! Persistence of the authenticated identity.

use crate::auth::context::Identity;
use crate::auth::error::StoreError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Storage port for the authenticated identity.
///
/// Reads never fail: anything that cannot be read back is treated as "no
/// identity". Writes report failures, which abort the machine step that
/// issued them.
pub trait IdentityStore: Send + Sync {
    fn load(&self) -> Option<Identity>;

    fn save(&self, identity: &Identity) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store that counts its calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    identity: Mutex<Option<Identity>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    clears: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `identity`.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: Mutex::new(Some(identity)),
            ..Self::default()
        }
    }

    /// Make every following write fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn current(&self) -> Option<Identity> {
        self.identity.lock().clone()
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl IdentityStore for MemoryStore {
    fn load(&self) -> Option<Identity> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.current()
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        self.check_available()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.identity.lock() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_available()?;
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.identity.lock() = None;
        Ok(())
    }
}

/// Document written by [`FileStore`].
#[derive(Serialize, Deserialize)]
struct StoredAuthentication {
    user: Identity,
}

/// Store keeping the identity in a JSON file.
///
/// The file holds `{"user": {...}}`; clearing empties it rather than
/// deleting it.
///
/// All access is blocking `std::fs` I/O on the thread that runs the
/// interpreter step. For a login that is a tokio worker, since the
/// authenticator's answer is delivered from a spawned task. This suits a
/// small local file. A store on slow or remote storage should hand its
/// writes to [`tokio::task::spawn_blocking`] behind its own
/// [`IdentityStore`] impl; `block_in_place` is not an option because it
/// panics on a current-thread runtime.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        fs::write(&self.path, contents).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl IdentityStore for FileStore {
    fn load(&self) -> Option<Identity> {
        tracing::debug!(path = %self.path.display(), "retrieving authentication info");

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "identity store unreadable");
                return None;
            }
        };
        if contents.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<StoredAuthentication>(&contents) {
            Ok(stored) => Some(stored.user),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "identity store corrupt");
                None
            }
        }
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        tracing::debug!(path = %self.path.display(), user = %identity.name, "saving authentication info");
        let document = serde_json::to_string(&StoredAuthentication {
            user: identity.clone(),
        })?;
        self.write(&document)
    }

    fn clear(&self) -> Result<(), StoreError> {
        tracing::debug!(path = %self.path.display(), "clearing authentication info");
        self.write("")
    }
}
