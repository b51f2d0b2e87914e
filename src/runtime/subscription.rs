//! Snapshot subscribers.

use crate::core::{Machine, MachineSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback receiving every snapshot published after registration.
pub type Listener<M> = Arc<dyn Fn(&MachineSnapshot<M>) + Send + Sync>;

/// Registry of listeners, notified in registration order.
pub(crate) struct Subscribers<M: Machine> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener<M>)>>,
}

impl<M: Machine> Subscribers<M> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Listener<M>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));
        id
    }

    pub fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Deliver `snapshot` to the listeners registered right now.
    ///
    /// The lock is released before any listener runs, so listeners may
    /// subscribe, unsubscribe or send events.
    pub fn notify(&self, snapshot: &MachineSnapshot<M>) {
        let listeners: Vec<Listener<M>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Handle returned by [`Interpreter::subscribe`](crate::runtime::Interpreter::subscribe).
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription<M: Machine> {
    id: u64,
    registry: Weak<Subscribers<M>>,
}

impl<M: Machine> Subscription<M> {
    pub(crate) fn new(id: u64, registry: &Arc<Subscribers<M>>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Remove the listener. Returns `false` if it was already gone, for
    /// example because the interpreter stopped.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}
