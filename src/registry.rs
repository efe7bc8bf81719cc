//! Insertion-ordered callback registries with identity-based removal.
//!
//! # Design Decisions
//! - Every registration gets a unique id; removal looks the id up, so
//!   earlier removals shifting positions never remove the wrong entry
//! - Callers iterate over a snapshot, never while holding the lock
//! - Handles hold a weak reference: removing after the registry is gone
//!   is a no-op

use std::sync::{Arc, Mutex, PoisonError, Weak};

struct Entries<T> {
    next_id: u64,
    items: Vec<(u64, T)>,
}

trait Deregister: Send + Sync {
    fn deregister(&self, id: u64) -> bool;
}

impl<T: Send> Deregister for Mutex<Entries<T>> {
    fn deregister(&self, id: u64) -> bool {
        let mut entries = self.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.items.len();
        entries.items.retain(|(entry_id, _)| *entry_id != id);
        entries.items.len() != before
    }
}

/// An ordered list of registered callbacks.
pub struct Registry<T> {
    entries: Arc<Mutex<Entries<T>>>,
}

impl<T: Clone + Send + 'static> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                next_id: 0,
                items: Vec::new(),
            })),
        }
    }

    /// Append an entry and return the handle that removes exactly it.
    pub fn register(&self, item: T) -> RegistrationHandle {
        let id = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let id = entries.next_id;
            entries.next_id += 1;
            entries.items.push((id, item));
            id
        };
        let registry: Arc<dyn Deregister> = self.entries.clone();
        RegistrationHandle {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    /// Current entries in registration order.
    pub fn snapshot(&self) -> Vec<T> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.items.iter().map(|(_, item)| item.clone()).collect()
    }
}

impl<T: Clone + Send + 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes one registration. Safe to call any number of times.
#[derive(Clone)]
pub struct RegistrationHandle {
    id: u64,
    registry: Weak<dyn Deregister>,
}

impl RegistrationHandle {
    /// Remove the registration. Returns `false` if it was already gone.
    pub fn remove(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.deregister(self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for RegistrationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationHandle")
            .field("id", &self.id)
            .finish()
    }
}
