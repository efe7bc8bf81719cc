//! In-memory history stack.
//!
//! # Responsibilities
//! - Keep an ordered list of entries and a cursor
//! - Push (truncating forward entries), replace, back, forward, go
//! - Notify listeners on cursor moves when asked to

use std::sync::{Mutex, PoisonError};

use crate::history::{
    History, HistoryListener, ListenerHandle, NavigationDirection, NavigationInfo,
};
use crate::location::{HistoryLocation, LocationNormalizer, UrlNormalizer};
use crate::registry::Registry;

struct Stack {
    entries: Vec<HistoryLocation>,
    position: usize,
}

/// History backend that lives entirely in memory.
pub struct MemoryHistory {
    stack: Mutex<Stack>,
    listeners: Registry<HistoryListener>,
    normalizer: UrlNormalizer,
}

impl MemoryHistory {
    /// Create a history whose single entry is `initial`.
    pub fn new(initial: &str) -> Self {
        let normalizer = UrlNormalizer;
        let entry = normalizer.normalize_location(initial);
        Self {
            stack: Mutex::new(Stack {
                entries: vec![entry],
                position: 0,
            }),
            listeners: Registry::new(),
            normalizer,
        }
    }

    /// Full paths of every entry, oldest first.
    pub fn entries(&self) -> Vec<String> {
        let stack = self.lock();
        stack.entries.iter().map(|e| e.full_path.clone()).collect()
    }

    /// Index of the current entry.
    pub fn position(&self) -> usize {
        self.lock().position
    }

    /// Move the cursor by `delta` entries, clamped to the stack bounds.
    pub fn go(&self, delta: isize, trigger_listeners: bool) {
        let moved = {
            let mut stack = self.lock();
            let last = stack.entries.len().saturating_sub(1) as isize;
            let target = (stack.position as isize + delta).clamp(0, last) as usize;
            if target == stack.position {
                None
            } else {
                let from = stack.entries[stack.position].clone();
                let applied = target as isize - stack.position as isize;
                stack.position = target;
                Some((stack.entries[target].clone(), from, applied))
            }
        };

        let Some((to, from, applied)) = moved else {
            tracing::debug!(delta, "History move out of range, ignored");
            return;
        };
        tracing::debug!(from = %from.full_path, to = %to.full_path, delta = applied, "History moved");

        if trigger_listeners {
            let info = NavigationInfo {
                direction: if applied < 0 {
                    NavigationDirection::Back
                } else {
                    NavigationDirection::Forward
                },
                delta: applied,
            };
            self.notify(&to, &from, info);
        }
    }

    /// Simulate an external change to `raw` (e.g. the user editing the url).
    pub fn navigate_external(&self, raw: &str) {
        let to = self.normalizer.normalize_location(raw);
        let from = {
            let mut stack = self.lock();
            let from = stack.entries[stack.position].clone();
            let keep = stack.position + 1;
            stack.entries.truncate(keep);
            stack.entries.push(to.clone());
            stack.position += 1;
            from
        };
        let info = NavigationInfo {
            direction: NavigationDirection::Unknown,
            delta: 0,
        };
        self.notify(&to, &from, info);
    }

    fn notify(&self, to: &HistoryLocation, from: &HistoryLocation, info: NavigationInfo) {
        for listener in self.listeners.snapshot() {
            listener(to, from, info);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl History for MemoryHistory {
    fn location(&self) -> HistoryLocation {
        let stack = self.lock();
        stack.entries[stack.position].clone()
    }

    fn listen(&self, listener: HistoryListener) -> ListenerHandle {
        self.listeners.register(listener)
    }

    fn push(&self, to: &HistoryLocation) {
        let mut stack = self.lock();
        let keep = stack.position + 1;
        stack.entries.truncate(keep);
        stack.entries.push(to.clone());
        stack.position += 1;
    }

    fn replace(&self, to: &HistoryLocation) {
        let mut stack = self.lock();
        let position = stack.position;
        stack.entries[position] = to.clone();
    }

    fn back(&self, trigger_listeners: bool) {
        self.go(-1, trigger_listeners);
    }

    fn forward(&self, trigger_listeners: bool) {
        self.go(1, trigger_listeners);
    }

    fn normalizer(&self) -> &dyn LocationNormalizer {
        &self.normalizer
    }
}
