//! History backend abstraction.
//!
//! # Data Flow
//! ```text
//! Router commit:
//!     Router → History::push / History::replace (no listener notification)
//!
//! External change (back/forward, another tab, the user):
//!     backend moves → listeners(to, from, info)
//!     → Router event channel → resolve → guards → commit
//!     (Aborted → backend.back(false) / backend.forward(false))
//! ```
//!
//! # Design Decisions
//! - Narrow trait: the router never inspects the backend's stack
//! - Listener notifications carry the detected direction so that a
//!   cancelled back navigation can be compensated with a forward step
//! - Programmatic moves can suppress listeners (`trigger_listeners = false`)

pub mod memory;

use std::sync::Arc;

use crate::location::{HistoryLocation, LocationNormalizer, UrlNormalizer};
use crate::registry::RegistrationHandle;

pub use memory::MemoryHistory;

/// Handle returned by [`History::listen`].
pub type ListenerHandle = RegistrationHandle;

/// Direction of a backend-driven navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Back,
    Forward,
    Unknown,
}

/// Extra information attached to a backend change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationInfo {
    pub direction: NavigationDirection,
    /// Number of entries moved; negative when going back.
    pub delta: isize,
}

/// Callback invoked with `(to, from, info)` on every backend-driven change.
pub type HistoryListener =
    Arc<dyn Fn(&HistoryLocation, &HistoryLocation, NavigationInfo) + Send + Sync>;

/// The location/history backend consumed by the router.
pub trait History: Send + Sync {
    /// The backend's current location.
    fn location(&self) -> HistoryLocation;

    /// Subscribe to backend-driven changes.
    fn listen(&self, listener: HistoryListener) -> ListenerHandle;

    /// Add an entry. Does not notify listeners.
    fn push(&self, to: &HistoryLocation);

    /// Replace the current entry. Does not notify listeners.
    fn replace(&self, to: &HistoryLocation);

    /// Move one entry back.
    fn back(&self, trigger_listeners: bool);

    /// Move one entry forward.
    fn forward(&self, trigger_listeners: bool);

    /// Url (de)serialization used with this backend.
    fn normalizer(&self) -> &dyn LocationNormalizer {
        &UrlNormalizer
    }
}
