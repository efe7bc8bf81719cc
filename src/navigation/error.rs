//! Navigation failure types.

use std::sync::Arc;

use thiserror::Error;

use crate::location::RouteTarget;
use crate::matcher::MatcherError;

/// Error raised by user-supplied guards.
pub type GuardError = Arc<dyn std::error::Error + Send + Sync>;

/// Everything a navigation can end with besides success.
#[derive(Debug, Clone, Error)]
pub enum NavigationError {
    /// A guard asked to go somewhere else. Control flow, not a failure:
    /// the router turns it into a new navigation.
    #[error("navigation from '{from}' to '{to}' redirected to '{redirect}'")]
    GuardRedirect {
        from: String,
        to: String,
        redirect: RouteTarget,
    },

    /// A guard explicitly declined the navigation.
    #[error("navigation from '{from}' to '{to}' aborted by a guard")]
    Aborted { from: String, to: String },

    /// A newer navigation was issued before this one finished.
    #[error("navigation from '{from}' to '{to}' cancelled by a newer navigation")]
    Cancelled { from: String, to: String },

    /// Too many consecutive redirects.
    #[error("redirect chain starting at '{path}' exceeded {limit} redirects")]
    RedirectLoop { path: String, limit: usize },

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    /// A guard failed; the original error is kept as is.
    #[error("navigation guard failed: {0}")]
    Guard(GuardError),

    /// The router went away before the readiness gate settled.
    #[error("router dropped before the initial navigation settled")]
    Closed,
}

impl NavigationError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationError::GuardRedirect { .. } => "guard_redirect",
            NavigationError::Aborted { .. } => "aborted",
            NavigationError::Cancelled { .. } => "cancelled",
            NavigationError::RedirectLoop { .. } => "redirect_loop",
            NavigationError::Matcher(_) => "matcher",
            NavigationError::Guard(_) => "guard",
            NavigationError::Closed => "closed",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NavigationError::Cancelled { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, NavigationError::Aborted { .. })
    }

    /// The underlying guard error, if this failure came from one.
    pub fn guard_error(&self) -> Option<&GuardError> {
        match self {
            NavigationError::Guard(err) => Some(err),
            _ => None,
        }
    }
}
