//! Route matching subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (router construction):
//!     RouteDef tree
//!     → record.rs (RouteRecord per definition, RecordId assigned)
//!     → pattern.rs (compile absolute path patterns)
//!     → table.rs (flatten into matchable chains, children first)
//!     → frozen RouteTable
//!
//! Lookup:
//!     MatcherLocation (path | name + params | relative params)
//!     → table.rs
//!     → MatchOutcome::Matched(chain) or MatchOutcome::Redirect(directive)
//! ```
//!
//! # Design Decisions
//! - Records are immutable after construction and compared by `RecordId`
//! - Deterministic: same input always yields the same chain
//! - First match wins; children are tried before their parent
//! - An unmatched path is not an error: it resolves to an empty chain

pub mod pattern;
pub mod record;
pub mod table;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::location::{HistoryLocation, Location, Meta, Params, Query, RouteTarget, TargetLocation};

pub use pattern::PathPattern;
pub use record::{Component, ComponentInstance, RecordId, RouteDef, RouteRecord};
pub use table::RouteTable;

/// Matcher input: what to match plus the query/hash it travels with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherLocation {
    pub target: MatcherTarget,
    pub query: Query,
    pub hash: String,
}

/// The part of a target the matcher looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherTarget {
    Path(String),
    Named { name: String, params: Params },
    Relative { params: Params },
}

impl MatcherLocation {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            target: MatcherTarget::Path(path.into()),
            query: Query::new(),
            hash: String::new(),
        }
    }
}

impl From<HistoryLocation> for MatcherLocation {
    fn from(url: HistoryLocation) -> Self {
        Self {
            target: MatcherTarget::Path(url.path),
            query: url.query,
            hash: url.hash,
        }
    }
}

/// A concrete match.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    pub name: Option<String>,
    pub path: String,
    pub params: Params,
    pub meta: Meta,
    pub matched: Vec<Arc<RouteRecord>>,
}

/// How a redirect record computes its destination.
#[derive(Clone)]
pub enum Redirect {
    /// A fixed path or structured target.
    Target(RouteTarget),
    /// Computed from the would-be location of the redirecting record.
    Dynamic(Arc<dyn Fn(&Location) -> RouteTarget + Send + Sync>),
}

impl Redirect {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Location) -> RouteTarget + Send + Sync + 'static,
    {
        Redirect::Dynamic(Arc::new(f))
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::Target(target) => f.debug_tuple("Target").field(target).finish(),
            Redirect::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<RouteTarget> for Redirect {
    fn from(target: RouteTarget) -> Self {
        Redirect::Target(target)
    }
}

impl From<&str> for Redirect {
    fn from(path: &str) -> Self {
        Redirect::Target(RouteTarget::from(path))
    }
}

impl From<TargetLocation> for Redirect {
    fn from(location: TargetLocation) -> Self {
        Redirect::Target(RouteTarget::from(location))
    }
}

/// A redirect directive together with the location that triggered it.
#[derive(Debug, Clone)]
pub struct RedirectMatch {
    pub redirect: Redirect,
    /// Would-be location of the redirecting record. Its chain is empty.
    pub normalized: MatchedRoute,
}

/// Result of a matcher lookup.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Matched(MatchedRoute),
    Redirect(RedirectMatch),
}

/// Malformed target descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    #[error("no route named '{0}'")]
    UnknownRouteName(String),

    #[error("missing parameter '{param}' for route '{route}'")]
    MissingParameter { route: String, param: String },

    #[error("relative navigation requires a current route")]
    NoCurrentRoute,

    #[error("duplicate route name '{0}'")]
    DuplicateRouteName(String),

    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Resolves targets against a route table.
///
/// Implementations must be deterministic and free of side effects.
pub trait RouteMatcher: Send + Sync {
    fn resolve(
        &self,
        location: &MatcherLocation,
        current: &Location,
    ) -> Result<MatchOutcome, MatcherError>;
}
