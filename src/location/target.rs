//! Caller-supplied navigation targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::query::{Params, Query, QueryValue};

/// Where a caller, a guard or a redirect wants to go.
///
/// Deserializes from either a plain string (`"/users/1?tab=posts"`) or a
/// table (`{ name = "user", params = { id = "1" } }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteTarget {
    Path(String),
    Location(TargetLocation),
}

/// Structured target: by path, by name, or relative to the current route
/// when neither is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetLocation {
    pub path: Option<String>,
    pub name: Option<String>,
    pub params: Params,
    pub query: Query,
    pub hash: Option<String>,
    pub replace: bool,
}

impl TargetLocation {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A target relative to the current route, only changing params.
    pub fn relative() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }
}

impl RouteTarget {
    /// Whether the target asks to replace the current history entry.
    pub fn is_replace(&self) -> bool {
        matches!(self, RouteTarget::Location(loc) if loc.replace)
    }

    /// Same target, flagged to replace the current history entry.
    pub fn into_replace(self) -> Self {
        match self {
            RouteTarget::Path(path) => RouteTarget::Location(TargetLocation::path(path).replace()),
            RouteTarget::Location(loc) => RouteTarget::Location(loc.replace()),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Path(path) => f.write_str(path),
            RouteTarget::Location(loc) => match (&loc.path, &loc.name) {
                (Some(path), _) => f.write_str(path),
                (None, Some(name)) => write!(f, "route '{}'", name),
                (None, None) => f.write_str("relative target"),
            },
        }
    }
}

impl From<&str> for RouteTarget {
    fn from(path: &str) -> Self {
        RouteTarget::Path(path.to_string())
    }
}

impl From<String> for RouteTarget {
    fn from(path: String) -> Self {
        RouteTarget::Path(path)
    }
}

impl From<TargetLocation> for RouteTarget {
    fn from(location: TargetLocation) -> Self {
        RouteTarget::Location(location)
    }
}
