//! Normalized locations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::location::query::{Params, Query};
use crate::matcher::{MatchedRoute, RecordId, RouteRecord};

/// Opaque route metadata, merged root to leaf along the matched chain.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A location as the history backend sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLocation {
    pub path: String,
    pub query: Query,
    pub hash: String,
    pub full_path: String,
}

/// A fully resolved navigation target.
///
/// Once committed a location is shared as `Arc<Location>` and treated as a
/// frozen snapshot. The matched chain is skipped during serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub name: Option<String>,
    pub path: String,
    pub full_path: String,
    pub query: Query,
    pub hash: String,
    pub params: Params,
    pub meta: Meta,
    #[serde(skip)]
    pub matched: Vec<Arc<RouteRecord>>,
    pub redirected_from: Option<Arc<Location>>,
    #[serde(skip)]
    start: bool,
}

impl Location {
    /// The sentinel location a router starts from.
    pub fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            full_path: "/".to_string(),
            query: Query::new(),
            hash: String::new(),
            params: Params::new(),
            meta: Meta::new(),
            matched: Vec::new(),
            redirected_from: None,
            start: true,
        }
    }

    /// Build a location from a matcher result and the url pieces it was
    /// requested with.
    pub fn from_match(
        route: MatchedRoute,
        url: HistoryLocation,
        redirected_from: Option<Arc<Location>>,
    ) -> Self {
        Self {
            name: route.name,
            path: url.path,
            full_path: url.full_path,
            query: url.query,
            hash: url.hash,
            params: route.params,
            meta: route.meta,
            matched: route.matched,
            redirected_from,
            start: false,
        }
    }

    /// True only for the sentinel returned by [`Location::start`].
    pub fn is_start(&self) -> bool {
        self.start
    }

    /// The leaf record of the matched chain.
    pub fn leaf(&self) -> Option<&Arc<RouteRecord>> {
        self.matched.last()
    }

    /// Whether the record with `id` is part of the matched chain.
    pub fn contains_record(&self, id: RecordId) -> bool {
        self.matched.iter().any(|record| record.id() == id)
    }

    /// Locations this one was redirected from, nearest first.
    pub fn redirect_chain(&self) -> impl Iterator<Item = &Location> {
        std::iter::successors(self.redirected_from.as_deref(), |loc| {
            loc.redirected_from.as_deref()
        })
    }

    /// The history entry for this location.
    pub fn history_location(&self) -> HistoryLocation {
        HistoryLocation {
            path: self.path.clone(),
            query: self.query.clone(),
            hash: self.hash.clone(),
            full_path: self.full_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_distinguishable() {
        let start = Location::start();
        assert!(start.is_start());

        let mut copy = start.clone();
        assert!(copy.is_start());
        copy.start = false;
        assert_eq!(copy.full_path, start.full_path);
        assert!(!copy.is_start());
    }

    #[test]
    fn test_serialization_hides_matched_chain() {
        let location = Location::start();
        let json = serde_json::to_value(&location).unwrap();
        assert!(json.get("matched").is_none());
        assert!(json.get("start").is_none());
        assert_eq!(json["full_path"], "/");
    }
}
