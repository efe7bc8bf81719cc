//! Route table: the default [`RouteMatcher`].
//!
//! # Responsibilities
//! - Compile nested route definitions into matchable chains
//! - Resolve path, named and relative targets
//! - Surface redirect records as redirect directives
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(1) lookup for named and relative targets
//! - O(n) pattern scan for paths (acceptable for typical route counts)
//! - Explicit empty chain for unknown paths rather than a silent default

use std::collections::HashMap;
use std::sync::Arc;

use crate::location::{Location, Meta, Params};
use crate::matcher::pattern::{join_paths, PathPattern};
use crate::matcher::record::{RecordId, RouteDef, RouteRecord};
use crate::matcher::{
    MatchOutcome, MatchedRoute, MatcherError, MatcherLocation, MatcherTarget, RedirectMatch,
    RouteMatcher,
};

/// Compiled, immutable route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Root-to-leaf chains in match priority order.
    chains: Vec<Vec<Arc<RouteRecord>>>,
    by_name: HashMap<String, usize>,
    by_leaf: HashMap<RecordId, usize>,
    next_id: usize,
}

impl RouteTable {
    /// Compile route definitions. Fails on duplicate names or invalid patterns.
    pub fn new(routes: impl IntoIterator<Item = RouteDef>) -> Result<Self, MatcherError> {
        let mut table = Self::default();
        for def in routes {
            table.add(&def, &[])?;
        }
        tracing::debug!(records = table.chains.len(), "Route table compiled");
        Ok(table)
    }

    fn add(&mut self, def: &RouteDef, parent_chain: &[Arc<RouteRecord>]) -> Result<(), MatcherError> {
        let parent = parent_chain.last();
        let mut path = join_paths(parent.map(|r| r.path()).unwrap_or(""), &def.path);
        if path.is_empty() {
            path.push('/');
        }
        let pattern = PathPattern::parse(&path)?;

        let id = RecordId(self.next_id);
        self.next_id += 1;
        let record = Arc::new(RouteRecord::new(id, pattern, def, parent.map(|r| r.id())));
        let mut chain = parent_chain.to_vec();
        chain.push(record);

        // Children are registered first so they win over their parent.
        for child in &def.children {
            self.add(child, &chain)?;
        }

        let index = self.chains.len();
        if let Some(name) = &def.name {
            if self.by_name.insert(name.clone(), index).is_some() {
                return Err(MatcherError::DuplicateRouteName(name.clone()));
            }
        }
        self.by_leaf.insert(id, index);
        self.chains.push(chain);
        Ok(())
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Look up a record by route name.
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<RouteRecord>> {
        self.by_name
            .get(name)
            .and_then(|index| self.chains[*index].last())
    }

    fn chain_of(&self, leaf: &Arc<RouteRecord>) -> Option<&[Arc<RouteRecord>]> {
        let index = self.by_leaf.get(&leaf.id())?;
        let chain = &self.chains[*index];
        // Ids are only meaningful within this table.
        chain
            .last()
            .filter(|candidate| Arc::ptr_eq(*candidate, leaf))
            .map(|_| chain.as_slice())
    }

    fn build(&self, chain: &[Arc<RouteRecord>], params: Params) -> Result<MatchOutcome, MatcherError> {
        let Some(leaf) = chain.last() else {
            return Err(MatcherError::UnknownRouteName(String::new()));
        };
        let path = leaf.pattern().build(&params).map_err(|param| {
            MatcherError::MissingParameter {
                route: leaf.name().unwrap_or(leaf.path()).to_string(),
                param,
            }
        })?;
        let params = params
            .into_iter()
            .filter(|(key, _)| leaf.pattern().param_names().any(|name| name == key.as_str()))
            .collect();
        Ok(outcome(chain, path, params))
    }
}

impl RouteMatcher for RouteTable {
    fn resolve(
        &self,
        location: &MatcherLocation,
        current: &Location,
    ) -> Result<MatchOutcome, MatcherError> {
        match &location.target {
            MatcherTarget::Path(path) => {
                for chain in &self.chains {
                    let Some(leaf) = chain.last() else { continue };
                    if let Some(params) = leaf.pattern().matches(path) {
                        return Ok(outcome(chain, path.clone(), params));
                    }
                }
                tracing::debug!(path = %path, "No route matched");
                Ok(MatchOutcome::Matched(MatchedRoute {
                    name: None,
                    path: path.clone(),
                    params: Params::new(),
                    meta: Meta::new(),
                    matched: Vec::new(),
                }))
            }
            MatcherTarget::Named { name, params } => {
                let index = self
                    .by_name
                    .get(name)
                    .ok_or_else(|| MatcherError::UnknownRouteName(name.clone()))?;
                self.build(&self.chains[*index], params.clone())
            }
            MatcherTarget::Relative { params } => {
                if current.is_start() {
                    return Err(MatcherError::NoCurrentRoute);
                }
                let mut merged = current.params.clone();
                merged.extend(params.clone());
                match current.leaf().and_then(|leaf| self.chain_of(leaf)) {
                    Some(chain) => self.build(chain, merged),
                    None => Ok(MatchOutcome::Matched(MatchedRoute {
                        name: current.name.clone(),
                        path: current.path.clone(),
                        params: merged,
                        meta: current.meta.clone(),
                        matched: current.matched.clone(),
                    })),
                }
            }
        }
    }
}

fn outcome(chain: &[Arc<RouteRecord>], path: String, params: Params) -> MatchOutcome {
    let leaf = chain.last();
    let route = MatchedRoute {
        name: leaf.and_then(|r| r.name()).map(str::to_string),
        path,
        params,
        meta: merge_meta(chain),
        matched: chain.to_vec(),
    };

    match leaf.and_then(|r| r.redirect()) {
        Some(redirect) => MatchOutcome::Redirect(RedirectMatch {
            redirect: redirect.clone(),
            normalized: MatchedRoute {
                matched: Vec::new(),
                ..route
            },
        }),
        None => MatchOutcome::Matched(route),
    }
}

/// Merge record metadata root to leaf; deeper records win.
fn merge_meta(chain: &[Arc<RouteRecord>]) -> Meta {
    let mut meta = Meta::new();
    for record in chain {
        for (key, value) in record.meta() {
            meta.insert(key.clone(), value.clone());
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{QueryValue, RouteTarget};
    use crate::matcher::Redirect;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteDef::new("/").name("home"),
            RouteDef::new("/users")
                .name("users")
                .meta("section", "people")
                .children(vec![
                    RouteDef::new(":id").name("user").meta("detail", true),
                    RouteDef::new("new").name("new-user"),
                ]),
            RouteDef::new("/old").redirect("/users"),
        ])
        .unwrap()
    }

    fn matched(outcome: MatchOutcome) -> MatchedRoute {
        match outcome {
            MatchOutcome::Matched(route) => route,
            MatchOutcome::Redirect(r) => panic!("unexpected redirect: {:?}", r),
        }
    }

    #[test]
    fn test_nested_path_match() {
        let table = table();
        let route = matched(
            table
                .resolve(&MatcherLocation::path("/users/42"), &Location::start())
                .unwrap(),
        );
        assert_eq!(route.name.as_deref(), Some("user"));
        assert_eq!(route.matched.len(), 2);
        assert_eq!(route.matched[0].name(), Some("users"));
        assert_eq!(route.params.get("id"), Some(&QueryValue::from("42")));
        assert_eq!(route.meta["section"], "people");
        assert_eq!(route.meta["detail"], true);
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let table = table();
        // `:id` is registered before `new`, so it captures it.
        let route = matched(
            table
                .resolve(&MatcherLocation::path("/users/new"), &Location::start())
                .unwrap(),
        );
        assert_eq!(route.name.as_deref(), Some("user"));
    }

    #[test]
    fn test_unknown_path_yields_empty_chain() {
        let route = matched(
            table()
                .resolve(&MatcherLocation::path("/nope"), &Location::start())
                .unwrap(),
        );
        assert!(route.matched.is_empty());
        assert_eq!(route.path, "/nope");
    }

    #[test]
    fn test_named_resolution() {
        let table = table();
        let mut params = Params::new();
        params.insert("id".into(), QueryValue::from("7"));
        params.insert("unused".into(), QueryValue::from("x"));
        let location = MatcherLocation {
            target: MatcherTarget::Named {
                name: "user".into(),
                params,
            },
            ..MatcherLocation::path("")
        };
        let route = matched(table.resolve(&location, &Location::start()).unwrap());
        assert_eq!(route.path, "/users/7");
        assert!(!route.params.contains_key("unused"));
    }

    #[test]
    fn test_named_errors() {
        let table = table();
        let unknown = MatcherLocation {
            target: MatcherTarget::Named {
                name: "ghost".into(),
                params: Params::new(),
            },
            ..MatcherLocation::path("")
        };
        assert_eq!(
            table.resolve(&unknown, &Location::start()).unwrap_err(),
            MatcherError::UnknownRouteName("ghost".into())
        );

        let missing = MatcherLocation {
            target: MatcherTarget::Named {
                name: "user".into(),
                params: Params::new(),
            },
            ..MatcherLocation::path("")
        };
        assert!(matches!(
            table.resolve(&missing, &Location::start()),
            Err(MatcherError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_redirect_record() {
        let outcome = table()
            .resolve(&MatcherLocation::path("/old"), &Location::start())
            .unwrap();
        match outcome {
            MatchOutcome::Redirect(RedirectMatch { redirect, normalized }) => {
                assert!(matches!(redirect, Redirect::Target(RouteTarget::Path(ref p)) if p == "/users"));
                assert_eq!(normalized.path, "/old");
                assert!(normalized.matched.is_empty());
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_needs_current_route() {
        let relative = MatcherLocation {
            target: MatcherTarget::Relative {
                params: Params::new(),
            },
            ..MatcherLocation::path("")
        };
        assert_eq!(
            table().resolve(&relative, &Location::start()).unwrap_err(),
            MatcherError::NoCurrentRoute
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = RouteTable::new(vec![
            RouteDef::new("/a").name("same"),
            RouteDef::new("/b").name("same"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            MatcherError::DuplicateRouteName("same".into())
        );
    }
}
