//! Redirect resolution.
//!
//! # Responsibilities
//! - Translate caller targets into matcher input
//! - Follow redirect records until a concrete chain is produced
//! - Attach the `redirected_from` back-reference along the way
//!
//! # Design Decisions
//! - Redirect chains are bounded; exceeding the bound is `RedirectLoop`
//! - Redirect targets carry their own query/hash; nothing is inherited
//!   except through dynamic redirects, which see the intermediate location
//! - Named redirects inherit the redirecting location's params

use std::sync::Arc;

use crate::location::{
    normalize_hash, HistoryLocation, Location, LocationNormalizer, RouteTarget,
};
use crate::matcher::{
    MatchOutcome, MatcherLocation, MatcherTarget, Redirect, RedirectMatch, RouteMatcher,
};
use crate::navigation::error::NavigationError;
use crate::observability::metrics;

/// Resolves targets to concrete locations, following redirect records.
pub struct RedirectResolver<'a> {
    matcher: &'a dyn RouteMatcher,
    normalizer: &'a dyn LocationNormalizer,
    max_redirects: usize,
}

impl<'a> RedirectResolver<'a> {
    pub fn new(
        matcher: &'a dyn RouteMatcher,
        normalizer: &'a dyn LocationNormalizer,
        max_redirects: usize,
    ) -> Self {
        Self {
            matcher,
            normalizer,
            max_redirects,
        }
    }

    /// Resolve `target` relative to `current`.
    pub fn resolve(
        &self,
        target: &RouteTarget,
        current: &Location,
        redirected_from: Option<Arc<Location>>,
    ) -> Result<Location, NavigationError> {
        self.resolve_at(target, current, redirected_from, 0)
    }

    fn resolve_at(
        &self,
        target: &RouteTarget,
        current: &Location,
        redirected_from: Option<Arc<Location>>,
        depth: usize,
    ) -> Result<Location, NavigationError> {
        let request = self.matcher_location(target);

        match self.matcher.resolve(&request, current)? {
            MatchOutcome::Matched(route) => {
                let url = self.url(&route.path, &request);
                Ok(Location::from_match(route, url, redirected_from))
            }
            MatchOutcome::Redirect(RedirectMatch {
                redirect,
                normalized,
            }) => {
                let url = self.url(&normalized.path, &request);
                let intermediate =
                    Arc::new(Location::from_match(normalized, url, redirected_from));

                if depth >= self.max_redirects {
                    let origin = intermediate
                        .redirect_chain()
                        .last()
                        .unwrap_or(intermediate.as_ref());
                    tracing::warn!(
                        path = %origin.full_path,
                        limit = self.max_redirects,
                        "Redirect limit exceeded"
                    );
                    return Err(NavigationError::RedirectLoop {
                        path: origin.full_path.clone(),
                        limit: self.max_redirects,
                    });
                }

                let next = match redirect {
                    Redirect::Target(target) => target,
                    Redirect::Dynamic(compute) => compute(intermediate.as_ref()),
                };
                let next = inherit_params(next, &intermediate);
                tracing::debug!(
                    from = %intermediate.full_path,
                    to = %next,
                    depth,
                    "Following redirect record"
                );
                metrics::record_redirect("record");

                self.resolve_at(&next, current, Some(intermediate), depth + 1)
            }
        }
    }

    /// Matcher input for a caller target.
    pub fn matcher_location(&self, target: &RouteTarget) -> MatcherLocation {
        match target {
            RouteTarget::Path(raw) => self.normalizer.normalize_location(raw).into(),
            RouteTarget::Location(loc) => {
                if let Some(raw) = &loc.path {
                    let url = self.normalizer.normalize_location(raw);
                    let mut query = url.query;
                    query.extend(loc.query.clone());
                    MatcherLocation {
                        target: MatcherTarget::Path(url.path),
                        query,
                        hash: loc.hash.clone().unwrap_or(url.hash),
                    }
                } else {
                    let target = match &loc.name {
                        Some(name) => MatcherTarget::Named {
                            name: name.clone(),
                            params: loc.params.clone(),
                        },
                        None => MatcherTarget::Relative {
                            params: loc.params.clone(),
                        },
                    };
                    MatcherLocation {
                        target,
                        query: loc.query.clone(),
                        hash: loc.hash.clone().unwrap_or_default(),
                    }
                }
            }
        }
    }

    /// History entry for a matched path plus the request's query and hash.
    fn url(&self, path: &str, request: &MatcherLocation) -> HistoryLocation {
        let query = self.normalizer.normalize_query(&request.query);
        let hash = normalize_hash(&request.hash);
        let full_path = self.normalizer.stringify_url(path, &query, &hash);
        HistoryLocation {
            path: path.to_string(),
            query,
            hash,
            full_path,
        }
    }
}

/// Named and relative redirect targets reuse the redirecting location's
/// params; explicit params win.
fn inherit_params(target: RouteTarget, from: &Location) -> RouteTarget {
    match target {
        RouteTarget::Location(mut loc) if loc.path.is_none() => {
            let mut params = from.params.clone();
            params.extend(std::mem::take(&mut loc.params));
            loc.params = params;
            RouteTarget::Location(loc)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{QueryValue, TargetLocation, UrlNormalizer};
    use crate::matcher::{MatcherError, RouteDef, RouteTable};

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteDef::new("/").name("home"),
            RouteDef::new("/a").redirect("/b"),
            RouteDef::new("/b").name("b"),
            RouteDef::new("/users/:id").name("user"),
            RouteDef::new("/legacy/:id").redirect(Redirect::dynamic(|loc: &Location| {
                TargetLocation::named("user")
                    .param("id", loc.params["id"].clone())
                    .query("from", "legacy")
                    .into()
            })),
            RouteDef::new("/ping").redirect("/pong"),
            RouteDef::new("/pong").redirect("/ping"),
        ])
        .unwrap()
    }

    fn resolver(table: &RouteTable) -> RedirectResolver<'_> {
        RedirectResolver::new(table, &UrlNormalizer, 10)
    }

    #[test]
    fn test_redirect_keeps_origin() {
        let table = table();
        let location = resolver(&table)
            .resolve(&"/a".into(), &Location::start(), None)
            .unwrap();

        assert_eq!(location.full_path, "/b");
        assert_eq!(location.name.as_deref(), Some("b"));
        let origin = location.redirected_from.as_deref().unwrap();
        assert_eq!(origin.full_path, "/a");
        assert!(origin.matched.is_empty());
    }

    #[test]
    fn test_string_redirect_drops_query() {
        let table = table();
        let location = resolver(&table)
            .resolve(&"/a?x=1#top".into(), &Location::start(), None)
            .unwrap();
        assert_eq!(location.full_path, "/b");
        assert_eq!(location.redirected_from.as_ref().unwrap().full_path, "/a?x=1#top");
    }

    #[test]
    fn test_dynamic_redirect_sees_intermediate() {
        let table = table();
        let location = resolver(&table)
            .resolve(&"/legacy/9".into(), &Location::start(), None)
            .unwrap();
        assert_eq!(location.full_path, "/users/9?from=legacy");
        assert_eq!(location.params["id"], QueryValue::from("9"));
    }

    #[test]
    fn test_redirect_loop_is_bounded() {
        let table = table();
        let err = RedirectResolver::new(&table, &UrlNormalizer, 3)
            .resolve(&"/ping".into(), &Location::start(), None)
            .unwrap_err();
        match err {
            NavigationError::RedirectLoop { path, limit } => {
                assert_eq!(path, "/ping");
                assert_eq!(limit, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_object_target_merges_query_and_hash() {
        let table = table();
        let target: RouteTarget = TargetLocation::path("/users/3?tab=posts")
            .query("page", "2")
            .hash("bio")
            .into();
        let location = resolver(&table)
            .resolve(&target, &Location::start(), None)
            .unwrap();
        assert_eq!(location.full_path, "/users/3?page=2&tab=posts#bio");
    }

    #[test]
    fn test_relative_target_reuses_current_params() {
        let table = table();
        let resolver = resolver(&table);
        let current = resolver
            .resolve(&"/users/1".into(), &Location::start(), None)
            .unwrap();
        let next = resolver
            .resolve(
                &TargetLocation::relative().query("tab", "info").into(),
                &current,
                None,
            )
            .unwrap();
        assert_eq!(next.full_path, "/users/1?tab=info");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let table = table();
        let resolver = resolver(&table);
        let first = resolver
            .resolve(&"/users/5?b=2&a=1".into(), &Location::start(), None)
            .unwrap();
        let second = resolver
            .resolve(&first.full_path.clone().into(), &Location::start(), None)
            .unwrap();
        assert_eq!(first.full_path, second.full_path);
        assert_eq!(first.params, second.params);
        assert_eq!(first.name, second.name);
    }

    #[test]
    fn test_matcher_errors_propagate() {
        let table = table();
        let err = resolver(&table)
            .resolve(&TargetLocation::named("ghost").into(), &Location::start(), None)
            .unwrap_err();
        assert!(matches!(
            err,
            NavigationError::Matcher(MatcherError::UnknownRouteName(ref name)) if name == "ghost"
        ));
    }
}
