//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route names are unique and patterns compile
//! - Validate value ranges (`max_redirects > 0`)
//! - Detect rules that would redirect into themselves
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{AccessRule, RouteConfig, RouterConfig};
use crate::location::RouteTarget;
use crate::matcher::pattern::{join_paths, PathPattern};
use crate::matcher::MatcherError;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("max_redirects must be greater than zero")]
    ZeroMaxRedirects,

    #[error("top-level route #{0} has an empty path")]
    EmptyPath(usize),

    #[error("route name '{0}' is used more than once")]
    DuplicateName(String),

    #[error("route '{path}' has an invalid pattern: {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("route '{0}' declares both a redirect and children")]
    RedirectWithChildren(String),

    #[error("route '{path}' declares view '{view}' twice")]
    DuplicateView { path: String, view: String },

    #[error("rule '{0}' has no condition and would match every navigation")]
    UnconditionalRule(String),

    #[error("rule '{rule}' redirects to '{target}', which it matches itself")]
    SelfRedirectingRule { rule: String, target: String },
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.max_redirects == 0 {
        errors.push(ValidationError::ZeroMaxRedirects);
    }

    let mut names = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyPath(index));
        }
        validate_route(route, "", &mut names, &mut errors);
    }

    for rule in &config.rules {
        validate_rule(rule, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(
    route: &RouteConfig,
    parent: &str,
    names: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    let path = join_paths(parent, &route.path);

    if let Err(MatcherError::InvalidPattern { reason, .. }) =
        PathPattern::parse(if path.is_empty() { "/" } else { &path })
    {
        errors.push(ValidationError::InvalidPattern {
            path: path.clone(),
            reason,
        });
    }

    if let Some(name) = &route.name {
        if !names.insert(name.clone()) {
            errors.push(ValidationError::DuplicateName(name.clone()));
        }
    }

    if route.redirect.is_some() && !route.children.is_empty() {
        errors.push(ValidationError::RedirectWithChildren(path.clone()));
    }

    let mut views = HashSet::new();
    if route.component.is_some() {
        views.insert(crate::matcher::record::DEFAULT_VIEW.to_string());
    }
    for view in &route.views {
        if !views.insert(view.name.clone()) {
            errors.push(ValidationError::DuplicateView {
                path: path.clone(),
                view: view.name.clone(),
            });
        }
    }

    for child in &route.children {
        validate_route(child, &path, names, errors);
    }
}

fn validate_rule(rule: &AccessRule, errors: &mut Vec<ValidationError>) {
    if rule.path_prefix.is_none() && rule.meta_key.is_none() {
        errors.push(ValidationError::UnconditionalRule(rule.name.clone()));
    }

    // Only path redirects can be checked without resolving.
    if let (Some(prefix), Some(RouteTarget::Path(target))) = (&rule.path_prefix, &rule.redirect) {
        if rule.meta_key.is_none() && target.starts_with(prefix.as_str()) {
            errors.push(ValidationError::SelfRedirectingRule {
                rule: rule.name.clone(),
                target: target.clone(),
            });
        }
    }
}
