//! Declarative access rules.
//!
//! # Responsibilities
//! - Match target locations by path prefix (case-sensitive)
//! - Match target locations by a boolean metadata flag
//! - Combine conditions with AND semantics
//! - Turn each rule into a global guard that aborts or redirects
//!
//! # Design Decisions
//! - Empty condition list = always matches (wildcard)
//! - No regex to guarantee O(n) matching
//! - Rules only look at the target; the origin never matters

use std::sync::Arc;

use crate::config::schema::AccessRule;
use crate::location::{Location, RouteTarget};
use crate::navigation::{Guard, GuardHandle, GuardOutcome, Router};

/// Condition evaluated against a navigation target.
pub trait Condition: Send + Sync + std::fmt::Debug {
    /// Returns true if the location matches this condition.
    fn matches(&self, to: &Location) -> bool;
}

/// Matches the target path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixCondition {
    prefix: String,
}

impl PathPrefixCondition {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Condition for PathPrefixCondition {
    fn matches(&self, to: &Location) -> bool {
        to.path.starts_with(&self.prefix)
    }
}

/// Matches targets whose merged metadata sets `key` to `true`.
#[derive(Debug, Clone)]
pub struct MetaFlagCondition {
    key: String,
}

impl MetaFlagCondition {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Condition for MetaFlagCondition {
    fn matches(&self, to: &Location) -> bool {
        to.meta
            .get(&self.key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Combines multiple conditions with AND semantics.
#[derive(Debug, Default)]
pub struct AllOf {
    conditions: Vec<Box<dyn Condition>>,
}

impl AllOf {
    pub fn new(conditions: Vec<Box<dyn Condition>>) -> Self {
        Self { conditions }
    }
}

impl Condition for AllOf {
    fn matches(&self, to: &Location) -> bool {
        self.conditions.iter().all(|c| c.matches(to))
    }
}

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    Deny,
    Redirect(RouteTarget),
}

/// A rule ready to be installed.
#[derive(Debug)]
pub struct CompiledRule {
    name: String,
    condition: AllOf,
    action: RuleAction,
}

impl CompiledRule {
    pub fn new(name: impl Into<String>, condition: AllOf, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            condition,
            action,
        }
    }

    pub fn from_config(rule: &AccessRule) -> Self {
        let mut conditions: Vec<Box<dyn Condition>> = Vec::new();
        if let Some(prefix) = &rule.path_prefix {
            conditions.push(Box::new(PathPrefixCondition::new(prefix.clone())));
        }
        if let Some(key) = &rule.meta_key {
            conditions.push(Box::new(MetaFlagCondition::new(key.clone())));
        }
        let action = match &rule.redirect {
            Some(target) => RuleAction::Redirect(target.clone()),
            None => RuleAction::Deny,
        };
        Self::new(rule.name.clone(), AllOf::new(conditions), action)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decide for one target.
    pub fn evaluate(&self, to: &Location) -> GuardOutcome {
        if !self.condition.matches(to) {
            return GuardOutcome::Continue;
        }
        tracing::debug!(rule = %self.name, path = %to.full_path, "Access rule matched");
        match &self.action {
            RuleAction::Deny => GuardOutcome::Abort,
            RuleAction::Redirect(target) => GuardOutcome::Redirect(target.clone()),
        }
    }

    pub fn into_guard(self) -> Guard {
        let rule = Arc::new(self);
        Guard::sync(move |to: &Location, _: &Location| rule.evaluate(to))
    }
}

/// Ordered access rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn from_config(rules: &[AccessRule]) -> Self {
        Self {
            rules: rules.iter().map(CompiledRule::from_config).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Register every rule as a `before_each` guard, in order.
    pub fn install(self, router: &Router) -> Vec<GuardHandle> {
        self.rules
            .into_iter()
            .map(|rule| {
                tracing::debug!(rule = %rule.name(), "Installing access rule");
                router.before_each(rule.into_guard())
            })
            .collect()
    }
}
