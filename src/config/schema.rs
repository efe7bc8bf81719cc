//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::location::{Meta, RouteTarget};
use crate::navigation::DEFAULT_MAX_REDIRECTS;

/// Root configuration of a router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Bound on consecutive redirects of one navigation.
    pub max_redirects: usize,

    /// Route tree, in match priority order.
    pub routes: Vec<RouteConfig>,

    /// Declarative access rules, installed as global guards in order.
    pub rules: Vec<AccessRule>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            routes: Vec::new(),
            rules: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// One route definition. Child paths without a leading `/` are relative.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path pattern (`/users/:id`, `*`).
    pub path: String,

    /// Unique route name for named navigation.
    #[serde(default)]
    pub name: Option<String>,

    /// Redirect target: a path string or a `{ name, params, query, hash }` table.
    #[serde(default)]
    pub redirect: Option<RouteTarget>,

    /// Free-form metadata merged into resolved locations.
    #[serde(default)]
    pub meta: Meta,

    /// Component name of the default view.
    #[serde(default)]
    pub component: Option<String>,

    /// Named views, in declaration order.
    #[serde(default)]
    pub views: Vec<ViewConfig>,

    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

/// A named view and the component rendered in it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    pub name: String,
    pub component: String,
}

/// Access rule turned into a global guard.
///
/// A rule matches when every configured condition holds. A matching rule
/// redirects when `redirect` is set and aborts the navigation otherwise.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccessRule {
    /// Rule identifier for logging.
    pub name: String,

    /// Match target paths starting with this prefix.
    #[serde(default)]
    pub path_prefix: Option<String>,

    /// Match targets whose merged metadata has this key set to `true`.
    #[serde(default)]
    pub meta_key: Option<String>,

    #[serde(default)]
    pub redirect: Option<RouteTarget>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
