//! Router construction from configuration.
//!
//! # Responsibilities
//! - Turn `RouteConfig` trees into `RouteDef` trees
//! - Compile the route table
//! - Install access rules as global guards, in declaration order

use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::{RouteConfig, RouterConfig};
use crate::config::validation::validate_config;
use crate::history::History;
use crate::matcher::{Component, RouteDef, RouteTable};
use crate::navigation::{RouteSink, Router, RouterOptions};
use crate::rules::RuleSet;

/// Convert configured routes into route definitions.
pub fn route_defs(routes: &[RouteConfig]) -> Vec<RouteDef> {
    routes.iter().map(route_def).collect()
}

fn route_def(route: &RouteConfig) -> RouteDef {
    let mut def = RouteDef::new(route.path.clone());
    if let Some(name) = &route.name {
        def = def.name(name.clone());
    }
    if let Some(component) = &route.component {
        def = def.component(Component::new(component.clone()));
    }
    for view in &route.views {
        def = def.view(view.name.clone(), Component::new(view.component.clone()));
    }
    if let Some(redirect) = &route.redirect {
        def = def.redirect(redirect.clone());
    }
    def.meta = route.meta.clone();
    def.children(route_defs(&route.children))
}

/// Build a router from a validated configuration.
pub fn build_router(
    config: &RouterConfig,
    history: Arc<dyn History>,
    sink: Arc<dyn RouteSink>,
) -> Result<Router, ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    let table = RouteTable::new(route_defs(&config.routes))?;
    tracing::info!(
        routes = table.len(),
        rules = config.rules.len(),
        max_redirects = config.max_redirects,
        "Route table built"
    );

    let router = Router::new(
        RouterOptions::new(history, Arc::new(table))
            .with_sink(sink)
            .with_max_redirects(config.max_redirects),
    );
    RuleSet::from_config(&config.rules).install(&router);
    Ok(router)
}
