//! Client-side navigation router library

pub mod config;
pub mod history;
pub mod lifecycle;
pub mod location;
pub mod matcher;
pub mod navigation;
pub mod observability;
pub mod registry;
pub mod rules;

pub use config::schema::RouterConfig;
pub use history::{History, MemoryHistory};
pub use lifecycle::Shutdown;
pub use location::{Location, RouteTarget, TargetLocation};
pub use matcher::{Component, RouteDef, RouteTable};
pub use navigation::{Guard, GuardOutcome, NavigationError, Router, RouterOptions};
