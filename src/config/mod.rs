//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → builder.rs (route table + access rules → Router)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod builder;
pub mod loader;
pub mod schema;
pub mod validation;

pub use builder::{build_router, route_defs};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AccessRule, ObservabilityConfig, RouteConfig, RouterConfig, ViewConfig};
pub use validation::{validate_config, ValidationError};
