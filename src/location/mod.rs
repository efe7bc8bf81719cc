//! Locations and navigation targets.
//!
//! # Data Flow
//! ```text
//! caller target ("/users/1?tab=posts#top", { name, params }, ...)
//!     → target.rs (RouteTarget / TargetLocation)
//!     → normalizer.rs (split path, query and hash)
//!     → matcher (route chain + params)
//!     → route.rs (Location, frozen once committed)
//! ```
//!
//! # Design Decisions
//! - Query and params share one value type (single string or list)
//! - Maps are ordered (`BTreeMap`) so insertion order never leaks into full paths
//! - A committed `Location` is shared as `Arc<Location>` and never mutated

pub mod normalizer;
pub mod query;
pub mod route;
pub mod target;

pub use normalizer::{normalize_hash, parse_query, LocationNormalizer, UrlNormalizer};
pub use query::{Params, Query, QueryValue};
pub use route::{HistoryLocation, Location, Meta};
pub use target::{RouteTarget, TargetLocation};
