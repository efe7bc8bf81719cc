//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! push / replace / history change
//!     → resolver.rs (matcher + redirect records, bounded)
//!     → router.rs (new generation, duplicate check)
//!     → pipeline.rs (leave → before_each → update → before_enter → enter)
//!     → router.rs (generation check, then commit)
//!         history push/replace → current location → sink
//!         → readiness gate → after_each hooks
//!
//! Failures:
//!     GuardRedirect → error handlers, new push to the redirect target
//!     Aborted / RedirectLoop / Matcher / Guard → error handlers, returned
//!     Cancelled → logged, returned
//! ```
//!
//! # Design Decisions
//! - Guards of every shape are normalized to one boxed future type
//! - Removal handles identify registrations, not positions
//! - The pipeline has no side effects; only the router commits

pub mod error;
pub mod guard;
pub mod pipeline;
pub mod ready;
pub mod resolver;
pub mod router;
pub mod sink;

pub use error::{GuardError, NavigationError};
pub use guard::{AfterHook, ErrorHandler, Guard, GuardContext, GuardOutcome, IntoGuardOutcome};
pub use pipeline::{GuardPhase, GuardPipeline};
pub use ready::ReadinessGate;
pub use resolver::RedirectResolver;
pub use router::{HistoryChange, Router, RouterOptions, DEFAULT_MAX_REDIRECTS};
pub use sink::{NoopSink, RouteSink};

/// Removes a guard, hook or error handler registration.
pub type GuardHandle = crate::registry::RegistrationHandle;
