//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation subsystems produce:
//!     → tracing events and spans (one span per navigation, uuid id)
//!     → metrics.rs (counters, histograms)
//!
//! The binary installs:
//!     → logging.rs (subscriber with env filter, stderr output)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages
//! - Navigation id flows through every event of an attempt via the span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
