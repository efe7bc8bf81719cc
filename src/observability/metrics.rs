//! Navigation metrics.
//!
//! # Metrics
//! - `navigation_started_total` (counter): attempts that reached the guards
//! - `navigation_committed_total` (counter): attempts that committed
//! - `navigation_failed_total` (counter): failures by `kind`
//! - `navigation_redirects_total` (counter): redirects by `source`
//!   (`record` or `guard`)
//! - `navigation_duration_seconds` (histogram): guard start to commit
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are static strings only

use std::time::Instant;

pub const STARTED: &str = "navigation_started_total";
pub const COMMITTED: &str = "navigation_committed_total";
pub const FAILED: &str = "navigation_failed_total";
pub const REDIRECTS: &str = "navigation_redirects_total";
pub const DURATION: &str = "navigation_duration_seconds";

pub fn record_started() {
    metrics::counter!(STARTED).increment(1);
}

pub fn record_committed(started: Instant) {
    metrics::counter!(COMMITTED).increment(1);
    metrics::histogram!(DURATION).record(started.elapsed().as_secs_f64());
}

pub fn record_failure(kind: &'static str) {
    metrics::counter!(FAILED, "kind" => kind).increment(1);
}

pub fn record_redirect(source: &'static str) {
    metrics::counter!(REDIRECTS, "source" => source).increment(1);
}
