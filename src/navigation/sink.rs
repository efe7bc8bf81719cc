//! Reactive publication of committed routes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::location::Location;

/// Receives every committed location, in commit order.
pub trait RouteSink: Send + Sync {
    fn publish(&self, route: Arc<Location>);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl RouteSink for NoopSink {
    fn publish(&self, _route: Arc<Location>) {}
}

impl RouteSink for watch::Sender<Arc<Location>> {
    fn publish(&self, route: Arc<Location>) {
        self.send_replace(route);
    }
}
