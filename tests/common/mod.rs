//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nav_router::history::MemoryHistory;
use nav_router::location::Location;
use nav_router::matcher::{RouteDef, RouteTable};
use nav_router::navigation::{
    Guard, GuardContext, NavigationError, RouteSink, Router, RouterOptions,
};
use tokio::sync::Notify;

/// Sink that remembers every published full path.
#[derive(Default)]
pub struct RecordingSink {
    routes: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl RouteSink for RecordingSink {
    fn publish(&self, route: Arc<Location>) {
        self.routes.lock().unwrap().push(route.full_path.clone());
    }
}

/// Ordered log shared between hooks and assertions.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// A guard that records `label` and lets the navigation through.
    pub fn guard(&self, label: &str) -> Guard {
        let log = self.clone();
        let label = label.to_string();
        Guard::sync(move |_: &Location, _: &Location| log.push(label.clone()))
    }
}

/// Errors delivered to `on_error` handlers.
#[derive(Clone, Default)]
pub struct ErrorLog(Arc<Mutex<Vec<NavigationError>>>);

impl ErrorLog {
    pub fn attach(&self, router: &Router) {
        let log = self.clone();
        router.on_error(move |err| log.0.lock().unwrap().push(err.clone()));
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(|e| e.kind()).collect()
    }

    pub fn errors(&self) -> Vec<NavigationError> {
        self.0.lock().unwrap().clone()
    }
}

pub struct Fixture {
    pub router: Arc<Router>,
    pub history: Arc<MemoryHistory>,
    pub sink: Arc<RecordingSink>,
    pub errors: ErrorLog,
}

/// A router over `routes`, with history starting at `/`.
pub fn fixture(routes: Vec<RouteDef>) -> Fixture {
    let history = Arc::new(MemoryHistory::new("/"));
    let sink = Arc::new(RecordingSink::default());
    let table = RouteTable::new(routes).expect("valid routes");
    let router = Arc::new(Router::new(
        RouterOptions::new(history.clone(), Arc::new(table)).with_sink(sink.clone()),
    ));
    let errors = ErrorLog::default();
    errors.attach(&router);
    Fixture {
        router,
        history,
        sink,
        errors,
    }
}

/// Flat routes `/`, `/a`, `/b`, ... for the given paths.
pub fn flat_routes(paths: &[&str]) -> Vec<RouteDef> {
    paths.iter().map(|path| RouteDef::new(*path)).collect()
}

/// A guard that blocks navigations to `path` until `release` is notified.
/// `entered` is notified once the guard starts waiting.
pub fn gate(path: &str, entered: Arc<Notify>, release: Arc<Notify>) -> Guard {
    let path = path.to_string();
    Guard::new(move |ctx: GuardContext| {
        let path = path.clone();
        let entered = entered.clone();
        let release = release.clone();
        async move {
            if ctx.to.path == path {
                entered.notify_one();
                release.notified().await;
            }
        }
    })
}

/// Poll `condition` until it holds or a second has passed.
pub async fn wait_until<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Run `fut` with a one second timeout.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(1), fut)
        .await
        .expect("timed out")
}
