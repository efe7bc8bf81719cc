//! Navigation controller.
//!
//! # Responsibilities
//! - Own the current location and the guard registries
//! - Drive resolve → guards → commit for every navigation attempt
//! - React to history backend changes
//! - Settle the readiness gate
//!
//! # Design Decisions
//! - No queueing: each attempt takes a new generation and only the latest
//!   generation may commit
//! - An attempt takes its generation only once its target resolved and is
//!   not the current location
//! - History changes take their generation in event order, before the
//!   attempt is spawned
//! - The generation check and the commit run under one lock with no await
//!   in between
//! - Registries are snapshotted before iteration; hooks may (de)register
//!   while running
//! - A push from the start location replaces the initial history entry

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::history::{History, ListenerHandle, NavigationDirection, NavigationInfo};
use crate::location::{HistoryLocation, Location, RouteTarget};
use crate::matcher::RouteMatcher;
use crate::navigation::error::NavigationError;
use crate::navigation::guard::{AfterHook, ErrorHandler, Guard};
use crate::navigation::pipeline::GuardPipeline;
use crate::navigation::ready::ReadinessGate;
use crate::navigation::resolver::RedirectResolver;
use crate::navigation::sink::{NoopSink, RouteSink};
use crate::navigation::GuardHandle;
use crate::observability::metrics;
use crate::registry::Registry;

/// Redirect bound used when none is configured.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Collaborators and limits of a [`Router`].
pub struct RouterOptions {
    history: Arc<dyn History>,
    matcher: Arc<dyn RouteMatcher>,
    sink: Arc<dyn RouteSink>,
    max_redirects: usize,
}

impl RouterOptions {
    pub fn new(history: Arc<dyn History>, matcher: Arc<dyn RouteMatcher>) -> Self {
        Self {
            history,
            matcher,
            sink: Arc::new(NoopSink),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RouteSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

/// A change reported by the history backend.
#[derive(Debug, Clone)]
pub struct HistoryChange {
    pub to: HistoryLocation,
    pub from: HistoryLocation,
    pub info: NavigationInfo,
}

/// A resolved history change waiting for its guards.
struct PendingHistoryNavigation {
    to: Arc<Location>,
    from: Arc<Location>,
    direction: NavigationDirection,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMutation {
    Push,
    Replace,
    Skip,
}

/// The navigation controller.
pub struct Router {
    history: Arc<dyn History>,
    matcher: Arc<dyn RouteMatcher>,
    sink: Arc<dyn RouteSink>,
    max_redirects: usize,

    before_guards: Registry<Guard>,
    after_hooks: Registry<AfterHook>,
    error_handlers: Registry<ErrorHandler>,

    current: ArcSwap<Location>,
    generation: AtomicU64,
    commit_lock: Mutex<()>,
    ready: ReadinessGate,

    events: Mutex<Option<mpsc::UnboundedReceiver<HistoryChange>>>,
    history_listener: ListenerHandle,
}

impl Router {
    /// Create a router positioned at the start location.
    ///
    /// Backend changes are buffered until [`Router::listen`] runs.
    pub fn new(options: RouterOptions) -> Self {
        let RouterOptions {
            history,
            matcher,
            sink,
            max_redirects,
        } = options;

        let (tx, rx) = mpsc::unbounded_channel();
        let history_listener = history.listen(Arc::new(move |to: &HistoryLocation, from: &HistoryLocation, info: NavigationInfo| {
            let change = HistoryChange {
                to: to.clone(),
                from: from.clone(),
                info,
            };
            if tx.send(change).is_err() {
                tracing::debug!("History change dropped, router event loop is gone");
            }
        }));

        Self {
            history,
            matcher,
            sink,
            max_redirects,
            before_guards: Registry::new(),
            after_hooks: Registry::new(),
            error_handlers: Registry::new(),
            current: ArcSwap::from_pointee(Location::start()),
            generation: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            ready: ReadinessGate::new(),
            events: Mutex::new(Some(rx)),
            history_listener,
        }
    }

    /// Snapshot of the committed location.
    pub fn current_route(&self) -> Arc<Location> {
        self.current.load_full()
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    /// Register a global guard run before every navigation.
    pub fn before_each(&self, guard: Guard) -> GuardHandle {
        self.before_guards.register(guard)
    }

    /// Register a hook run after every committed navigation.
    pub fn after_each<F>(&self, hook: F) -> GuardHandle
    where
        F: Fn(&Location, &Location) + Send + Sync + 'static,
    {
        self.after_hooks.register(Arc::new(hook))
    }

    /// Register a handler for surfaced navigation failures.
    pub fn on_error<F>(&self, handler: F) -> GuardHandle
    where
        F: Fn(&NavigationError) + Send + Sync + 'static,
    {
        self.error_handlers.register(Arc::new(handler))
    }

    /// Resolves on the first commit, or fails with the initial navigation's error.
    pub fn on_ready(&self) -> impl std::future::Future<Output = Result<(), NavigationError>> + Send + 'static {
        self.ready.wait()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Resolve `target` against `current`, following redirect records.
    pub fn resolve_location(
        &self,
        target: &RouteTarget,
        current: &Location,
        redirected_from: Option<Arc<Location>>,
    ) -> Result<Location, NavigationError> {
        RedirectResolver::new(
            self.matcher.as_ref(),
            self.history.normalizer(),
            self.max_redirects,
        )
        .resolve(target, current, redirected_from)
    }

    /// Resolve `target` against the current location without navigating.
    pub fn resolve(&self, target: impl Into<RouteTarget>) -> Result<Location, NavigationError> {
        self.resolve_location(&target.into(), &self.current_route(), None)
    }

    /// Navigate to `target`, adding a history entry.
    pub async fn push(&self, target: impl Into<RouteTarget>) -> Result<Arc<Location>, NavigationError> {
        let target = target.into();
        let mutation = if target.is_replace() {
            HistoryMutation::Replace
        } else {
            HistoryMutation::Push
        };
        self.navigate(target, mutation, 0, None).await
    }

    /// Navigate to `target`, replacing the current history entry.
    pub async fn replace(&self, target: impl Into<RouteTarget>) -> Result<Arc<Location>, NavigationError> {
        self.navigate(target.into(), HistoryMutation::Replace, 0, None)
            .await
    }

    /// Navigate to the history backend's current location and settle the
    /// readiness gate with the outcome.
    pub async fn initial_navigation(&self) -> Result<Arc<Location>, NavigationError> {
        let entry = self.history.location();
        tracing::debug!(path = %entry.full_path, "Initial navigation");
        let result = self
            .navigate(entry.full_path.into(), HistoryMutation::Push, 0, None)
            .await;
        if let Err(err) = &result {
            if !err.is_cancelled() {
                self.ready.mark_ready(Err(err.clone()));
            }
        }
        result
    }

    /// Run the history event loop until `shutdown` fires.
    ///
    /// Each backend change is handled on its own task. Only one loop can
    /// run per router; later calls return a task that exits immediately.
    pub fn listen(self: &Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let router = Arc::clone(self);

        tokio::spawn(async move {
            let Some(mut events) = events else {
                tracing::warn!("History listener already running");
                return;
            };
            tracing::debug!("History listener started");

            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        tracing::info!("History listener shutting down");
                        break;
                    }
                    event = events.recv() => {
                        let Some(change) = event else { break };
                        let Some(pending) = router.prepare_history_change(change) else {
                            continue;
                        };
                        let router = Arc::clone(&router);
                        tokio::spawn(async move {
                            router.handle_history_change(pending).await;
                        });
                    }
                }
            }
        })
    }

    fn navigate(
        &self,
        target: RouteTarget,
        mutation: HistoryMutation,
        redirects: usize,
        redirected_from: Option<Arc<Location>>,
    ) -> BoxFuture<'_, Result<Arc<Location>, NavigationError>> {
        Box::pin(async move {
            let from = self.current_route();
            let to = match self.resolve_location(&target, &from, redirected_from) {
                Ok(to) => Arc::new(to),
                Err(err) => return Err(self.reject(err)),
            };

            if !from.is_start() && to.full_path == from.full_path {
                tracing::debug!(path = %to.full_path, "Already at target, navigation skipped");
                return Ok(from);
            }
            let generation = self.begin();

            let span = tracing::info_span!(
                "navigation",
                id = %Uuid::new_v4(),
                from = %from.full_path,
                to = %to.full_path,
            );
            let outcome = self
                .attempt(Arc::clone(&to), from, mutation, generation)
                .instrument(span)
                .await;

            match outcome {
                Ok(committed) => Ok(committed),
                Err(NavigationError::GuardRedirect {
                    from,
                    to: pending,
                    redirect,
                }) => {
                    self.trigger_error(&NavigationError::GuardRedirect {
                        from,
                        to: pending,
                        redirect: redirect.clone(),
                    });
                    if redirects >= self.max_redirects {
                        let origin = to.redirect_chain().last().unwrap_or(to.as_ref());
                        return Err(self.reject(NavigationError::RedirectLoop {
                            path: origin.full_path.clone(),
                            limit: self.max_redirects,
                        }));
                    }
                    metrics::record_redirect("guard");
                    let mutation = if redirect.is_replace() {
                        HistoryMutation::Replace
                    } else {
                        mutation
                    };
                    self.navigate(redirect, mutation, redirects + 1, Some(to))
                        .await
                }
                Err(err) => Err(self.reject(err)),
            }
        })
    }

    /// Resolve a backend change and claim its generation.
    ///
    /// Runs on the event loop so generations follow event order.
    fn prepare_history_change(&self, change: HistoryChange) -> Option<PendingHistoryNavigation> {
        let from = self.current_route();
        let target = RouteTarget::from(change.to.full_path);
        match self.resolve_location(&target, &from, None) {
            Ok(to) => Some(PendingHistoryNavigation {
                to: Arc::new(to),
                from,
                direction: change.info.direction,
                generation: self.begin(),
            }),
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    async fn handle_history_change(&self, pending: PendingHistoryNavigation) {
        let PendingHistoryNavigation {
            to,
            from,
            direction,
            generation,
        } = pending;

        let span = tracing::info_span!(
            "history_navigation",
            id = %Uuid::new_v4(),
            from = %from.full_path,
            to = %to.full_path,
            direction = ?direction,
        );
        let outcome = self
            .attempt(Arc::clone(&to), from, HistoryMutation::Skip, generation)
            .instrument(span)
            .await;

        match outcome {
            Ok(_) => {}
            Err(NavigationError::GuardRedirect {
                from,
                to: pending,
                redirect,
            }) => {
                self.trigger_error(&NavigationError::GuardRedirect {
                    from,
                    to: pending,
                    redirect: redirect.clone(),
                });
                metrics::record_redirect("guard");
                let mutation = if redirect.is_replace() {
                    HistoryMutation::Replace
                } else {
                    HistoryMutation::Push
                };
                if let Err(err) = self.navigate(redirect, mutation, 1, Some(to)).await {
                    tracing::debug!(error = %err, "Redirected history navigation did not commit");
                }
            }
            Err(err) => {
                if err.is_aborted() {
                    // Put the backend back where the committed location is.
                    match direction {
                        NavigationDirection::Back => self.history.forward(false),
                        NavigationDirection::Forward | NavigationDirection::Unknown => {
                            self.history.back(false)
                        }
                    }
                }
                self.reject(err);
            }
        }
    }

    /// Run the guards of one attempt and commit it if it is still the latest.
    async fn attempt(
        &self,
        to: Arc<Location>,
        from: Arc<Location>,
        mutation: HistoryMutation,
        generation: u64,
    ) -> Result<Arc<Location>, NavigationError> {
        let started = Instant::now();
        metrics::record_started();
        tracing::debug!(generation, "Navigation guarding");

        let before_each = self.before_guards.snapshot();
        let outcome = GuardPipeline::new(&to, &from, &before_each).run().await;

        let committed = {
            let _commit = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if self.is_superseded(generation) {
                return Err(NavigationError::Cancelled {
                    from: from.full_path.clone(),
                    to: to.full_path.clone(),
                });
            }
            outcome?;
            self.commit(to, &from, mutation, started)
        };

        for hook in self.after_hooks.snapshot() {
            hook(committed.as_ref(), from.as_ref());
        }
        Ok(committed)
    }

    /// Callers hold `commit_lock`.
    fn commit(
        &self,
        to: Arc<Location>,
        from: &Location,
        mutation: HistoryMutation,
        started: Instant,
    ) -> Arc<Location> {
        let mutation = match mutation {
            HistoryMutation::Push if from.is_start() => HistoryMutation::Replace,
            other => other,
        };
        let entry = to.history_location();
        match mutation {
            HistoryMutation::Push => self.history.push(&entry),
            HistoryMutation::Replace => self.history.replace(&entry),
            HistoryMutation::Skip => {}
        }

        self.current.store(Arc::clone(&to));
        self.sink.publish(Arc::clone(&to));
        self.ready.mark_ready(Ok(()));

        tracing::info!(
            path = %to.full_path,
            name = ?to.name,
            history = ?mutation,
            "Navigation committed"
        );
        metrics::record_committed(started);
        to
    }

    /// Log, count and surface a failure. `Cancelled` never reaches handlers.
    fn reject(&self, err: NavigationError) -> NavigationError {
        metrics::record_failure(err.kind());
        match &err {
            NavigationError::Cancelled { from, to } => {
                tracing::warn!(from = %from, to = %to, "Navigation cancelled by a newer navigation");
                return err;
            }
            NavigationError::Guard(source) => {
                tracing::error!(error = %source, "Navigation failed in a guard");
            }
            other => {
                tracing::warn!(kind = other.kind(), error = %other, "Navigation rejected");
            }
        }
        self.trigger_error(&err);
        err
    }

    fn trigger_error(&self, err: &NavigationError) {
        let handlers = self.error_handlers.snapshot();
        if handlers.is_empty() {
            tracing::debug!(kind = err.kind(), "No error handler registered");
            return;
        }
        for handler in handlers {
            handler(err);
        }
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.history_listener.remove();
    }
}
