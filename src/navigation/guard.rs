//! Navigation guards.
//!
//! Every hook, whatever it returns, is normalized into one asynchronous
//! contract: `Fn(GuardContext) -> Future<Output = Result<GuardOutcome, GuardError>>`.
//!
//! Accepted return values:
//! - `()` or `true` continue
//! - `false` aborts
//! - a [`RouteTarget`] (or `Some(target)`) redirects
//! - a [`GuardOutcome`] is taken as is
//! - `Result<T, E>` of any of the above, where `Err` becomes a guard error

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::location::{Location, RouteTarget};
use crate::matcher::ComponentInstance;
use crate::navigation::error::{GuardError, NavigationError};

/// What a guard decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Continue,
    Abort,
    Redirect(RouteTarget),
}

/// Arguments handed to every guard.
#[derive(Clone)]
pub struct GuardContext {
    pub to: Arc<Location>,
    pub from: Arc<Location>,
    /// Mounted component for leave/update hooks, when the view has one.
    pub instance: Option<ComponentInstance>,
}

impl fmt::Debug for GuardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardContext")
            .field("to", &self.to.full_path)
            .field("from", &self.from.full_path)
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}

/// Conversion of raw guard return values into the common contract.
pub trait IntoGuardOutcome {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError>;
}

impl IntoGuardOutcome for GuardOutcome {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        Ok(self)
    }
}

impl IntoGuardOutcome for () {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        Ok(GuardOutcome::Continue)
    }
}

impl IntoGuardOutcome for bool {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        Ok(if self {
            GuardOutcome::Continue
        } else {
            GuardOutcome::Abort
        })
    }
}

impl IntoGuardOutcome for RouteTarget {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        Ok(GuardOutcome::Redirect(self))
    }
}

impl IntoGuardOutcome for Option<RouteTarget> {
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        Ok(self.map_or(GuardOutcome::Continue, GuardOutcome::Redirect))
    }
}

impl<T, E> IntoGuardOutcome for Result<T, E>
where
    T: IntoGuardOutcome,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn into_guard_result(self) -> Result<GuardOutcome, GuardError> {
        match self {
            Ok(value) => value.into_guard_result(),
            Err(err) => {
                let boxed: Box<dyn std::error::Error + Send + Sync> = err.into();
                Err(Arc::from(boxed))
            }
        }
    }
}

type GuardFn =
    dyn Fn(GuardContext) -> BoxFuture<'static, Result<GuardOutcome, GuardError>> + Send + Sync;

/// A normalized navigation guard. Cheap to clone.
#[derive(Clone)]
pub struct Guard {
    inner: Arc<GuardFn>,
}

impl Guard {
    /// Wrap an asynchronous hook.
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(GuardContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoGuardOutcome + Send + 'static,
    {
        let inner: Arc<GuardFn> = Arc::new(
            move |ctx: GuardContext| -> BoxFuture<'static, Result<GuardOutcome, GuardError>> {
                let fut = f(ctx);
                Box::pin(async move { fut.await.into_guard_result() })
            },
        );
        Self { inner }
    }

    /// Wrap a synchronous `(to, from)` hook.
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(&Location, &Location) -> R + Send + Sync + 'static,
        R: IntoGuardOutcome + Send + 'static,
    {
        Self::new(move |ctx: GuardContext| std::future::ready(f(&ctx.to, &ctx.from)))
    }

    /// Invoke the guard.
    pub fn call(&self, ctx: GuardContext) -> BoxFuture<'static, Result<GuardOutcome, GuardError>> {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Hook run after a navigation is committed. Its result is ignored.
pub type AfterHook = Arc<dyn Fn(&Location, &Location) + Send + Sync>;

/// Sink for surfaced navigation failures.
pub type ErrorHandler = Arc<dyn Fn(&NavigationError) + Send + Sync>;
