//! Guard pipeline.
//!
//! # Responsibilities
//! - Collect the guards of each phase from the `from`/`to` chains
//! - Run phases strictly in order, guards within a phase in series
//! - Short-circuit on the first non-continue outcome
//!
//! # Phases
//! ```text
//! 1. leave           component before_route_leave   records left, leaf → root
//! 2. before_each     global guards                  registration order
//! 3. update          component before_route_update  reused records, root → leaf
//! 4. before_enter    record before_enter guards     entered records, root → leaf
//! 5. enter           component before_route_enter   entered records, root → leaf
//! ```
//!
//! # Design Decisions
//! - Records are compared by `RecordId`, never by value
//! - Components of one record run in view declaration order
//! - The pipeline reads state only; committing is the router's job

use std::fmt;
use std::sync::Arc;

use crate::location::Location;
use crate::matcher::{ComponentInstance, RouteRecord};
use crate::navigation::error::NavigationError;
use crate::navigation::guard::{Guard, GuardContext, GuardOutcome};

/// The five guard phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Leave,
    BeforeEach,
    Update,
    BeforeEnter,
    Enter,
}

impl GuardPhase {
    pub const ALL: [GuardPhase; 5] = [
        GuardPhase::Leave,
        GuardPhase::BeforeEach,
        GuardPhase::Update,
        GuardPhase::BeforeEnter,
        GuardPhase::Enter,
    ];
}

impl fmt::Display for GuardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GuardPhase::Leave => "leave",
            GuardPhase::BeforeEach => "before_each",
            GuardPhase::Update => "update",
            GuardPhase::BeforeEnter => "before_enter",
            GuardPhase::Enter => "enter",
        };
        f.write_str(name)
    }
}

/// One pending navigation's guard run.
pub struct GuardPipeline<'a> {
    to: &'a Arc<Location>,
    from: &'a Arc<Location>,
    before_each: &'a [Guard],
}

impl<'a> GuardPipeline<'a> {
    pub fn new(to: &'a Arc<Location>, from: &'a Arc<Location>, before_each: &'a [Guard]) -> Self {
        Self {
            to,
            from,
            before_each,
        }
    }

    /// Run every phase. `Ok(())` means every guard let the navigation through.
    pub async fn run(&self) -> Result<(), NavigationError> {
        for phase in GuardPhase::ALL {
            let queue = self.collect(phase);
            if queue.is_empty() {
                continue;
            }
            tracing::debug!(%phase, guards = queue.len(), "Running guard phase");
            self.run_queue(phase, queue).await?;
        }
        Ok(())
    }

    /// Guards of one phase, in the order they must run.
    pub fn collect(&self, phase: GuardPhase) -> Vec<(Guard, GuardContext)> {
        let mut queue = Vec::new();
        match phase {
            GuardPhase::Leave => {
                for record in self.leaving().rev() {
                    for (view, component) in record.views() {
                        if let Some(guard) = component.leave_guard() {
                            queue.push((guard.clone(), self.context(record.instance(view))));
                        }
                    }
                }
            }
            GuardPhase::BeforeEach => {
                for guard in self.before_each {
                    queue.push((guard.clone(), self.context(None)));
                }
            }
            GuardPhase::Update => {
                for record in self.reused() {
                    for (view, component) in record.views() {
                        if let Some(guard) = component.update_guard() {
                            queue.push((guard.clone(), self.context(record.instance(view))));
                        }
                    }
                }
            }
            GuardPhase::BeforeEnter => {
                for record in self.entering() {
                    for guard in record.before_enter() {
                        queue.push((guard.clone(), self.context(None)));
                    }
                }
            }
            GuardPhase::Enter => {
                for record in self.entering() {
                    for (_, component) in record.views() {
                        if let Some(guard) = component.enter_guard() {
                            queue.push((guard.clone(), self.context(None)));
                        }
                    }
                }
            }
        }
        queue
    }

    async fn run_queue(
        &self,
        phase: GuardPhase,
        queue: Vec<(Guard, GuardContext)>,
    ) -> Result<(), NavigationError> {
        for (index, (guard, ctx)) in queue.into_iter().enumerate() {
            match guard.call(ctx).await {
                Ok(GuardOutcome::Continue) => {}
                Ok(GuardOutcome::Abort) => {
                    tracing::debug!(%phase, index, "Guard aborted navigation");
                    return Err(NavigationError::Aborted {
                        from: self.from.full_path.clone(),
                        to: self.to.full_path.clone(),
                    });
                }
                Ok(GuardOutcome::Redirect(redirect)) => {
                    tracing::debug!(%phase, index, redirect = %redirect, "Guard redirected navigation");
                    return Err(NavigationError::GuardRedirect {
                        from: self.from.full_path.clone(),
                        to: self.to.full_path.clone(),
                        redirect,
                    });
                }
                Err(err) => {
                    tracing::error!(%phase, index, error = %err, "Guard failed");
                    return Err(NavigationError::Guard(err));
                }
            }
        }
        Ok(())
    }

    fn context(&self, instance: Option<ComponentInstance>) -> GuardContext {
        GuardContext {
            to: Arc::clone(self.to),
            from: Arc::clone(self.from),
            instance,
        }
    }

    /// Records in `from` but not in `to`, root to leaf.
    fn leaving(&self) -> impl DoubleEndedIterator<Item = &'a Arc<RouteRecord>> + 'a {
        let (from, to): (&'a Location, &'a Location) = (&**self.from, &**self.to);
        from.matched
            .iter()
            .filter(move |record| !to.contains_record(record.id()))
    }

    /// Records in both chains, root to leaf.
    fn reused(&self) -> impl Iterator<Item = &'a Arc<RouteRecord>> + 'a {
        let (from, to): (&'a Location, &'a Location) = (&**self.from, &**self.to);
        to.matched
            .iter()
            .filter(move |record| from.contains_record(record.id()))
    }

    /// Records in `to` but not in `from`, root to leaf.
    fn entering(&self) -> impl Iterator<Item = &'a Arc<RouteRecord>> + 'a {
        let (from, to): (&'a Location, &'a Location) = (&**self.from, &**self.to);
        to.matched
            .iter()
            .filter(move |record| !from.contains_record(record.id()))
    }
}
