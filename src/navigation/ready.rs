//! One-shot readiness latch.
//!
//! Waiters registered before settlement get a `oneshot` receiver; waiters
//! arriving afterwards get the stored outcome immediately.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures_util::future::{self, Either};
use tokio::sync::oneshot;

use crate::navigation::error::NavigationError;

type Outcome = Result<(), NavigationError>;

enum GateState {
    Pending(Vec<oneshot::Sender<Outcome>>),
    Settled(Outcome),
}

/// Settles exactly once, then replays its outcome.
pub struct ReadinessGate {
    state: Mutex<GateState>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending(Vec::new())),
        }
    }

    /// Settle the gate. Returns `false` if it was already settled.
    pub fn mark_ready(&self, outcome: Outcome) -> bool {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                GateState::Settled(_) => return false,
                GateState::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = GateState::Settled(outcome.clone());
                    waiters
                }
            }
        };

        match &outcome {
            Ok(()) => tracing::debug!(waiters = waiters.len(), "Router ready"),
            Err(err) => tracing::warn!(waiters = waiters.len(), error = %err, "Router failed to become ready"),
        }
        for waiter in waiters {
            // A dropped receiver just means nobody is waiting anymore.
            let _ = waiter.send(outcome.clone());
        }
        true
    }

    /// Whether the gate settled successfully.
    pub fn is_ready(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(&*state, GateState::Settled(Ok(())))
    }

    /// Wait for the gate to settle.
    pub fn wait(&self) -> impl Future<Output = Outcome> + Send + 'static {
        let pending = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                GateState::Settled(outcome) => Err(outcome.clone()),
                GateState::Pending(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Ok(rx)
                }
            }
        };

        match pending {
            Err(outcome) => Either::Left(future::ready(outcome)),
            Ok(rx) => Either::Right(async move { rx.await.unwrap_or(Err(NavigationError::Closed)) }),
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
