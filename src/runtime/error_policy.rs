//! # Error Policy
//!
//! Requeue decisions for failed reconciliations.
//!
//! Backoff state is tracked per resource so one failing
//! `ClusterResourceOverride` never delays another. The state is reset by the
//! reconciler after a successful pass.

use crate::controller::backoff::FibonacciBackoff;
use crate::crd::ClusterResourceOverride;
use crate::observability::metrics;
use crate::runtime::reconcile::{Reconciler, ReconcilerError};
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

/// Decides how long to wait before retrying a resource
pub trait RequeueStrategy: Send + Sync {
    /// Delay before the next attempt after a failure
    fn on_error(&self, key: &str) -> Duration;

    /// Forget accumulated failures
    fn on_success(&self, key: &str);
}

/// Backoff state for one resource
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }
}

/// Per-resource Fibonacci backoff
#[derive(Debug)]
pub struct FibonacciRequeue {
    min_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<String, BackoffState>>,
}

impl FibonacciRequeue {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.max(1),
            max_secs: max_secs.max(1),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Consecutive failures recorded for `key`
    #[must_use]
    pub fn error_count(&self, key: &str) -> u32 {
        self.states
            .lock()
            .map(|states| states.get(key).map_or(0, |s| s.error_count))
            .unwrap_or(0)
    }
}

impl RequeueStrategy for FibonacciRequeue {
    fn on_error(&self, key: &str) -> Duration {
        match self.states.lock() {
            Ok(mut states) => {
                let state = states
                    .entry(key.to_string())
                    .or_insert_with(|| BackoffState::new(self.min_secs, self.max_secs));
                state.increment_error();
                state.backoff.next_backoff()
            }
            Err(e) => {
                warn!(error = %e, "failed to lock backoff states, using minimum backoff");
                Duration::from_secs(self.min_secs)
            }
        }
    }

    fn on_success(&self, key: &str) {
        match self.states.lock() {
            Ok(mut states) => {
                states.remove(key);
            }
            Err(e) => warn!(error = %e, "failed to lock backoff states"),
        }
    }
}

/// `error_policy` for the controller
pub fn handle_reconciliation_error(
    obj: Arc<ClusterResourceOverride>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let key = obj.name_any();

    error!(key = %key, reason = error.reason(), error = %error, "reconciliation failed");
    metrics::increment_reconciliation_errors(error.reason());

    let delay = ctx.requeue.on_error(&key);
    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
    info!(
        key = %key,
        delay_secs = delay.as_secs(),
        next_retry = %next_trigger_time.to_rfc3339(),
        "retrying with Fibonacci backoff"
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(delay)
}
