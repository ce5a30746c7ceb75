//! # Reconcile
//!
//! One reconciliation pass over a `ClusterResourceOverride`: run the handler
//! chain against a working copy, record the outcome as a condition, persist
//! the status if it changed and decide when to come back.

use crate::config::ControllerConfig;
use crate::controller::condition::InstallReadinessError;
use crate::controller::handlers::{
    ControllerSetter, HandleResult, Handler, OwnerReferenceSetter, ReconcileRequestContext,
};
use crate::crd::ClusterResourceOverride;
use crate::observability::metrics;
use crate::runtime::error_policy::{FibonacciRequeue, RequeueStrategy};
use crate::runtime::status::{self, StatusWriter};
use crate::store::StoreError;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    Readiness(#[from] InstallReadinessError),
    #[error("failed to update status: {0}")]
    StatusUpdate(#[source] StoreError),
}

impl ReconcilerError {
    /// Label used for error metrics
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ReconcilerError::Readiness(e) => e.reason().as_str(),
            ReconcilerError::StatusUpdate(_) => "StatusUpdate",
        }
    }
}

/// Shared context of the control loop
pub struct Reconciler {
    handlers: Vec<Arc<dyn Handler>>,
    operand_namespace: String,
    controller_setter: Arc<dyn ControllerSetter>,
    status_writer: Arc<dyn StatusWriter>,
    pub(crate) requeue: Arc<dyn RequeueStrategy>,
    resync_interval: Duration,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("handlers", &self.handlers.len())
            .field("operand_namespace", &self.operand_namespace)
            .field("resync_interval", &self.resync_interval)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        config: &ControllerConfig,
        handlers: Vec<Arc<dyn Handler>>,
        status_writer: Arc<dyn StatusWriter>,
    ) -> Self {
        Self {
            handlers,
            operand_namespace: config.operand_namespace.clone(),
            controller_setter: Arc::new(OwnerReferenceSetter),
            status_writer,
            requeue: Arc::new(FibonacciRequeue::new(
                config.backoff_min_secs,
                config.backoff_max_secs,
            )),
            resync_interval: config.resync_interval(),
        }
    }

    /// Run every handler in order; the first error aborts the pass
    async fn run_handlers(
        &self,
        request: &ReconcileRequestContext,
        current: &mut ClusterResourceOverride,
    ) -> Result<HandleResult, InstallReadinessError> {
        let mut combined = HandleResult::default();
        for handler in &self.handlers {
            let result = handler.handle(request, current).await?;
            combined.requeue_after = match (combined.requeue_after, result.requeue_after) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        Ok(combined)
    }
}

/// Reconcile one `ClusterResourceOverride`
///
/// # Errors
///
/// Returns the first handler failure, or a status write failure after the
/// handlers succeeded. Either way the failure condition has been written
/// where possible.
pub async fn reconcile(
    obj: Arc<ClusterResourceOverride>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let key = obj.name_any();
    let span = info_span!(
        "reconcile",
        key = %key,
        resource_version = obj.resource_version().as_deref().unwrap_or("unknown"),
    );

    async move {
        let start = Instant::now();
        metrics::increment_reconciliations();

        let mut current = (*obj).clone();
        let original = current.status.clone();

        let request = ReconcileRequestContext::new(
            ctx.operand_namespace.clone(),
            Arc::clone(&ctx.controller_setter),
        );
        let outcome = ctx.run_handlers(&request, &mut current).await;

        let now = chrono::Utc::now().to_rfc3339();
        let conditions = &mut current.status.get_or_insert_with(Default::default).conditions;
        match &outcome {
            Ok(_) => status::clear_failure_condition(conditions),
            Err(e) => status::set_failure_condition(conditions, e.reason(), &e.to_string(), &now),
        }

        let write = match current.status.as_ref() {
            Some(new_status) if current.status != original => {
                debug!("patching status");
                ctx.status_writer.patch_status(&key, new_status).await
            }
            _ => Ok(()),
        };

        metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

        match (outcome, write) {
            (Ok(result), Ok(())) => {
                ctx.requeue.on_success(&key);
                let after = result.requeue_after.unwrap_or(ctx.resync_interval);
                info!(requeue_after = ?after, "reconciled");
                Ok(Action::requeue(after))
            }
            (Ok(_), Err(e)) => Err(ReconcilerError::StatusUpdate(e)),
            (Err(e), write) => {
                if let Err(write_err) = write {
                    warn!(error = %write_err, "failed to record readiness failure");
                }
                Err(ReconcilerError::Readiness(e))
            }
        }
    }
    .instrument(span)
    .await
}
