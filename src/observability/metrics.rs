//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `resource_override_reconciliations_total` - Total number of reconciliations
//! - `resource_override_reconciliation_errors_total` - Reconciliation errors by reason
//! - `resource_override_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `resource_override_stale_serving_secrets_deleted_total` - Serving-cert secrets deleted as stale
//! - `resource_override_services_created_total` - Webhook Services created
//! - `resource_override_requeues_total` - Requeues by trigger

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "resource_override_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "resource_override_reconciliation_errors_total",
            "Total number of reconciliation errors by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "resource_override_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static STALE_SERVING_SECRETS_DELETED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "resource_override_stale_serving_secrets_deleted_total",
        "Total number of serving-cert secrets deleted because they were not issued for the webhook Service",
    )
    .expect(
        "Failed to create STALE_SERVING_SECRETS_DELETED_TOTAL metric - this should never happen",
    )
});

static SERVICES_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "resource_override_services_created_total",
        "Total number of webhook Services created",
    )
    .expect("Failed to create SERVICES_CREATED_TOTAL metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "resource_override_requeues_total",
            "Total number of requeues by trigger",
        ),
        &["trigger"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(STALE_SERVING_SECRETS_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SERVICES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors(reason: &str) {
    RECONCILIATION_ERRORS_TOTAL
        .with_label_values(&[reason])
        .inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_stale_serving_secrets_deleted() {
    STALE_SERVING_SECRETS_DELETED_TOTAL.inc();
}

pub fn increment_services_created() {
    SERVICES_CREATED_TOTAL.inc();
}

pub fn increment_requeues_total(trigger: &str) {
    REQUEUES_TOTAL.with_label_values(&[trigger]).inc();
}
