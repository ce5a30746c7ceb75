//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_METRICS_PORT,
    DEFAULT_OPERAND_NAME, DEFAULT_OPERAND_NAMESPACE, DEFAULT_RESYNC_INTERVAL_SECS,
    DEFAULT_WEBHOOK_TARGET_PORT,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from the operator Deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace the webhook Service and its serving secret live in
    pub operand_namespace: String,
    /// Operand name; the Service, selector label and secret names derive from it
    pub operand_name: String,
    /// Container port the webhook server listens on
    pub webhook_target_port: i32,
    /// Fibonacci requeue minimum (seconds)
    pub backoff_min_secs: u64,
    /// Fibonacci requeue maximum (seconds)
    pub backoff_max_secs: u64,
    /// Periodic resync after a successful pass (seconds)
    pub resync_interval_secs: u64,
    /// HTTP port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            operand_namespace: DEFAULT_OPERAND_NAMESPACE.to_string(),
            operand_name: DEFAULT_OPERAND_NAME.to_string(),
            webhook_target_port: DEFAULT_WEBHOOK_TARGET_PORT,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// `OPERAND_NAMESPACE` wins over `POD_NAMESPACE`; the operator usually runs
    /// in the same namespace as its operand.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let operand_namespace = lookup("OPERAND_NAMESPACE")
            .or_else(|| lookup("POD_NAMESPACE"))
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_OPERAND_NAMESPACE.to_string());

        // Zero would requeue failures immediately, forever
        let backoff_min_secs =
            parse_or_default(&lookup, "BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS).max(1);
        // A max below the min would make the sequence shrink
        let backoff_max_secs =
            parse_or_default(&lookup, "BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)
                .max(backoff_min_secs);

        Self {
            operand_namespace,
            operand_name: lookup("OPERAND_NAME")
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_OPERAND_NAME.to_string()),
            webhook_target_port: parse_or_default(
                &lookup,
                "WEBHOOK_PORT",
                DEFAULT_WEBHOOK_TARGET_PORT,
            ),
            backoff_min_secs,
            backoff_max_secs,
            resync_interval_secs: parse_or_default(
                &lookup,
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            metrics_port: parse_or_default(&lookup, "METRICS_PORT", DEFAULT_METRICS_PORT),
        }
    }

    /// Get periodic resync duration
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }
}

/// Read a key and parse it, falling back to `default` when unset or malformed
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
