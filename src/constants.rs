//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable (see [`crate::config`]).

/// Annotation the service CA stamps onto a serving-cert secret, recording the
/// Service the certificate was issued for.
pub const ORIGINATING_SERVICE_NAME_ANNOTATION: &str =
    "service.alpha.openshift.io/originating-service-name";

/// Annotation on a Service asking the service CA to provision a serving-cert
/// secret with the given name.
pub const SERVING_CERT_SECRET_NAME_ANNOTATION: &str =
    "service.beta.openshift.io/serving-cert-secret-name";

/// Prefix of the serving-cert secret name; the operand name is appended.
pub const SERVING_CERT_SECRET_PREFIX: &str = "server-serving-cert-";

/// Field manager used for status patches
pub const FIELD_MANAGER: &str = "resource-override-operator";

/// Default namespace the webhook operand is installed into
pub const DEFAULT_OPERAND_NAMESPACE: &str = "clusterresourceoverride-operator";

/// Default operand name; names the Service, its selector label and the secret
pub const DEFAULT_OPERAND_NAME: &str = "clusterresourceoverride";

/// Port the Service exposes to the API server
pub const WEBHOOK_SERVICE_PORT: i32 = 443;

/// Default container port the webhook server listens on
pub const DEFAULT_WEBHOOK_TARGET_PORT: i32 = 9400;

/// Default Fibonacci requeue minimum (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Default Fibonacci requeue maximum (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default periodic resync after a successful pass (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 600;

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Condition type written when a handler fails to install the webhook
pub const INSTALL_READINESS_FAILURE_CONDITION: &str = "InstallReadinessFailure";
