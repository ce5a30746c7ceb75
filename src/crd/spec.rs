//! # ClusterResourceOverride Spec

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ClusterResourceOverride Custom Resource Definition
///
/// Declares that the resource-override admission webhook should be installed
/// and configured with the given override percentages.
///
/// # Example
///
/// ```yaml
/// apiVersion: operator.autoscaling.openshift.io/v1
/// kind: ClusterResourceOverride
/// metadata:
///   name: cluster
/// spec:
///   podResourceOverride:
///     spec:
///       memoryRequestToLimitPercent: 50
///       cpuRequestToLimitPercent: 25
///       limitCPUToMemoryPercent: 200
/// ```
#[derive(
    kube::CustomResource,
    Debug,
    Clone,
    Default,
    PartialEq,
    Deserialize,
    Serialize,
    schemars::JsonSchema,
)]
#[kube(
    kind = "ClusterResourceOverride",
    group = "operator.autoscaling.openshift.io",
    version = "v1",
    status = "crate::crd::ClusterResourceOverrideStatus",
    shortname = "cro",
    derive = "PartialEq",
    derive = "Default",
    printcolumn = r#"{"name":"Version", "type":"string", "jsonPath":".status.version"}, {"name":"Failure", "type":"string", "jsonPath":".status.conditions[?(@.type==\"InstallReadinessFailure\")].reason"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceOverrideSpec {
    /// Override percentages applied by the admission webhook
    pub pod_resource_override: PodResourceOverride,
    /// Scheduling overrides for the webhook Deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_overrides: Option<DeploymentOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodResourceOverride {
    pub spec: PodResourceOverrideSpec,
}

/// Percentages the webhook uses to rewrite container requests and limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodResourceOverrideSpec {
    /// Memory request as a percentage of the memory limit (1-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_request_to_limit_percent: Option<i64>,
    /// CPU request as a percentage of the CPU limit (1-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_request_to_limit_percent: Option<i64>,
    /// CPU limit derived from the memory limit, 100% = 1 core per 1Gi
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "limitCPUToMemoryPercent")]
    pub limit_cpu_to_memory_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
}
