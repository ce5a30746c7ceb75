//! # ClusterResourceOverride Status
//!
//! Status types: references to the operand objects the handlers manage, and
//! conditions describing the last reconciliation.

use k8s_openapi::api::core::v1::ObjectReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the ClusterResourceOverride resource
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceOverrideStatus {
    /// References to the operand objects, one per handler
    #[serde(default)]
    pub resources: OperandResources,
    /// Hash of the applied configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Operand image currently deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Operand version currently deployed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Conditions represent the latest available observations
    ///
    /// Always serialized: status is written with a merge patch, and an absent
    /// key would leave a cleared condition in place.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Snapshot references to the objects that make up the webhook operand
///
/// Each reference is owned by exactly one handler. A reference is a snapshot:
/// its `resourceVersion` is compared with the live object to decide whether
/// the status is in sync, the referenced object is never re-fetched through it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperandResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cert_secret_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_service_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutating_webhook_configuration_ref: Option<ObjectReference>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition
    pub status: ConditionStatus,
    /// Last transition time (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    /// Machine readable reason, e.g. `CertNotAvailable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionStatus::True => f.write_str("True"),
            ConditionStatus::False => f.write_str("False"),
            ConditionStatus::Unknown => f.write_str("Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_camel_case_refs() {
        let status = ClusterResourceOverrideStatus {
            resources: OperandResources {
                service_ref: Some(ObjectReference {
                    kind: Some("Service".to_string()),
                    name: Some("clusterresourceoverride".to_string()),
                    resource_version: Some("42".to_string()),
                    ..ObjectReference::default()
                }),
                ..OperandResources::default()
            },
            ..ClusterResourceOverrideStatus::default()
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["resources"]["serviceRef"]["resourceVersion"], "42");
        assert!(json["resources"].get("deploymentRef").is_none());
        assert_eq!(json["conditions"], serde_json::json!([]));
    }

    #[test]
    fn test_status_deserializes_with_missing_resources() {
        let status: ClusterResourceOverrideStatus =
            serde_json::from_value(serde_json::json!({ "version": "4.17" })).unwrap();
        assert_eq!(status.version.as_deref(), Some("4.17"));
        assert!(status.resources.service_ref.is_none());
    }
}
