//! # Status
//!
//! Readiness condition bookkeeping and persistence of the owner's status.
//!
//! Conditions are edited in memory by the control loop; the status subresource
//! is patched once per pass and only when something actually changed, so a
//! converged resource produces no writes.

use crate::constants::{FIELD_MANAGER, INSTALL_READINESS_FAILURE_CONDITION};
use crate::controller::condition::ReadinessReason;
use crate::crd::{ClusterResourceOverride, ClusterResourceOverrideStatus, Condition, ConditionStatus};
use crate::store::StoreError;
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
#[cfg(test)]
use mockall::automock;
use serde_json::json;

/// Record a failed pass as `InstallReadinessFailure=True`
///
/// The transition time is kept when the condition was already true, so a
/// resource failing repeatedly keeps the time it started failing.
pub fn set_failure_condition(
    conditions: &mut Vec<Condition>,
    reason: ReadinessReason,
    message: &str,
    now: &str,
) {
    if let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.r#type == INSTALL_READINESS_FAILURE_CONDITION)
    {
        if existing.status != ConditionStatus::True {
            existing.status = ConditionStatus::True;
            existing.last_transition_time = Some(now.to_string());
        }
        existing.reason = Some(reason.as_str().to_string());
        existing.message = Some(message.to_string());
        return;
    }

    conditions.push(Condition {
        r#type: INSTALL_READINESS_FAILURE_CONDITION.to_string(),
        status: ConditionStatus::True,
        last_transition_time: Some(now.to_string()),
        reason: Some(reason.as_str().to_string()),
        message: Some(message.to_string()),
    });
}

/// Drop `InstallReadinessFailure` after a successful pass
pub fn clear_failure_condition(conditions: &mut Vec<Condition>) {
    conditions.retain(|c| c.r#type != INSTALL_READINESS_FAILURE_CONDITION);
}

#[must_use]
pub fn failure_condition(conditions: &[Condition]) -> Option<&Condition> {
    conditions
        .iter()
        .find(|c| c.r#type == INSTALL_READINESS_FAILURE_CONDITION)
}

/// Persists a `ClusterResourceOverride` status
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatusWriter: Send + Sync {
    async fn patch_status(
        &self,
        name: &str,
        status: &ClusterResourceOverrideStatus,
    ) -> Result<(), StoreError>;
}

/// Merge-patches the status subresource through the API server
#[derive(Clone)]
pub struct ApiStatusWriter {
    api: Api<ClusterResourceOverride>,
}

impl std::fmt::Debug for ApiStatusWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiStatusWriter").finish_non_exhaustive()
    }
}

impl ApiStatusWriter {
    #[must_use]
    pub fn new(client: kube::Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

/// Merge patch body for the status subresource
#[must_use]
pub fn status_patch(status: &ClusterResourceOverrideStatus) -> serde_json::Value {
    json!({ "status": status })
}

#[async_trait]
impl StatusWriter for ApiStatusWriter {
    async fn patch_status(
        &self,
        name: &str,
        status: &ClusterResourceOverrideStatus,
    ) -> Result<(), StoreError> {
        let patch = status_patch(status);
        self.api
            .patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(())
    }
}
