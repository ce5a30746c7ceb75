//! # Handlers
//!
//! Each handler owns one operand object and runs as one step of a
//! reconciliation pass over a `ClusterResourceOverride`.
//!
//! A handler:
//! - reads cluster state through an [`ObjectReader`](crate::store::ObjectReader)
//! - writes through an [`ObjectWriter`](crate::store::ObjectWriter)
//! - records what it manages in the owner's status, in memory only
//!
//! Persisting the status and deciding when to requeue belong to the control
//! loop (`runtime`), never to a handler.

mod service;

pub use service::ServiceHandler;

use crate::controller::condition::InstallReadinessError;
use crate::crd::ClusterResourceOverride;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Requeue signal returned by a handler
///
/// The default value is the empty result: nothing to ask of the control loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleResult {
    pub requeue_after: Option<Duration>,
}

impl HandleResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requeue_after.is_none()
    }
}

/// One step of a reconciliation pass
#[async_trait]
pub trait Handler: Send + Sync {
    /// Drive the handler's object toward its desired state
    ///
    /// `current` is the owner resource; its status is mutated in place and
    /// left untouched when an error is returned.
    async fn handle(
        &self,
        ctx: &ReconcileRequestContext,
        current: &mut ClusterResourceOverride,
    ) -> Result<HandleResult, InstallReadinessError>;
}

/// Stamps owner/controller metadata onto freshly built desired objects
pub trait ControllerSetter: Send + Sync {
    fn set(&self, object: &mut ObjectMeta, owner: &ClusterResourceOverride);
}

/// Sets the owner as the controlling owner reference
///
/// An existing controller reference is replaced; other owner references are
/// kept. Owners without a uid (not yet persisted) cannot be referenced and
/// leave the object unstamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerReferenceSetter;

impl ControllerSetter for OwnerReferenceSetter {
    fn set(&self, object: &mut ObjectMeta, owner: &ClusterResourceOverride) {
        let Some(owner_ref) = owner.controller_owner_ref(&()) else {
            debug!(owner = ?owner.metadata.name, "owner has no uid, skipping owner reference");
            return;
        };

        let refs = object.owner_references.get_or_insert_with(Vec::new);
        refs.retain(|r| r.controller != Some(true) && r.uid != owner_ref.uid);
        refs.push(owner_ref);
    }
}

/// Per-pass context handed to every handler
#[derive(Clone)]
pub struct ReconcileRequestContext {
    webhook_namespace: String,
    controller_setter: Arc<dyn ControllerSetter>,
}

impl std::fmt::Debug for ReconcileRequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileRequestContext")
            .field("webhook_namespace", &self.webhook_namespace)
            .finish_non_exhaustive()
    }
}

impl ReconcileRequestContext {
    #[must_use]
    pub fn new(
        webhook_namespace: impl Into<String>,
        controller_setter: Arc<dyn ControllerSetter>,
    ) -> Self {
        Self {
            webhook_namespace: webhook_namespace.into(),
            controller_setter,
        }
    }

    /// Namespace the operand objects live in
    #[must_use]
    pub fn webhook_namespace(&self) -> &str {
        &self.webhook_namespace
    }

    #[must_use]
    pub fn controller_setter(&self) -> &dyn ControllerSetter {
        self.controller_setter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ClusterResourceOverrideSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    fn owner(uid: Option<&str>) -> ClusterResourceOverride {
        let mut owner =
            ClusterResourceOverride::new("cluster", ClusterResourceOverrideSpec::default());
        owner.metadata.uid = uid.map(str::to_string);
        owner
    }

    #[test]
    fn test_owner_reference_is_controller() {
        let mut meta = ObjectMeta::default();
        OwnerReferenceSetter.set(&mut meta, &owner(Some("uid-1")));

        let refs = meta.owner_references.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, "ClusterResourceOverride");
        assert_eq!(refs[0].name, "cluster");
        assert_eq!(refs[0].uid, "uid-1");
        assert_eq!(refs[0].controller, Some(true));
    }

    #[test]
    fn test_owner_reference_replaces_previous_controller_only() {
        let mut meta = ObjectMeta {
            owner_references: Some(vec![
                OwnerReference {
                    name: "old".to_string(),
                    uid: "old-uid".to_string(),
                    controller: Some(true),
                    ..OwnerReference::default()
                },
                OwnerReference {
                    name: "bystander".to_string(),
                    uid: "other-uid".to_string(),
                    ..OwnerReference::default()
                },
            ]),
            ..ObjectMeta::default()
        };

        OwnerReferenceSetter.set(&mut meta, &owner(Some("uid-1")));
        OwnerReferenceSetter.set(&mut meta, &owner(Some("uid-1")));

        let names: Vec<_> = meta
            .owner_references
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["bystander".to_string(), "cluster".to_string()]);
    }

    #[test]
    fn test_unpersisted_owner_leaves_object_unstamped() {
        let mut meta = ObjectMeta::default();
        OwnerReferenceSetter.set(&mut meta, &owner(None));
        assert!(meta.owner_references.is_none());
    }

    #[test]
    fn test_default_result_is_empty() {
        assert!(HandleResult::default().is_empty());
        assert!(!HandleResult {
            requeue_after: Some(Duration::from_secs(1))
        }
        .is_empty());
    }
}
