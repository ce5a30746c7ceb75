//! Common test utilities for integration tests
//!
//! Provides an in-memory cluster implementing the store traits and a status
//! writer that records what it was asked to persist.

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Secret, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resource_override_operator::asset::{Asset, AssetValues};
use resource_override_operator::constants::ORIGINATING_SERVICE_NAME_ANNOTATION;
use resource_override_operator::crd::{
    ClusterResourceOverride, ClusterResourceOverrideSpec, ClusterResourceOverrideStatus,
};
use resource_override_operator::runtime::status::{status_patch, StatusWriter};
use resource_override_operator::store::{ObjectReader, ObjectWriter, StoreError};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "clusterresourceoverride-operator";
pub const OPERAND: &str = "clusterresourceoverride";
pub const SERVING_SECRET: &str = "server-serving-cert-clusterresourceoverride";

type Key = (String, String);

#[derive(Debug, Default)]
struct ClusterState {
    secrets: BTreeMap<Key, Secret>,
    services: BTreeMap<Key, Service>,
    resource_version: u64,
    fail_creates: bool,
    fail_deletes: bool,
    creates: usize,
    deletes: usize,
}

impl ClusterState {
    fn next_resource_version(&mut self) -> String {
        self.resource_version += 1;
        self.resource_version.to_string()
    }
}

/// In-memory API server: reads are always consistent with writes
#[derive(Debug, Default)]
pub struct FakeCluster {
    state: Mutex<ClusterState>,
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_secret(&self, name: &str, origin: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        let resource_version = state.next_resource_version();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(NAMESPACE.to_string()),
                resource_version: Some(resource_version),
                annotations: origin.map(|o| {
                    BTreeMap::from([(
                        ORIGINATING_SERVICE_NAME_ANNOTATION.to_string(),
                        o.to_string(),
                    )])
                }),
                ..ObjectMeta::default()
            },
            ..Secret::default()
        };
        state.secrets.insert(key(NAMESPACE, name), secret);
    }

    pub fn secret(&self, name: &str) -> Option<Secret> {
        self.state
            .lock()
            .unwrap()
            .secrets
            .get(&key(NAMESPACE, name))
            .cloned()
    }

    pub fn service(&self, name: &str) -> Option<Service> {
        self.state
            .lock()
            .unwrap()
            .services
            .get(&key(NAMESPACE, name))
            .cloned()
    }

    /// Simulate another writer touching the Service
    pub fn touch_service(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        let resource_version = state.next_resource_version();
        if let Some(service) = state.services.get_mut(&key(NAMESPACE, name)) {
            service.metadata.resource_version = Some(resource_version);
        }
    }

    pub fn remove_service(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .services
            .remove(&key(NAMESPACE, name));
    }

    pub fn fail_creates(&self, fail: bool) {
        self.state.lock().unwrap().fail_creates = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn deletes(&self) -> usize {
        self.state.lock().unwrap().deletes
    }
}

#[async_trait]
impl ObjectReader for FakeCluster {
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Secret>>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.secrets.get(&key(namespace, name)).cloned().map(Arc::new))
    }

    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Service>>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.services.get(&key(namespace, name)).cloned().map(Arc::new))
    }
}

#[async_trait]
impl ObjectWriter for FakeCluster {
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(StoreError::InvalidObject("injected delete failure".to_string()));
        }
        state.deletes += 1;
        state.secrets.remove(&key(namespace, name));
        Ok(())
    }

    async fn create_service(&self, service: &Service) -> Result<Service, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_creates {
            return Err(StoreError::InvalidObject("injected create failure".to_string()));
        }
        let namespace = service.metadata.namespace.clone().unwrap_or_default();
        let name = service.metadata.name.clone().unwrap_or_default();
        let object_key = key(&namespace, &name);
        if state.services.contains_key(&object_key) {
            return Err(StoreError::AlreadyExists {
                kind: "Service",
                namespace,
                name,
            });
        }

        state.creates += 1;
        let resource_version = state.next_resource_version();
        let mut created = service.clone();
        created.metadata.uid = Some(format!("service-uid-{}", state.creates));
        created.metadata.resource_version = Some(resource_version);
        if let Some(spec) = created.spec.as_mut() {
            spec.cluster_ip = Some("172.30.0.10".to_string());
            spec.type_ = Some("ClusterIP".to_string());
        }
        state.services.insert(object_key, created.clone());
        Ok(created)
    }
}
/// Status writer that merges each patch the way the API server does
/// Status writer that keeps every patch it receives
#[derive(Debug)]
pub struct RecordingStatusWriter {
    stored: Mutex<serde_json::Value>,
    patches: Mutex<Vec<ClusterResourceOverrideStatus>>,
}

impl Default for RecordingStatusWriter {
    fn default() -> Self {
        Self {
            stored: Mutex::new(json!({})),
            patches: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingStatusWriter {
    /// Status as stored after each patch
    pub fn patches(&self) -> Vec<ClusterResourceOverrideStatus> {
        self.patches.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ClusterResourceOverrideStatus> {
        self.patches.lock().unwrap().last().cloned()
    }
}

/// JSON merge patch as the API server applies it (RFC 7386)
fn merge(target: &mut serde_json::Value, patch: &serde_json::Value) {
    let Some(patch) = patch.as_object() else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = json!({});
    }
    if let Some(target) = target.as_object_mut() {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge(target.entry(key.clone()).or_insert(serde_json::Value::Null), value);
            }
        }
    }
}

#[async_trait]
impl StatusWriter for RecordingStatusWriter {
    async fn patch_status(
        &self,
        _name: &str,
        status: &ClusterResourceOverrideStatus,
    ) -> Result<(), StoreError> {
        let mut stored = self.stored.lock().unwrap();
        merge(&mut stored, &status_patch(status));
        let merged = serde_json::from_value(stored["status"].clone())
            .map_err(|e| StoreError::InvalidObject(e.to_string()))?;
        self.patches.lock().unwrap().push(merged);
        Ok(())
    }
}

pub fn asset() -> Arc<Asset> {
    Arc::new(Asset::new(AssetValues {
        name: OPERAND.to_string(),
        namespace: NAMESPACE.to_string(),
        webhook_target_port: 9400,
    }))
}

pub fn owner() -> ClusterResourceOverride {
    let mut owner = ClusterResourceOverride::new("cluster", ClusterResourceOverrideSpec::default());
    owner.metadata.uid = Some("owner-uid".to_string());
    owner.metadata.resource_version = Some("100".to_string());
    owner
}
