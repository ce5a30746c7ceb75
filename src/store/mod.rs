//! # Object Stores
//!
//! Capability traits the handlers use to reach cluster state.
//!
//! Reads and writes live in two separate traits because they have different
//! consistency guarantees:
//! - [`ObjectReader`] is served from an informer cache and may lag the API server
//! - [`ObjectWriter`] talks to the API server directly
//!
//! Implementations:
//! - [`CachedReader`] - reflector-backed reads (production path)
//! - [`ApiWriter`] - direct deletes and creates

mod api;
mod cached;

pub use api::ApiWriter;
pub use cached::CachedReader;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Secret, Service};
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Create lost a race against another writer
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    #[error("{kind} cache has not synced")]
    CacheNotSynced { kind: &'static str },
    #[error("invalid object: {0}")]
    InvalidObject(String),
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),
}

/// Eventually consistent, namespaced lookups
///
/// `Ok(None)` means the object does not exist (as far as the cache knows).
/// Errors are reserved for lookups that could not be answered at all.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectReader: Send + Sync {
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Secret>>, StoreError>;

    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Service>>, StoreError>;
}

/// Writes against the authoritative store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectWriter: Send + Sync {
    /// Delete a secret. Deleting a secret that is already gone succeeds.
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    /// Create a service and return the object as persisted by the API server
    async fn create_service(&self, service: &Service) -> Result<Service, StoreError>;
}
