//! Reflector-backed [`ObjectReader`].

use super::{ObjectReader, StoreError};
use async_trait::async_trait;
use futures::FutureExt;
use k8s_openapi::api::core::v1::{Secret, Service};
use kube_runtime::reflector::{ObjectRef, Store};
use std::sync::Arc;

/// Reads Secrets and Services from informer caches
///
/// The caches are fed by watchers scoped to the operand namespace (see
/// `runtime::initialization`). A lookup against a cache that has not completed
/// its initial list fails with [`StoreError::CacheNotSynced`] instead of
/// reporting a false "not found".
#[derive(Clone)]
pub struct CachedReader {
    secrets: Store<Secret>,
    services: Store<Service>,
}

impl std::fmt::Debug for CachedReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedReader")
            .field("secrets", &self.secrets.len())
            .field("services", &self.services.len())
            .finish()
    }
}

impl CachedReader {
    #[must_use]
    pub fn new(secrets: Store<Secret>, services: Store<Service>) -> Self {
        Self { secrets, services }
    }
}

fn lookup<K>(
    store: &Store<K>,
    kind: &'static str,
    namespace: &str,
    name: &str,
) -> Result<Option<Arc<K>>, StoreError>
where
    K: kube::Resource<DynamicType = ()> + Clone + 'static,
{
    // Poll once; ready stores resolve immediately
    match store.wait_until_ready().now_or_never() {
        Some(Ok(())) => Ok(store.get(&ObjectRef::new(name).within(namespace))),
        _ => Err(StoreError::CacheNotSynced { kind }),
    }
}

#[async_trait]
impl ObjectReader for CachedReader {
    async fn get_secret(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Secret>>, StoreError> {
        lookup(&self.secrets, "Secret", namespace, name)
    }

    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<Service>>, StoreError> {
        lookup(&self.services, "Service", namespace, name)
    }
}
