//! # Ensurer
//!
//! Create-if-absent application of desired objects.

use crate::store::{ObjectReader, ObjectWriter, StoreError};
use k8s_openapi::api::core::v1::Service;
use std::sync::Arc;
use tracing::debug;

/// Result of an ensure: the live object and whether this call created it
#[derive(Debug, Clone, PartialEq)]
pub struct Ensured<K> {
    pub object: Arc<K>,
    pub created: bool,
}

/// Ensures the webhook Service exists
///
/// An existing Service is returned as-is; no comparison or update is made.
/// Drift correction is left to callers through [`crate::equality`].
#[derive(Clone)]
pub struct ServiceEnsurer {
    reader: Arc<dyn ObjectReader>,
    writer: Arc<dyn ObjectWriter>,
}

impl std::fmt::Debug for ServiceEnsurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEnsurer").finish_non_exhaustive()
    }
}

impl ServiceEnsurer {
    #[must_use]
    pub fn new(reader: Arc<dyn ObjectReader>, writer: Arc<dyn ObjectWriter>) -> Self {
        Self { reader, writer }
    }

    /// Look the desired Service up by namespace/name and create it when absent
    ///
    /// Any create failure is returned, including `AlreadyExists` when another
    /// writer won the race; the next pass will find the object in the cache.
    pub async fn ensure(&self, desired: &Service) -> Result<Ensured<Service>, StoreError> {
        let (namespace, name) = match (
            desired.metadata.namespace.as_deref(),
            desired.metadata.name.as_deref(),
        ) {
            (Some(namespace), Some(name)) => (namespace, name),
            _ => {
                return Err(StoreError::InvalidObject(
                    "desired Service must have a namespace and a name".to_string(),
                ))
            }
        };

        if let Some(live) = self.reader.get_service(namespace, name).await? {
            debug!(namespace, name, "service already exists");
            return Ok(Ensured {
                object: live,
                created: false,
            });
        }

        let created = self.writer.create_service(desired).await?;
        Ok(Ensured {
            object: Arc::new(created),
            created: true,
        })
    }
}
