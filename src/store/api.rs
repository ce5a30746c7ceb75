//! API server backed [`ObjectWriter`].

use super::{ObjectWriter, StoreError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Secret, Service};
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use tracing::debug;

/// Writes straight to the API server
#[derive(Clone)]
pub struct ApiWriter {
    client: Client,
}

impl std::fmt::Debug for ApiWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiWriter").finish_non_exhaustive()
    }
}

impl ApiWriter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectWriter for ApiWriter {
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                debug!(namespace, name, "secret already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_service(&self, service: &Service) -> Result<Service, StoreError> {
        let namespace = service.metadata.namespace.as_deref().ok_or_else(|| {
            StoreError::InvalidObject("desired Service has no namespace".to_string())
        })?;
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);

        match api.create(&PostParams::default(), service).await {
            Ok(created) => Ok(created),
            Err(kube::Error::Api(api_err)) if api_err.code == 409 => {
                Err(StoreError::AlreadyExists {
                    kind: "Service",
                    namespace: namespace.to_string(),
                    name: service.metadata.name.clone().unwrap_or_default(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
