//! # Service Handler
//!
//! Keeps the Service fronting the webhook in place and tracked in
//! `status.resources.serviceRef`.
//!
//! ## Pass
//!
//! 1. Delete the serving-cert secret if it was not issued for the current
//!    Service (legacy self-signed certs carry no origin annotation); the
//!    service CA issues a fresh one
//! 2. Create the Service if the cache does not have it
//! 3. Point `serviceRef` at the live Service unless it already points at the
//!    same resourceVersion
//!
//! Every step is idempotent, so a pass that fails halfway is completed by the
//! next one.

use super::{HandleResult, Handler, ReconcileRequestContext};
use crate::asset::Asset;
use crate::constants::ORIGINATING_SERVICE_NAME_ANNOTATION;
use crate::controller::condition::InstallReadinessError;
use crate::crd::ClusterResourceOverride;
use crate::ensurer::ServiceEnsurer;
use crate::equality::service_equal;
use crate::observability::metrics;
use crate::reference;
use crate::store::{ObjectReader, ObjectWriter};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ServiceHandler {
    asset: Arc<Asset>,
    reader: Arc<dyn ObjectReader>,
    writer: Arc<dyn ObjectWriter>,
    ensurer: ServiceEnsurer,
}

impl std::fmt::Debug for ServiceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandler")
            .field("service", &self.asset.service().name())
            .finish_non_exhaustive()
    }
}

impl ServiceHandler {
    #[must_use]
    pub fn new(
        asset: Arc<Asset>,
        reader: Arc<dyn ObjectReader>,
        writer: Arc<dyn ObjectWriter>,
    ) -> Self {
        let ensurer = ServiceEnsurer::new(Arc::clone(&reader), Arc::clone(&writer));
        Self {
            asset,
            reader,
            writer,
            ensurer,
        }
    }

    /// Semantic comparison of a desired and a live Service
    ///
    /// True when every spec and metadata field set on `this` matches `that`.
    /// Not used by [`Handler::handle`]; exposed for drift detection.
    #[must_use]
    pub fn equal(&self, this: &Service, that: &Service) -> bool {
        service_equal(this, that)
    }

    /// Delete the serving-cert secret when it was not issued for `service_name`
    async fn check_serving_cert(
        &self,
        key: &str,
        namespace: &str,
        service_name: &str,
    ) -> Result<(), InstallReadinessError> {
        let secret_name = self.asset.service_serving_secret().name();

        let secret = self
            .reader
            .get_secret(namespace, &secret_name)
            .await
            .map_err(InstallReadinessError::CertNotAvailable)?;

        let Some(secret) = secret else {
            debug!(key, resource = %format!("Secret/{secret_name}"), "serving cert not provisioned yet");
            return Ok(());
        };

        let origin = secret
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(ORIGINATING_SERVICE_NAME_ANNOTATION));
        if origin.map(String::as_str) == Some(service_name) {
            return Ok(());
        }

        info!(
            key,
            resource = %format!("Secret/{secret_name}"),
            origin = ?origin,
            service = service_name,
            "deleting stale serving cert secret"
        );
        self.writer
            .delete_secret(namespace, &secret_name)
            .await
            .map_err(InstallReadinessError::InternalError)?;
        metrics::increment_stale_serving_secrets_deleted();

        Ok(())
    }

    /// Point `serviceRef` at `live`; a no-op when already at its version
    fn sync_reference(
        key: &str,
        current: &mut ClusterResourceOverride,
        live: &Service,
    ) -> Result<(), InstallReadinessError> {
        let stored = current
            .status
            .as_ref()
            .and_then(|s| s.resources.service_ref.as_ref());
        if reference::is_current(stored, live) {
            debug!(key, resource = %format!("Service/{}", live.name_any()), "in sync");
            return Ok(());
        }

        let new_ref = reference::object_reference(live)
            .map_err(InstallReadinessError::CannotSetReference)?;

        debug!(
            key,
            resource = %format!("Service/{}", live.name_any()),
            resource_version = ?new_ref.resource_version,
            "setting object reference"
        );
        current
            .status
            .get_or_insert_with(Default::default)
            .resources
            .service_ref = Some(new_ref);

        Ok(())
    }
}

#[async_trait]
impl Handler for ServiceHandler {
    async fn handle(
        &self,
        ctx: &ReconcileRequestContext,
        current: &mut ClusterResourceOverride,
    ) -> Result<HandleResult, InstallReadinessError> {
        let key = current.name_any();
        let namespace = ctx.webhook_namespace();
        let service_name = self.asset.service().name();

        self.check_serving_cert(&key, namespace, service_name).await?;

        let mut desired = self.asset.service().new_object();
        desired.metadata.namespace = Some(namespace.to_string());
        ctx.controller_setter().set(&mut desired.metadata, current);

        let ensured = self
            .ensurer
            .ensure(&desired)
            .await
            .map_err(InstallReadinessError::CertNotAvailable)?;
        if ensured.created {
            info!(key = %key, resource = %format!("Service/{service_name}"), "successfully created");
            metrics::increment_services_created();
        }

        Self::sync_reference(&key, current, &ensured.object)?;

        Ok(HandleResult::default())
    }
}
