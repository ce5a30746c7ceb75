//! # Watch Loop
//!
//! Runs the controller over `ClusterResourceOverride` resources. Changes to
//! the webhook Service are mapped back to its controlling owner so a deleted
//! or edited Service is repaired without waiting for the resync.

use crate::crd::ClusterResourceOverride;
use crate::runtime::error_policy::handle_reconciliation_error;
use crate::runtime::reconcile::{reconcile, Reconciler};
use crate::server::ServerState;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;
use kube::{Client, Resource};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Controlling `ClusterResourceOverride` of a Service, if any
///
/// The owner is cluster-scoped, so the reference carries no namespace.
#[must_use]
pub fn controlling_owner(service: &Service) -> Option<ObjectRef<ClusterResourceOverride>> {
    let kind = ClusterResourceOverride::kind(&());
    let api_version = ClusterResourceOverride::api_version(&());
    service
        .metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|r| r.controller == Some(true) && r.kind == kind && r.api_version == api_version)
        .map(|r| ObjectRef::new(&r.name))
}

/// Run the controller until a shutdown signal is received
pub async fn run_watch_loop(
    client: Client,
    operand_namespace: &str,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let overrides: Api<ClusterResourceOverride> = Api::all(client.clone());
    let services: Api<Service> = Api::namespaced(client, operand_namespace);

    info!(namespace = operand_namespace, "starting controller watch loop");

    Controller::new(overrides, watcher::Config::default().any_semantic())
        .watches(services, watcher::Config::default(), |service| {
            controlling_owner(&service)
        })
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => debug!(key = %obj.name, "reconcile finished"),
                Err(e) => warn!(error = %e, "controller event failed"),
            }
        })
        .await;

    server_state.set_ready(false);
    info!("controller stopped gracefully");
    Ok(())
}
