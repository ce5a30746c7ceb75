//! # Initialization
//!
//! Operator start-up: rustls provider, tracing, metrics, probe server,
//! Kubernetes client, informer caches and the reconciler context.

use crate::asset::{Asset, AssetValues};
use crate::config::ControllerConfig;
use crate::controller::handlers::{Handler, ServiceHandler};
use crate::observability;
use crate::runtime::reconcile::Reconciler;
use crate::runtime::status::ApiStatusWriter;
use crate::server::{start_server, ServerState};
use crate::store::{ApiWriter, CachedReader};
use anyhow::{Context, Result};
use futures::StreamExt;
use k8s_openapi::api::core::v1::{Secret, Service};
use kube::api::Api;
use kube::Client;
use kube_runtime::reflector::{self, Store};
use kube_runtime::{watcher, WatchStreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{error, info};

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    pub config: ControllerConfig,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the operator runtime
///
/// Readiness is reported only once the Secret and Service caches have
/// completed their initial list, so the first reconciliation never mistakes an
/// empty cache for a missing object.
pub async fn initialize() -> Result<InitializationResult> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resource_override_operator=info".into()),
        )
        .init();

    info!("Starting ClusterResourceOverride operator");
    info!(
        timestamp = env!("BUILD_TIMESTAMP"),
        datetime = env!("BUILD_DATETIME"),
        git_hash = env!("BUILD_GIT_HASH"),
        "build info"
    );

    let config = ControllerConfig::from_env();
    info!(?config, "loaded configuration");

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_port = config.metrics_port;
    let server_state_clone = Arc::clone(&server_state);
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!(error = %e, "HTTP server error");
        }
    });

    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    let secrets = spawn_reflector(Api::<Secret>::namespaced(
        client.clone(),
        &config.operand_namespace,
    ));
    let services = spawn_reflector(Api::<Service>::namespaced(
        client.clone(),
        &config.operand_namespace,
    ));

    info!(namespace = %config.operand_namespace, "waiting for informer caches to sync");
    secrets
        .wait_until_ready()
        .await
        .context("Secret reflector stopped before syncing")?;
    services
        .wait_until_ready()
        .await
        .context("Service reflector stopped before syncing")?;

    let reader = Arc::new(CachedReader::new(secrets, services));
    let writer = Arc::new(ApiWriter::new(client.clone()));
    let asset = Arc::new(Asset::new(AssetValues::from(&config)));

    let service_handler: Arc<dyn Handler> = Arc::new(ServiceHandler::new(asset, reader, writer));
    let handlers = vec![service_handler];
    let reconciler = Arc::new(Reconciler::new(
        &config,
        handlers,
        Arc::new(ApiStatusWriter::new(client.clone())),
    ));

    server_state.set_ready(true);
    info!("operator initialized, starting watch loop");

    Ok(InitializationResult {
        client,
        config,
        reconciler,
        server_state,
    })
}

/// Start a namespaced watcher feeding a reflector store
fn spawn_reflector<K>(api: Api<K>) -> Store<K>
where
    K: kube::Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let (store, writer) = reflector::store();
    let stream = watcher(api, watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .touched_objects();

    tokio::spawn(async move {
        stream
            .for_each(|event| async move {
                if let Err(e) = event {
                    error!(error = %e, "watch error");
                }
            })
            .await;
    });

    store
}
