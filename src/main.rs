//! # ClusterResourceOverride Operator
//!
//! Watches `ClusterResourceOverride` resources and keeps the admission webhook
//! operand in place.

use anyhow::Result;
use resource_override_operator::runtime::initialization::initialize;
use resource_override_operator::runtime::watch_loop::run_watch_loop;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    run_watch_loop(
        init.client,
        &init.config.operand_namespace,
        init.reconciler,
        init.server_state,
    )
    .await
}
