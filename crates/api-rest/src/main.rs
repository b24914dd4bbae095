//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the startup checks of the workspace's
//! `records-run` binary. Useful during frontend development.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::RestConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("records_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RestConfig::from_env()?;
    tracing::info!("data directory: {}", cfg.core.data_dir().display());

    let store = cfg.open_store();
    api_rest::serve(&cfg.addr, api_rest::app(&cfg, store)).await
}
