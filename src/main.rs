use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::RestConfig;
use records_core::RecordStore;

/// Main entry point for the clinical records service.
///
/// Reports what the data directory holds, then serves the REST API (with Swagger UI and the
/// static frontend) until Ctrl-C.
///
/// # Environment Variables
/// - `RECORDS_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `RECORDS_DATA_DIR`: directory holding the collection files (default: "data")
/// - `RECORDS_REFERENCE_DIR`: directory whose `codes.json` overrides the data copy
///   (default: "static/data")
/// - `RECORDS_STATIC_DIR`: frontend files served under `/static` (default: "static")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("records_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("records_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RestConfig::from_env()?;
    tracing::info!("++ Starting clinical records REST on {}", cfg.addr);

    let store = cfg.open_store();
    report_store(&cfg, &store);

    api_rest::serve(&cfg.addr, api_rest::app(&cfg, store)).await
}

fn report_store(cfg: &RestConfig, store: &RecordStore) {
    let users = store.load_users().len();
    tracing::info!(
        "data directory {}: {} users, {} patients, {} diagnoses, {} sessions",
        cfg.core.data_dir().display(),
        users,
        store.load_patients().len(),
        store.load_diagnoses().len(),
        store.session_count()
    );

    if users == 0 {
        tracing::warn!("no user accounts found; run `records seed` to create the demo accounts");
    }
    if store.codes().is_empty() {
        tracing::warn!("no diagnosis codes available");
    }
}
