//! # API REST
//!
//! REST API for the clinical records service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - bearer-token sessions backed by the record store
//! - OpenAPI/Swagger documentation
//! - static frontend files and CORS
//!
//! Uses `api-shared` for password hashing and health, `fhir` for resource translation.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::RestConfig;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use records_core::RecordStore;
use std::path::Path;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::{LoginReq, LoginRes, UserSummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::login,
        handlers::logout,
        handlers::list_users,
        handlers::create_patient,
        handlers::get_patient,
        handlers::patient_fhir,
        handlers::create_diagnosis,
        handlers::list_records,
        handlers::my_records,
        handlers::record_fhir,
        handlers::codes,
    ),
    components(schemas(api_shared::HealthRes, LoginReq, LoginRes, UserSummary))
)]
pub struct ApiDoc;

/// Build the full application router.
///
/// `static_dir` is mounted at `/static`, with its `index.html` served at `/`, only when the
/// directory exists.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/users", get(handlers::list_users))
        .route("/api/patients", post(handlers::create_patient))
        .route("/api/patients/:id", get(handlers::get_patient))
        .route("/api/patients/:id/fhir", get(handlers::patient_fhir))
        .route("/api/diagnoses", post(handlers::create_diagnosis))
        .route("/api/records", get(handlers::list_records))
        .route("/api/records/:id/fhir", get(handlers::record_fhir))
        .route("/api/myrecords", get(handlers::my_records))
        .route("/api/codes", get(handlers::codes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    let app = match static_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            tracing::info!("serving static files from {}", dir.display());
            app.nest_service("/static", ServeDir::new(dir))
                .route_service("/", ServeFile::new(dir.join("index.html")))
        }
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build state and router around `store`, serving static files from `cfg.static_dir`.
///
/// Every other handle on the same data directory must be a clone of `store`, so that they
/// share its collection locks.
pub fn app(cfg: &RestConfig, store: RecordStore) -> Router {
    router(AppState::new(store), Some(&cfg.static_dir))
}

/// Serve `app` on `addr` until Ctrl-C.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Clinical records REST listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- REST server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
