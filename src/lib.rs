pub mod backend;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use config::{GenerationConfig, ServiceKind};
use tower_http::cors::CorsLayer;
use tracing::info;

const LAB_UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

pub fn build_state(config: &GenerationConfig) -> Result<state::AppState, std::io::Error> {
    let state = state::AppState::new(config).map_err(std::io::Error::other)?;
    info!(
        base_url = %config.base_url,
        interpreter_models = %config.interpreter_models.join(","),
        lab_models = %config.lab_models.join(","),
        timeout_secs = config.timeout.as_secs(),
        "generation backends configured"
    );
    Ok(state)
}

pub fn build_app(service: ServiceKind, state: state::AppState) -> Router {
    let routes = match service {
        ServiceKind::Interpreter => Router::new()
            .route("/", get(handlers::interpreter_home))
            .route("/interpret", post(handlers::interpret)),
        ServiceKind::Lab => Router::new()
            .route("/", get(handlers::lab_home))
            .route("/parse", post(handlers::parse))
            .layer(DefaultBodyLimit::max(LAB_UPLOAD_LIMIT_BYTES)),
    };

    routes
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
