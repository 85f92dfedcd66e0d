//! API route definitions
//!
//! - /health - liveness
//! - /rapid-ai/module0 .. /rapid-ai/moduleF - single stages
//! - /rapid-ai/evaluate - the full pipeline

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, AppState};

/// Stage and pipeline endpoints, nested under `/rapid-ai`.
pub fn engine_routes(state: AppState) -> Router {
    Router::new()
        .route("/module0", post(handlers::run_data_guard))
        .route("/moduleA", post(handlers::run_trend))
        .route("/moduleB", post(handlers::run_initiators))
        .route("/moduleBplus", post(handlers::run_slope))
        .route("/moduleBpp", post(handlers::run_stability))
        .route("/moduleC", post(handlers::run_fusion))
        .route("/moduleD", post(handlers::run_health))
        .route("/moduleE", post(handlers::run_maintenance))
        .route("/moduleF", post(handlers::run_reliability))
        .route("/evaluate", post(handlers::evaluate))
        .with_state(state)
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(handlers::health))
}
