//! API route handlers
//!
//! One handler per stage plus the composite pipeline. Every stage runs on
//! the orchestrator's blocking pool, never on the async worker. Bodies that
//! fail to deserialize are answered with the error envelope rather than
//! axum's plain-text rejection.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, warn};

use super::envelope::ApiErrorResponse;
use crate::config::{self, PipelineConfig};
use crate::pipeline::{PipelineError, PipelineOrchestrator};
use crate::rules::{RuleBook, RuleProvider};
use crate::stages::{
    data_guard, fusion, health_stage, initiator_rules, maintenance_plan, reliability,
    slope_intel, stability_lens, trend_engine, Stage,
};
use crate::types::{
    DataGuardRequest, FullAnalysisRequest, FusionRequest, FusionResult, HealthAssessment,
    HealthRequest, InitiatorReport, InitiatorRequest, MaintenancePlan, MaintenanceRequest,
    ReliabilityProjection, ReliabilityRequest, SlopeAssessment, SlopeRequest,
    StabilityAssessment, StabilityRequest, TrendFeatures, TrendRequest,
};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: PipelineOrchestrator,
    pub rules: Arc<dyn RuleProvider>,
}

impl AppState {
    pub fn new(rules: Arc<dyn RuleProvider>, pipeline: &PipelineConfig) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new(Arc::clone(&rules), pipeline),
            rules,
        }
    }

    /// State over the global rule book and pipeline settings.
    pub fn from_global() -> Self {
        let rules: Arc<dyn RuleProvider> = RuleBook::global();
        Self::new(rules, &config::get().pipeline)
    }
}

/// Deserialize-or-reject, then run a stage on the orchestrator's worker
/// pool and serialize its record.
///
/// `fallback` stands in when the stage worker panics; a closed pool is
/// answered with 503.
async fn respond<Req, Resp, F, D>(
    state: &AppState,
    stage: Stage,
    body: Result<Json<Req>, JsonRejection>,
    run: F,
    fallback: D,
) -> Response
where
    Req: Send + Sync + 'static,
    Resp: Serialize + Send + 'static,
    F: FnOnce(&Req) -> Resp + Send + 'static,
    D: FnOnce(&Req) -> Resp,
{
    let request = match body {
        Ok(Json(request)) => Arc::new(request),
        Err(rejection) => {
            warn!(stage = %stage, error = %rejection, "Rejected request body");
            return ApiErrorResponse::bad_request(rejection.body_text());
        }
    };

    debug!(stage = %stage, "Stage request");
    let job_request = Arc::clone(&request);
    let outcome = state
        .orchestrator
        .offload(stage, move || run(&job_request), || fallback(&request))
        .await;

    match outcome {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            warn!(stage = %stage, error = %e, "Stage could not run");
            ApiErrorResponse::service_unavailable(e.to_string())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "engine": "RAPID AI",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /rapid-ai/module0
pub async fn run_data_guard(
    State(state): State<AppState>,
    body: Result<Json<DataGuardRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::DataGuard, body, data_guard::run, data_guard::uncomputed).await
}

/// POST /rapid-ai/moduleA
pub async fn run_trend(
    State(state): State<AppState>,
    body: Result<Json<TrendRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::Trend, body, trend_engine::run, |_| TrendFeatures::default()).await
}

/// POST /rapid-ai/moduleB
pub async fn run_initiators(
    State(state): State<AppState>,
    body: Result<Json<InitiatorRequest>, JsonRejection>,
) -> Response {
    let rules = Arc::clone(&state.rules);
    respond(
        &state,
        Stage::Initiators,
        body,
        move |req| initiator_rules::run_with_outcome(req, rules.as_ref()).response,
        |req| InitiatorReport {
            component: req.component.clone(),
            ..InitiatorReport::default()
        },
    )
    .await
}

/// POST /rapid-ai/moduleBplus
pub async fn run_slope(
    State(state): State<AppState>,
    body: Result<Json<SlopeRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::Slope, body, slope_intel::run, |_| SlopeAssessment::default()).await
}

/// POST /rapid-ai/moduleBpp
pub async fn run_stability(
    State(state): State<AppState>,
    body: Result<Json<StabilityRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::Stability, body, stability_lens::run, |_| {
        StabilityAssessment::default()
    })
    .await
}

/// POST /rapid-ai/moduleC
pub async fn run_fusion(
    State(state): State<AppState>,
    body: Result<Json<FusionRequest>, JsonRejection>,
) -> Response {
    let rules = Arc::clone(&state.rules);
    respond(
        &state,
        Stage::Fusion,
        body,
        move |req| fusion::run_with_outcome(req, rules.as_ref()).response,
        |req| FusionResult {
            system_type: req.system_type.clone(),
            ..FusionResult::default()
        },
    )
    .await
}

/// POST /rapid-ai/moduleD
pub async fn run_health(
    State(state): State<AppState>,
    body: Result<Json<HealthRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::Health, body, health_stage::run, |_| HealthAssessment::default()).await
}

/// POST /rapid-ai/moduleE
pub async fn run_maintenance(
    State(state): State<AppState>,
    body: Result<Json<MaintenanceRequest>, JsonRejection>,
) -> Response {
    let rules = Arc::clone(&state.rules);
    respond(
        &state,
        Stage::Maintenance,
        body,
        move |req| maintenance_plan::run_with_outcome(req, rules.as_ref()).response,
        |_| MaintenancePlan::default(),
    )
    .await
}

/// POST /rapid-ai/moduleF
pub async fn run_reliability(
    State(state): State<AppState>,
    body: Result<Json<ReliabilityRequest>, JsonRejection>,
) -> Response {
    respond(&state, Stage::Reliability, body, reliability::run, |_| {
        ReliabilityProjection::default()
    })
    .await
}

/// POST /rapid-ai/evaluate
pub async fn evaluate(
    State(state): State<AppState>,
    body: Result<Json<FullAnalysisRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected pipeline request body");
            return ApiErrorResponse::bad_request(rejection.body_text());
        }
    };

    match state.orchestrator.evaluate(request).await {
        Ok(response) => Json(response).into_response(),
        Err(PipelineError::InvalidInput(msg)) => ApiErrorResponse::bad_request(msg),
        Err(e @ PipelineError::Worker(_)) => {
            warn!(error = %e, "Pipeline could not run");
            ApiErrorResponse::service_unavailable(e.to_string())
        }
    }
}
