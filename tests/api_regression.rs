//! API Regression Tests
//!
//! Drives the full router (nesting, CORS and trace layers included) with
//! `tower::ServiceExt::oneshot`, one request per stage endpoint plus the
//! composite pipeline and its error envelope.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rapid_ai::api::{create_app, AppState};
use rapid_ai::config::PipelineConfig;
use rapid_ai::RuleBook;

fn app() -> Router {
    let state = AppState::new(Arc::new(RuleBook::default()), &PipelineConfig::default());
    create_app(state, &[])
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Shaft tone at 200 Hz, sampled at 6400 Hz, with a small deterministic ripple.
fn tone(n: usize, rms: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / 6400.0;
            rms * std::f64::consts::SQRT_2 * (2.0 * std::f64::consts::PI * 200.0 * t).sin()
                + 0.05 * rms * (2.0 * std::f64::consts::PI * 1370.0 * t).sin()
        })
        .collect()
}

#[tokio::test]
async fn health_endpoint_reports_engine() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine"], "RAPID AI");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::post("/rapid-ai/moduleZ").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn data_guard_blocks_short_capture() {
    let (status, body) = post(
        "/rapid-ai/module0",
        json!({
            "asset_id": "P-101",
            "timestamp_utc": "2026-03-02T08:00:00Z",
            "signal": {
                "signal_type": "velocity",
                "direction": "H",
                "unit": "mm/s",
                "sampling_rate_hz": 6400,
                "values": tone(100, 1.0)
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["block"], true);
    assert_eq!(body["status"], "block");
    assert_eq!(body["reasons"][0], "DG_002: Too few samples (100 < 256)");
}

#[tokio::test]
async fn trend_engine_reports_waveform_features() {
    let (status, body) = post(
        "/rapid-ai/moduleA",
        json!({ "asset_id": "P-101", "values": tone(1024, 2.0) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rms = body["overall_rms"].as_f64().unwrap();
    assert!((rms - 2.0).abs() < 0.05, "rms = {rms}");
    assert!(body["baseline"].is_null());
}

#[tokio::test]
async fn initiator_rules_match_resonance() {
    let (status, body) = post(
        "/rapid-ai/moduleB",
        json!({
            "component": "afb",
            "metrics": { "H": 3.5, "V": 1.0, "kurtosis": 0.5, "crest_factor": 1.6 }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["component"], "afb");
    assert_eq!(body["confidence"], 0.8);
    let ids: Vec<&str> = body["matched_rules"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["rule_id"].as_str())
        .collect();
    assert!(ids.contains(&"AFB09"), "{ids:?}");
    assert!(ids.contains(&"AFB02"), "{ids:?}");
}

#[tokio::test]
async fn slope_intel_classifies_drift() {
    let values: Vec<f64> = (0..10).map(|i| (0.04 * i as f64).exp()).collect();
    let (status, body) = post("/rapid-ai/moduleBplus", json!({ "values": values })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trend_class"], "Drift");
    assert!((body["slope"].as_f64().unwrap() - 0.04).abs() < 1e-6);
}

#[tokio::test]
async fn stability_lens_from_given_metrics() {
    let (status, body) = post(
        "/rapid-ai/moduleBpp",
        json!({ "metrics": { "SE": 0.4, "TE": 0.3, "DE": 0.2, "dSE_dt": 0.0 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["SI"], 0.67);
    assert_eq!(body["stability_state"], "Drifting");
    assert_eq!(body["triggered_rules"][0], "SR02");
}

#[tokio::test]
async fn fusion_renormalises_single_block() {
    let (status, body) = post(
        "/rapid-ai/moduleC",
        json!({
            "system_type": "pump_train_horizontal",
            "blocks": {
                "afb": {
                    "B_match_score": 0.8,
                    "Bplus_trend_class": "Accelerating",
                    "Bplus_confidence": 0.9,
                    "process_correlation": 0.0
                }
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile_id"], "PROFILE_PUMP_A");
    assert_eq!(body["SSI"], 0.85);
    assert_eq!(body["system_state"], "critical");
}

#[tokio::test]
async fn health_stage_escalates_on_slope() {
    let (status, body) = post("/rapid-ai/moduleD", json!({ "SSI": 0.2, "SSI_slope": 0.03 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degradation_stage"], "Degrading");
}

#[tokio::test]
async fn maintenance_plan_reference_priority() {
    let (status, body) = post(
        "/rapid-ai/moduleE",
        json!({ "severity_score": 0.5, "confidence": 0.8, "criticality": 0.6, "urgency": 0.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_actions"], 1);
    assert_eq!(body["plan_items"][0]["priority_score"], 59.5);
    assert_eq!(body["plan_items"][0]["window"], "7 days");
    assert_eq!(body["plan_items"][0]["action_id"], "ACT001");
}

#[tokio::test]
async fn reliability_reference_projection() {
    let (status, body) = post(
        "/rapid-ai/moduleF",
        json!({
            "severity_score": 0.5,
            "confidence": 0.8,
            "slope_log": 0.01,
            "current_value": 3.0,
            "failure_threshold": 8.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["RUL_days"], 98.08);
    assert_eq!(body["recommended_window"], "Planned");
    assert_eq!(body["risk_index"], 30.0);
}

#[tokio::test]
async fn evaluate_runs_full_pipeline() {
    let (status, body) = post(
        "/rapid-ai/evaluate",
        json!({
            "asset_id": "P-101",
            "timestamp_utc": "2026-03-02T08:00:00Z",
            "trace_id": "api-1",
            "signal": {
                "signal_type": "velocity",
                "direction": "H",
                "unit": "mm/s",
                "sampling_rate_hz": 6400,
                "values": tone(2048, 1.5)
            },
            "context": { "rpm": 1480.0 },
            "historical_values": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["trace_id"], "api-1");
    assert_eq!(body["asset_id"], "P-101");
    assert_eq!(body["rul_days"], 3650.0);
    assert_eq!(body["recommended_window"], "Monitor");
    for key in [
        "module0", "moduleA", "moduleB", "moduleBplus", "moduleBpp", "moduleC", "moduleD",
        "moduleE", "moduleF",
    ] {
        assert!(body["module_trace"][key].is_object(), "missing {key}");
    }
}

#[tokio::test]
async fn evaluate_rejects_out_of_range_criticality() {
    let (status, body) = post(
        "/rapid-ai/evaluate",
        json!({
            "asset_id": "P-101",
            "timestamp_utc": "2026-03-02T08:00:00Z",
            "criticality": 1.5,
            "signal": {
                "signal_type": "velocity",
                "direction": "H",
                "unit": "mm/s",
                "sampling_rate_hz": 6400,
                "values": tone(512, 1.0)
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "criticality must be between 0 and 1");
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn evaluate_rejects_body_without_signal() {
    let (status, body) = post("/rapid-ai/evaluate", json!({ "asset_id": "P-101" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
