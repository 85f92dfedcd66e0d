//! Pipeline Regression Tests
//!
//! End-to-end runs of the nine-stage pipeline on seeded synthetic captures:
//! a healthy machine, a drifting machine, unusable data, triaxial input and
//! the JSON wire format.

use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tokio_test::{assert_err, assert_ok};

use rapid_ai::config::PipelineConfig;
use rapid_ai::types::{
    ContextInput, Direction, FullAnalysisRequest, HealthStage, SecondaryAxes, SignalInput,
    SignalType, TrendClass,
};
use rapid_ai::{PipelineError, PipelineOrchestrator, RuleBook};

fn noise(n: usize, sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

/// A 200 Hz tone (whole cycles per spectrum window) over light noise.
fn tonal(n: usize, rms: f64, seed: u64) -> Vec<f64> {
    noise(n, 0.1 * rms, seed)
        .into_iter()
        .enumerate()
        .map(|(i, e)| rms * SQRT_2 * (2.0 * PI * 200.0 * i as f64 / 6400.0).sin() + e)
        .collect()
}

fn pipeline() -> PipelineOrchestrator {
    PipelineOrchestrator::new(Arc::new(RuleBook::default()), &PipelineConfig::default())
}

fn capture(values: Vec<f64>) -> FullAnalysisRequest {
    FullAnalysisRequest {
        asset_id: "PUMP-204".to_string(),
        timestamp_utc: "2026-03-02T08:00:00Z".to_string(),
        signal: SignalInput {
            signal_type: SignalType::Velocity,
            direction: Direction::H,
            unit: "mm/s".to_string(),
            sampling_rate_hz: 6400,
            values,
        },
        context: Some(ContextInput {
            rpm: Some(1480.0),
            ..ContextInput::default()
        }),
        ..FullAnalysisRequest::default()
    }
}

#[tokio::test]
async fn flat_history_projects_the_life_cap() {
    let mut request = capture(tonal(2048, 1.0, 11));
    request.historical_values = Some(vec![1.0; 12]);

    let response = assert_ok!(pipeline().evaluate(request).await);

    let stability = response.module_trace.stability.as_ref().unwrap();
    assert!(stability.si > 0.40, "si = {}", stability.si);
    assert_eq!(response.module_trace.initiators.as_ref().unwrap().num_matches, 0);

    let slope = response.module_trace.slope.as_ref().unwrap();
    assert_eq!(slope.trend_class, TrendClass::Stable);
    assert_eq!(slope.slope, 0.0);
    assert_eq!(response.health_stage, HealthStage::Healthy);
    assert_eq!(response.rul_days, Some(3650.0));
    assert_eq!(response.recommended_window, "Monitor");
    assert!(response.confidence >= 0.0 && response.confidence <= 1.0);
    assert!(response.final_severity_score >= 0.0 && response.final_severity_score <= 1.0);
}

#[tokio::test]
async fn drifting_history_degrades_and_shortens_life() {
    let mut request = capture(tonal(2048, 3.0, 12));
    request.historical_values = Some((0..20).map(|i| (0.04 * i as f64).exp()).collect());
    request.failure_threshold = 8.0;

    let response = assert_ok!(pipeline().evaluate(request).await);

    let slope = response.module_trace.slope.as_ref().unwrap();
    assert_eq!(slope.trend_class, TrendClass::Drift);
    assert!((slope.slope - 0.04).abs() < 1e-6);

    // an unmatched drifting block scores 0.40
    let fusion = response.module_trace.fusion.as_ref().unwrap();
    assert!((fusion.ssi - 0.40).abs() < 1e-9);
    assert_eq!(response.health_stage, HealthStage::Degrading);

    // ln(8 / ~3.0) / 0.04 ~ 24.4 days
    let rul = response.rul_days.unwrap();
    assert!(rul > 20.0 && rul < 30.0, "rul = {rul}");
    assert_eq!(response.recommended_window, "Urgent (< 30 days)");
}

#[tokio::test]
async fn unusable_capture_stops_after_the_data_guard() {
    let mut request = capture(noise(2048, 1.0, 13));
    request.asset_id.clear();

    let response = pipeline().evaluate(request).await.unwrap();

    assert_eq!(response.health_stage, HealthStage::Blocked);
    assert_eq!(response.rul_days, None);
    assert_eq!(response.risk_index, 0.0);
    let guard = response.module_trace.data_guard.as_ref().unwrap();
    assert!(guard.block);
    assert!(guard.reasons.iter().any(|r| r.starts_with("DG_001")));
    assert!(response.module_trace.fusion.is_none());
}

#[tokio::test]
async fn out_of_domain_request_is_rejected_before_any_stage() {
    let mut request = capture(noise(2048, 1.0, 14));
    request.criticality = 1.5;

    let err = assert_err!(pipeline().evaluate(request).await);
    match err {
        PipelineError::InvalidInput(msg) => assert_eq!(msg, "criticality must be between 0 and 1"),
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[tokio::test]
async fn measured_vertical_axis_changes_the_initiator_match() {
    let primary = noise(2048, 1.0, 15);

    // Proxy V and A (0.85 H, 0.60 H) trip nothing on a quiet bearing
    let proxied = pipeline().evaluate(capture(primary.clone())).await.unwrap();
    let report = proxied.module_trace.initiators.as_ref().unwrap();
    assert_eq!(report.num_matches, 0);
    assert_eq!(report.confidence, 0.0);

    // A weak measured V pushes H/V past the clearance threshold
    let mut request = capture(primary);
    request.secondary_axes = Some(SecondaryAxes {
        v: Some(noise(2048, 0.4, 16)),
        a: None,
    });
    let measured = pipeline().evaluate(request).await.unwrap();
    let report = measured.module_trace.initiators.as_ref().unwrap();
    assert!(report
        .matched_rules
        .iter()
        .any(|m| m.rule_id == "AFB02" && m.initiator == "Wrong Clearance"));
    assert!(report.confidence >= 0.5);

    let stability = measured.module_trace.stability.as_ref().unwrap();
    assert!(stability.si >= 0.0 && stability.si <= 1.0);
}

#[tokio::test]
async fn json_request_with_gaps_runs_end_to_end() {
    let mut samples: Vec<serde_json::Value> = noise(1024, 1.0, 17)
        .into_iter()
        .map(serde_json::Value::from)
        .collect();
    samples[100] = serde_json::Value::Null;
    samples[700] = serde_json::Value::Null;

    let body = serde_json::json!({
        "asset_id": "FAN-7",
        "timestamp_utc": "2026-03-02T08:00:00Z",
        "system_type": "fan_train",
        "trace_id": "run-42",
        "signal": {
            "signal_type": "velocity",
            "direction": "H",
            "unit": "mm/s",
            "sampling_rate_hz": 6400,
            "values": samples
        },
        "context": { "rpm": 990.0 }
    });
    let request: FullAnalysisRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.signal.values.len(), 1024);
    assert!(request.signal.values[100].is_nan());
    assert_eq!(request.criticality, 0.6);

    let response = pipeline().evaluate(request).await.unwrap();
    assert_eq!(response.trace_id, "run-42");
    assert_ne!(response.health_stage, HealthStage::Blocked);
    assert_eq!(
        response.module_trace.fusion.as_ref().unwrap().profile_id,
        "PROFILE_FAN_A"
    );

    let wire = serde_json::to_value(&response).unwrap();
    assert!(wire["module_trace"]["module0"].is_object());
    assert!(wire["module_trace"]["moduleF"]["RUL_days"].is_number());
    assert_eq!(wire["asset_id"], "FAN-7");
}
