//! Stage F: Reliability Projection
//!
//! Remaining useful life from the log-domain slope:
//! - already at threshold: 0
//! - no discernible slope: capped at 3650 days
//! - slope change ≥ 0.01: ln(threshold/current) / (slope + change)
//! - otherwise: ln(threshold/current) / slope
//!
//! High instability shortens the projection. Alongside runs a
//! condition-adjusted Weibull model of the component class.

use statrs::distribution::{ContinuousCDF, Weibull};
use tracing::{debug, warn};

use super::{guard, Stage, StageOutcome};
use crate::config::defaults::{
    ACCELERATION_CHANGE, NLI_ADJUST_LIMIT, RUL_CAP_DAYS, WEIBULL_ALPHA_SEVERITY,
    WEIBULL_ETA_FLOOR_HOURS, WEIBULL_GAMMA_DEGRADATION, WEIBULL_HORIZON_HOURS, WEIBULL_R_TARGET,
};
use crate::processing::{clamp01, round_to, ProcessingError};
use crate::types::{BathtubPhase, ReliabilityMetrics, ReliabilityProjection, ReliabilityRequest};

const TINY: f64 = 1e-12;
const FLAT_SLOPE: f64 = 1e-9;

/// Base Weibull shape and scale (hours) per component class.
const COMPONENT_WEIBULL: &[(&str, f64, f64)] = &[
    ("bearing", 1.5, 50_000.0),
    ("seal", 1.2, 30_000.0),
    ("gear", 2.5, 80_000.0),
    ("coupling", 1.8, 60_000.0),
    ("motor", 1.3, 70_000.0),
    ("impeller", 2.0, 90_000.0),
    ("belt", 3.0, 15_000.0),
    ("foundation", 1.1, 120_000.0),
];

/// (β, η) for a component class; unknown classes use the bearing figures.
pub fn weibull_parameters(component_type: &str) -> (f64, f64) {
    let key = component_type.to_lowercase();
    COMPONENT_WEIBULL
        .iter()
        .find(|(name, _, _)| *name == key)
        .or_else(|| COMPONENT_WEIBULL.first())
        .map_or((1.5, 50_000.0), |(_, beta, eta)| (*beta, *eta))
}

fn ln_ratio(threshold: f64, current: f64) -> f64 {
    if current <= TINY || threshold <= TINY {
        0.0
    } else {
        (threshold / current).ln()
    }
}

/// Remaining useful life in days, clamped to [0, 3650].
pub fn rul_days(request: &ReliabilityRequest) -> f64 {
    let current = request.current_value;
    let threshold = request.failure_threshold;
    let slope = request.slope_log;

    let rul = if current >= threshold {
        0.0
    } else if slope.abs() < FLAT_SLOPE {
        RUL_CAP_DAYS
    } else {
        let ln = ln_ratio(threshold, current);
        let base = if request.slope_change >= ACCELERATION_CHANGE {
            let effective = slope + request.slope_change;
            if effective > FLAT_SLOPE {
                ln / effective
            } else {
                RUL_CAP_DAYS
            }
        } else {
            ln / slope
        };
        if request.instability_index >= NLI_ADJUST_LIMIT {
            base * (1.0 - request.instability_index)
        } else {
            base
        }
    };

    rul.clamp(0.0, RUL_CAP_DAYS)
}

pub fn recommended_window(rul_days: f64) -> &'static str {
    if rul_days < 7.0 {
        "Immediate"
    } else if rul_days < 30.0 {
        "Urgent (< 30 days)"
    } else if rul_days < 180.0 {
        "Planned"
    } else {
        "Monitor"
    }
}

fn bathtub_phase(beta: f64) -> BathtubPhase {
    if beta < 0.8 {
        BathtubPhase::InfantMortality
    } else if beta <= 1.2 {
        BathtubPhase::UsefulLife
    } else {
        BathtubPhase::WearOut
    }
}

/// Nowlan-Heap failure pattern letter.
fn failure_pattern(beta: f64) -> &'static str {
    if beta < 0.8 {
        "F"
    } else if beta <= 1.2 {
        "E"
    } else if beta <= 2.0 {
        "C"
    } else {
        "B"
    }
}

/// Condition-adjusted Weibull figures for the request's component class.
pub fn weibull_metrics(request: &ReliabilityRequest) -> Result<ReliabilityMetrics, ProcessingError> {
    let (beta_base, eta_base) = weibull_parameters(&request.component_type);
    let beta = beta_base * (1.0 + WEIBULL_ALPHA_SEVERITY * request.severity_score);
    let eta = (eta_base * (1.0 - WEIBULL_GAMMA_DEGRADATION * request.ssi)).max(WEIBULL_ETA_FLOOR_HOURS);
    let t = request.operating_hours.max(1.0);

    let hazard_rate = (beta / eta) * (t / eta).powf(beta - 1.0);

    let current = request.current_value;
    let baseline = request
        .baseline_value
        .filter(|b| *b > 0.0)
        .unwrap_or(current * 0.5);
    let span = request.failure_threshold - baseline;
    let pf_position = if span > TINY {
        clamp01((current - baseline) / span)
    } else {
        0.0
    };

    let model = Weibull::new(beta, eta).map_err(|e| ProcessingError::InvalidInput(e.to_string()))?;
    let r_now = model.sf(t);
    let r_horizon = model.sf(t + WEIBULL_HORIZON_HOURS);
    let failure_prob_30d = if r_now > TINY {
        clamp01((r_now - r_horizon) / r_now)
    } else {
        1.0
    };

    let target_hours = eta * (-WEIBULL_R_TARGET.ln()).powf(1.0 / beta) - t;
    let weibull_rul_days = if target_hours.is_finite() {
        (target_hours / 24.0).clamp(0.0, RUL_CAP_DAYS)
    } else {
        0.0
    };

    Ok(ReliabilityMetrics {
        beta_base: round_to(beta_base, 3),
        beta_adj: round_to(beta, 3),
        eta_base_hours: eta_base,
        eta_adj_hours: round_to(eta, 1),
        hazard_rate: round_to(hazard_rate, 8),
        bathtub_phase: bathtub_phase(beta),
        pf_interval_position: round_to(pf_position, 4),
        weibull_failure_prob_30d: round_to(failure_prob_30d, 4),
        weibull_rul_days: Some(round_to(weibull_rul_days, 2)),
        nowlan_heap_pattern: failure_pattern(beta).to_string(),
    })
}

pub fn evaluate(request: &ReliabilityRequest) -> Result<ReliabilityProjection, ProcessingError> {
    let scalars = [
        request.severity_score,
        request.confidence,
        request.slope_log,
        request.slope_change,
        request.instability_index,
        request.criticality,
        request.current_value,
        request.failure_threshold,
        request.operating_hours,
        request.ssi,
    ];
    if scalars.iter().any(|v| !v.is_finite()) {
        return Err(ProcessingError::NonFinite("reliability inputs"));
    }

    let rul = rul_days(request);
    let p30 = if rul > 1e-6 {
        1.0 - (-30.0 / rul).exp()
    } else {
        1.0
    };
    let failure_probability = clamp01(p30 * request.confidence);
    let risk_index = (100.0 * request.severity_score * request.criticality).clamp(0.0, 100.0);
    let window = recommended_window(rul);
    // A degenerate Weibull model drops only its own figures
    let metrics = match weibull_metrics(request) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(asset_id = %request.asset_id, error = %e, "Weibull model unavailable");
            None
        }
    };

    debug!(
        asset_id = %request.asset_id,
        rul_days = rul,
        failure_probability = failure_probability,
        risk_index = risk_index,
        beta_adj = ?metrics.as_ref().map(|m| m.beta_adj),
        "Reliability projected"
    );

    Ok(ReliabilityProjection {
        rul_days: round_to(rul, 2),
        failure_probability_30d: round_to(failure_probability, 4),
        confidence: round_to(request.confidence, 4),
        risk_index: round_to(risk_index, 2),
        recommended_window: window.to_string(),
        reliability_metrics: metrics,
    })
}

pub fn run_with_outcome(request: &ReliabilityRequest) -> StageOutcome<ReliabilityProjection> {
    guard(Stage::Reliability, evaluate(request))
}

pub fn run(request: &ReliabilityRequest) -> ReliabilityProjection {
    run_with_outcome(request).response
}
