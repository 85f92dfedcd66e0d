//! Stage B+: Slope Intelligence
//!
//! Log-domain trend classification of a historical series. A constant
//! fractional growth rate shows up as a straight line after the log
//! transform, so the slope reads directly as growth per sample step.

use tracing::debug;

use super::{guard, Stage, StageOutcome};
use crate::config::defaults::{
    ACCEL_CHANGE, ACCEL_SLOPE, CHAOTIC_SLOPE_LIMIT, CHAOTIC_VOLATILITY, DRIFT_SLOPE, EPSILON,
    NLI_MULTIPLIER, STEP_JUMP,
};
use crate::processing::{diff, linear_fit, residual_std, round_to, ProcessingError};
use crate::types::{SlopeAssessment, SlopeRequest, TrendClass};

/// Precedence chain: Step, Chaotic, Accelerating, Drift, Stable.
pub fn classify(slope: f64, slope_change: f64, volatility: f64, max_jump: f64) -> TrendClass {
    let abs_slope = slope.abs();
    if max_jump > STEP_JUMP {
        TrendClass::Step
    } else if volatility > CHAOTIC_VOLATILITY && abs_slope < CHAOTIC_SLOPE_LIMIT {
        TrendClass::Chaotic
    } else if abs_slope > ACCEL_SLOPE && slope_change.abs() > ACCEL_CHANGE {
        TrendClass::Accelerating
    } else if abs_slope > DRIFT_SLOPE {
        TrendClass::Drift
    } else {
        TrendClass::Stable
    }
}

/// Severity implied by a class at the given slope and slope change.
pub fn class_severity(class: TrendClass, slope: f64, slope_change: f64) -> f64 {
    let abs_slope = slope.abs();
    let severity = match class {
        // investigate, not alarm
        TrendClass::Chaotic => 0.3,
        TrendClass::Step => 0.8,
        TrendClass::Accelerating => (abs_slope * 10.0 + slope_change.abs() * 5.0).min(1.0),
        TrendClass::Drift => (abs_slope * 8.0).min(0.7),
        TrendClass::Stable => (abs_slope * 3.0).max(0.0),
    };
    severity.min(1.0)
}

pub fn evaluate(request: &SlopeRequest) -> Result<SlopeAssessment, ProcessingError> {
    let n = request.values.len();
    if n < 2 {
        return Ok(SlopeAssessment::default());
    }
    if request.values.iter().any(|v| !v.is_finite()) {
        return Err(ProcessingError::NonFinite("historical values"));
    }

    let logs: Vec<f64> = request.values.iter().map(|v| v.max(EPSILON).ln()).collect();
    let fit = linear_fit(&logs)?;
    let slope = fit.slope;

    let slope_change = if n >= 4 {
        let mid = n / 2;
        linear_fit(&logs[mid..])?.slope - linear_fit(&logs[..mid])?.slope
    } else {
        0.0
    };

    let volatility = if n >= 3 { residual_std(&logs, &fit) } else { 0.0 };
    let instability = (volatility * NLI_MULTIPLIER).min(1.0);

    let max_jump = diff(&logs).iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));

    let trend_class = classify(slope, slope_change, volatility, max_jump);
    let severity = class_severity(trend_class, slope, slope_change);

    debug!(
        asset_id = %request.asset_id,
        points = n,
        slope = slope,
        slope_change = slope_change,
        trend_class = %trend_class,
        "Slope assessed"
    );

    Ok(SlopeAssessment {
        slope: round_to(slope, 6),
        slope_change: round_to(slope_change, 6),
        instability_index: round_to(instability, 4),
        trend_class,
        severity_score: round_to(severity, 4),
    })
}

pub fn run_with_outcome(request: &SlopeRequest) -> StageOutcome<SlopeAssessment> {
    guard(Stage::Slope, evaluate(request))
}

pub fn run(request: &SlopeRequest) -> SlopeAssessment {
    run_with_outcome(request).response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(values: Vec<f64>) -> SlopeRequest {
        SlopeRequest {
            asset_id: "P-101".to_string(),
            values,
            ..SlopeRequest::default()
        }
    }

    fn geometric(n: usize, start: f64, rate: f64) -> Vec<f64> {
        (0..n).map(|i| start * (rate * i as f64).exp()).collect()
    }

    #[test]
    fn test_too_few_points_is_default() {
        let result = run(&request(vec![2.0]));
        assert_eq!(result, SlopeAssessment::default());
        assert_eq!(result.trend_class, TrendClass::Stable);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let result = run(&request(vec![2.0; 10]));
        assert_eq!(result.trend_class, TrendClass::Stable);
        assert_eq!(result.slope, 0.0);
        assert_eq!(result.severity_score, 0.0);
        assert_eq!(result.instability_index, 0.0);
    }

    #[test]
    fn test_constant_growth_is_drift() {
        let result = run(&request(geometric(12, 1.0, 0.04)));
        assert_eq!(result.trend_class, TrendClass::Drift);
        assert!((result.slope - 0.04).abs() < 1e-6);
        assert!(result.slope_change.abs() < 1e-6);
        assert!((result.severity_score - 0.32).abs() < 1e-4);
    }

    #[test]
    fn test_accelerating_growth() {
        // log series bends upward: slope ~0.05 early, ~0.12 late
        let values: Vec<f64> = (0..12)
            .map(|i| {
                let x = i as f64;
                (0.02 * x + 0.006 * x * x).exp()
            })
            .collect();
        let result = run(&request(values));
        assert_eq!(result.trend_class, TrendClass::Accelerating);
        assert!(result.slope_change > 0.02);
        assert!(result.severity_score > 0.5);
    }

    #[test]
    fn test_single_jump_is_step() {
        let mut values = vec![1.0; 6];
        values.extend(vec![2.0; 6]);
        let result = run(&request(values));
        assert_eq!(result.trend_class, TrendClass::Step);
        assert_eq!(result.severity_score, 0.8);
    }

    #[test]
    fn test_volatile_flat_series_is_chaotic() {
        // slow log-domain oscillation: wide spread, small consecutive jumps
        let values: Vec<f64> = (0..40)
            .map(|i| (0.5 * (2.0 * std::f64::consts::PI * i as f64 / 10.0).sin()).exp())
            .collect();
        let result = run(&request(values));
        assert_eq!(result.trend_class, TrendClass::Chaotic);
        assert_eq!(result.severity_score, 0.3);
        assert_eq!(result.instability_index, 1.0);
    }

    #[test]
    fn test_non_positive_values_are_floored() {
        let result = run_with_outcome(&request(vec![0.0, -1.0, 0.0, -2.0]));
        assert!(!result.is_fallback());
        assert_eq!(result.response.trend_class, TrendClass::Stable);
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        let outcome = run_with_outcome(&request(vec![1.0, f64::INFINITY, 2.0]));
        assert!(outcome.is_fallback());
        assert_eq!(outcome.response, SlopeAssessment::default());
    }

    #[test]
    fn test_precedence_is_total() {
        assert_eq!(classify(0.0, 0.0, 0.0, 0.6), TrendClass::Step);
        assert_eq!(classify(0.01, 0.0, 0.4, 0.1), TrendClass::Chaotic);
        assert_eq!(classify(0.06, 0.03, 0.4, 0.1), TrendClass::Accelerating);
        assert_eq!(classify(0.06, 0.01, 0.0, 0.1), TrendClass::Drift);
        assert_eq!(classify(0.02, 0.5, 0.0, 0.1), TrendClass::Stable);
    }
}
