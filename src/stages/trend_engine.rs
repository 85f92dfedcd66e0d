//! Stage A: Trend Engine
//!
//! Feature extraction and a first severity estimate from one waveform. The
//! slope term is the least-squares slope over the clean samples scaled to a
//! per-1000-sample span; a positive baseline adds a degradation term and
//! ratio floors.

use tracing::debug;

use super::{guard_with, Stage, StageOutcome};
use crate::config::defaults::{
    BASELINE_RATIO_FLOORS, CHAOTIC_SLOPE_MAX, LOGISTIC_CLAMP, TREND_MIN_SLOPE_SAMPLES,
    TREND_SEVERITY_MULTIPLIER, TREND_SLOPE_SPAN, VARIANCE_CHAOTIC_PCT, VARIANCE_PROCESS_PCT,
};
use crate::processing::{
    self, clamp01, clean, crest_factor, ensure_finite, excess_kurtosis, linear_fit, round_to,
    sample_std, ProcessingError,
};
use crate::types::{SeverityLevel, TrendFeatures, TrendRequest};

const TINY: f64 = 1e-12;

fn logistic(x: f64) -> f64 {
    let x = x.clamp(-LOGISTIC_CLAMP, LOGISTIC_CLAMP);
    1.0 / (1.0 + (-x).exp())
}

pub fn evaluate(request: &TrendRequest) -> Result<TrendFeatures, ProcessingError> {
    let samples = clean(&request.values);
    if samples.len() < 2 {
        return Ok(TrendFeatures::default());
    }

    let rms = ensure_finite(processing::rms(&samples), "rms")?;
    let peak = processing::peak(&samples);
    let mean = ensure_finite(processing::mean(&samples), "mean")?;
    let std = ensure_finite(sample_std(&samples), "standard deviation")?;
    let cf = crest_factor(peak, rms);
    let kurt = ensure_finite(excess_kurtosis(&samples, mean, std), "kurtosis")?;

    let (ratio, degradation) = match request.baseline {
        Some(baseline) if baseline > TINY => (Some(rms / baseline), (rms - baseline) / baseline),
        _ => (None, 0.0),
    };

    let slope = if samples.len() >= TREND_MIN_SLOPE_SAMPLES {
        let span = samples.len().min(TREND_SLOPE_SPAN) as f64;
        linear_fit(&samples)?.slope * span
    } else {
        0.0
    };

    let mut severity = clamp01(slope.abs() * TREND_SEVERITY_MULTIPLIER);
    if degradation > 0.0 {
        severity = severity.max(logistic(degradation * slope.abs() * 5.0));
    }
    severity = severity.min(1.0);

    if let Some(ratio) = ratio {
        if let Some((_, floor)) = BASELINE_RATIO_FLOORS.iter().find(|(r, _)| ratio >= *r) {
            severity = severity.max(*floor);
        }
    }

    let variance_pct = if mean > TINY { std / mean * 100.0 } else { 0.0 };
    let classification = if variance_pct > VARIANCE_CHAOTIC_PCT && slope.abs() < CHAOTIC_SLOPE_MAX
    {
        // process noise, not a machine fault
        severity = 0.0;
        "chaotic"
    } else if variance_pct > VARIANCE_PROCESS_PCT {
        "process"
    } else {
        "machine"
    };

    debug!(
        asset_id = %request.asset_id,
        rms = rms,
        slope = slope,
        severity = severity,
        classification,
        "Trend features extracted"
    );

    Ok(TrendFeatures {
        overall_rms: round_to(rms, 6),
        peak: round_to(peak, 6),
        kurtosis: round_to(kurt, 4),
        crest_factor: round_to(cf, 4),
        baseline: request.baseline,
        ratio_to_baseline: ratio.map(|r| round_to(r, 4)),
        degradation: round_to(degradation, 6),
        severity_score: round_to(severity, 4),
        severity_level: SeverityLevel::from_score(severity),
        trend_classification: classification.to_string(),
        rule_ids_triggered: Vec::new(),
    })
}

fn failed() -> TrendFeatures {
    TrendFeatures {
        trend_classification: "error".to_string(),
        ..TrendFeatures::default()
    }
}

pub fn run_with_outcome(request: &TrendRequest) -> StageOutcome<TrendFeatures> {
    guard_with(Stage::Trend, evaluate(request), failed)
}

pub fn run(request: &TrendRequest) -> TrendFeatures {
    run_with_outcome(request).response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(values: Vec<f64>, baseline: Option<f64>) -> TrendRequest {
        TrendRequest {
            asset_id: "P-101".to_string(),
            values,
            baseline,
            ..TrendRequest::default()
        }
    }

    fn alternating(n: usize, low: f64, high: f64) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { low } else { high }).collect()
    }

    #[test]
    fn test_degenerate_input_is_unknown() {
        let result = run(&request(vec![f64::NAN, 1.0], None));
        assert_eq!(result.trend_classification, "unknown");
        assert_eq!(result.severity_score, 0.0);
        assert_eq!(result.severity_level, SeverityLevel::Normal);
    }

    #[test]
    fn test_ramp_saturates_severity() {
        let values: Vec<f64> = (0..500).map(|i| 1.0 + 0.001 * i as f64).collect();
        let result = run(&request(values, None));
        assert_eq!(result.trend_classification, "machine");
        assert_eq!(result.severity_score, 1.0);
        assert_eq!(result.severity_level, SeverityLevel::Alarm);
        assert!(result.ratio_to_baseline.is_none());
    }

    #[test]
    fn test_baseline_ratio_floor() {
        let values: Vec<f64> = alternating(400, 4.9, 5.1);
        let result = run(&request(values, Some(2.0)));
        let ratio = result.ratio_to_baseline.unwrap();
        assert!(ratio > 2.0);
        assert!(result.degradation > 1.0);
        assert!(result.severity_score >= 0.9);
        assert_eq!(result.severity_level, SeverityLevel::Alarm);
    }

    #[test]
    fn test_non_positive_baseline_is_ignored() {
        let result = run(&request(alternating(400, 4.9, 5.1), Some(0.0)));
        assert!(result.ratio_to_baseline.is_none());
        assert_eq!(result.degradation, 0.0);
        assert_eq!(result.baseline, Some(0.0));
    }

    #[test]
    fn test_chaotic_variability_suppresses_severity() {
        let result = run(&request(alternating(400, 0.1, 3.0), Some(0.5)));
        assert_eq!(result.trend_classification, "chaotic");
        assert_eq!(result.severity_score, 0.0);
        assert_eq!(result.severity_level, SeverityLevel::Normal);
    }

    #[test]
    fn test_process_band() {
        let result = run(&request(alternating(400, 0.5, 1.5), None));
        assert_eq!(result.trend_classification, "process");
        assert!(result.severity_score < 0.3);
    }

    #[test]
    fn test_numeric_failure_returns_error_tag() {
        let outcome = run_with_outcome(&request(vec![1e200, -1e200, 1e200, 3.0], None));
        assert!(outcome.is_fallback());
        assert_eq!(outcome.response.trend_classification, "error");
        assert_eq!(outcome.response.severity_score, 0.0);
    }

    #[test]
    fn test_logistic_is_clamped() {
        assert!((logistic(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(logistic(1e6), logistic(LOGISTIC_CLAMP));
    }
}
