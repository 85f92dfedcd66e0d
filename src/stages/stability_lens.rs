//! Stage B++: Stability-Entropy Diagnostic Lens
//!
//! Three entropy components, each normalised to [0, 1]:
//! - SE: spectral entropy of the H (and V, worst of the two) power spectrum
//! - TE: temporal entropy of a 50-bin amplitude histogram of H
//! - DE: directional entropy of the H/V/A energy split
//!
//! SI = 1 − (0.5·SE + 0.3·TE + 0.2·DE). States follow a fixed rule
//! precedence SR05, SR04, SR03, SR02, SR01; values that satisfy none of them
//! stay Stable with no rule recorded.

use tracing::debug;

use super::{guard, Stage, StageOutcome};
use crate::config::defaults::{
    SEDL_WEIGHT_DE, SEDL_WEIGHT_SE, SEDL_WEIGHT_TE, TEMPORAL_HISTOGRAM_BINS,
};
use crate::processing::{
    clamp01, histogram, normalized_shannon, round_to, spectral_entropy, ProcessingError,
};
use crate::types::{
    AxisSpectra, EntropyMetrics, SeverityLevel, StabilityAssessment, StabilityRequest,
    StabilityState,
};

/// Samples an axis needs before its spectrum is used.
const MIN_SPECTRAL_SAMPLES: usize = 4;
/// Samples H needs before its histogram is used.
const MIN_TEMPORAL_SAMPLES: usize = 10;

/// Histogram entropy of the amplitude distribution; 0 for short series.
pub fn temporal_entropy(values: &[f64]) -> f64 {
    if values.len() <= MIN_TEMPORAL_SAMPLES {
        return 0.0;
    }
    let counts: Vec<f64> = histogram(values, TEMPORAL_HISTOGRAM_BINS)
        .into_iter()
        .map(|c| c as f64)
        .collect();
    normalized_shannon(&counts)
}

/// Entropy of the H/V/A energy split, normalised by ln 3.
pub fn directional_entropy(energies: [f64; 3]) -> f64 {
    let total: f64 = energies.iter().sum();
    if total < 1e-12 {
        return 0.0;
    }
    let probs: Vec<f64> = energies
        .iter()
        .map(|e| e / total)
        .filter(|p| *p > 0.0)
        .collect();
    if probs.len() < 2 {
        return 0.0;
    }
    let h: f64 = -probs.iter().map(|p| p * p.ln()).sum::<f64>();
    h / 3f64.ln()
}

fn energy(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Entropy components computed from raw per-axis series. The rate term
/// needs history and is left at 0.
pub fn entropy_from_spectra(spectra: &AxisSpectra) -> Result<EntropyMetrics, ProcessingError> {
    let axes = [&spectra.h, &spectra.v, &spectra.a];
    if axes.iter().any(|axis| axis.iter().any(|v| !v.is_finite())) {
        return Err(ProcessingError::NonFinite("axis spectra"));
    }

    let mut se = 0.0_f64;
    if spectra.h.len() > MIN_SPECTRAL_SAMPLES {
        se = spectral_entropy(&spectra.h)?;
    }
    if spectra.v.len() > MIN_SPECTRAL_SAMPLES {
        se = se.max(spectral_entropy(&spectra.v)?);
    }

    Ok(EntropyMetrics {
        se,
        te: temporal_entropy(&spectra.h),
        de: directional_entropy([energy(&spectra.h), energy(&spectra.v), energy(&spectra.a)]),
        dse_dt: 0.0,
    })
}

pub fn stability_index(se: f64, te: f64, de: f64) -> f64 {
    clamp01(1.0 - (SEDL_WEIGHT_SE * se + SEDL_WEIGHT_TE * te + SEDL_WEIGHT_DE * de))
}

/// State, severity and the rule that produced them.
pub fn classify(
    m: &EntropyMetrics,
    si: f64,
) -> (StabilityState, SeverityLevel, Option<&'static str>) {
    if si <= 0.40 {
        (StabilityState::CriticalInstability, SeverityLevel::Alarm, Some("SR05"))
    } else if m.se >= 0.65 && (m.te >= 0.60 || m.de >= 0.60) {
        (StabilityState::Chaotic, SeverityLevel::Warning, Some("SR04"))
    } else if m.dse_dt >= 0.02 && si < 0.60 {
        (StabilityState::Destabilizing, SeverityLevel::Warning, Some("SR03"))
    } else if m.se > 0.35 && m.se < 0.65 && m.dse_dt < 0.02 {
        (StabilityState::Drifting, SeverityLevel::Watch, Some("SR02"))
    } else if m.se <= 0.35 && m.te < 0.50 && si >= 0.70 {
        (StabilityState::Stable, SeverityLevel::Normal, Some("SR01"))
    } else {
        (StabilityState::Stable, SeverityLevel::Normal, None)
    }
}

pub fn evaluate(request: &StabilityRequest) -> Result<StabilityAssessment, ProcessingError> {
    let metrics = match (&request.metrics, &request.spectra) {
        (Some(given), _) => {
            if [given.se, given.te, given.de, given.dse_dt]
                .iter()
                .any(|v| !v.is_finite())
            {
                return Err(ProcessingError::NonFinite("entropy metrics"));
            }
            *given
        }
        (None, Some(spectra)) => entropy_from_spectra(spectra)?,
        (None, None) => EntropyMetrics::default(),
    };

    let si = stability_index(metrics.se, metrics.te, metrics.de);
    let (stability_state, severity_level, rule) = classify(&metrics, si);

    debug!(
        asset_id = %request.asset_id,
        se = metrics.se,
        te = metrics.te,
        de = metrics.de,
        si = si,
        state = ?stability_state,
        "Stability lens evaluated"
    );

    Ok(StabilityAssessment {
        se: round_to(metrics.se, 4),
        te: round_to(metrics.te, 4),
        de: round_to(metrics.de, 4),
        dse_dt: round_to(metrics.dse_dt, 4),
        si: round_to(si, 4),
        stability_state,
        severity_level,
        triggered_rules: rule.map(str::to_string).into_iter().collect(),
    })
}

pub fn run_with_outcome(request: &StabilityRequest) -> StageOutcome<StabilityAssessment> {
    guard(Stage::Stability, evaluate(request))
}

pub fn run(request: &StabilityRequest) -> StabilityAssessment {
    run_with_outcome(request).response
}
