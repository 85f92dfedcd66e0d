//! Stage 0: Data Guard
//!
//! Pre-flight quality gate. Three hard blocks abort the pipeline; every other
//! rule multiplies an initially perfect quality score by its penalty factor.
//! Reason strings are prefixed with the rule code (`DG_0xx`).

use tracing::debug;

use super::{guard_with, Stage, StageOutcome};
use crate::config::defaults::{
    ACCELERATION_UNITS, CLIP_FRACTION_LIMIT, CLIP_LEVEL, DISPLACEMENT_SAMPLING_RATES,
    DISPLACEMENT_UNITS, FLATLINE_STD_LIMIT, MAGNET_RMS_LIMIT, MIN_SAMPLES, NAN_FRACTION_LIMIT,
    OUTLIER_FRACTION_LIMIT, OUTLIER_Z, PENALTY_CLIP, PENALTY_FLATLINE, PENALTY_MAGNET,
    PENALTY_MISSING_RPM, PENALTY_NAN, PENALTY_OUTLIER, PENALTY_SAMPLING_RATE, PENALTY_SPIKE,
    PENALTY_UNCOMPUTED, SAMPLING_RATES, SPIKE_CREST_LIMIT, SPIKE_KURTOSIS_LIMIT, VELOCITY_UNITS,
};
use crate::processing::{
    self, clean, crest_factor, diff, ensure_finite, excess_kurtosis, gap_fraction, population_std,
    round_to, sample_std, ProcessingError,
};
use crate::types::{
    DataGuardFlags, DataGuardRequest, MountType, QualityAssessment, SignalMetrics, SignalType,
    StatusLevel,
};

/// Clean samples needed before clip and flatline checks apply.
const MIN_CLEAN_FOR_SHAPE: usize = 10;
/// Clean samples needed before the outlier check applies.
const MIN_CLEAN_FOR_OUTLIERS: usize = 30;

pub fn allowed_units(signal_type: SignalType) -> &'static [&'static str] {
    match signal_type {
        SignalType::Velocity => VELOCITY_UNITS,
        SignalType::Acceleration => ACCELERATION_UNITS,
        SignalType::Displacement => DISPLACEMENT_UNITS,
    }
}

pub fn allowed_sampling_rates(signal_type: SignalType) -> &'static [u32] {
    match signal_type {
        SignalType::Velocity | SignalType::Acceleration => SAMPLING_RATES,
        SignalType::Displacement => DISPLACEMENT_SAMPLING_RATES,
    }
}

/// Descriptive statistics over the clean samples.
///
/// Fewer than two clean samples leaves everything but the count and gap
/// fraction at zero.
pub fn compute_metrics(values: &[f64]) -> Result<SignalMetrics, ProcessingError> {
    let sample_count = values.len();
    let nan_fraction = gap_fraction(values);
    let samples = clean(values);

    if samples.len() < 2 {
        return Ok(SignalMetrics {
            sample_count,
            nan_fraction,
            ..SignalMetrics::default()
        });
    }

    let mean = processing::mean(&samples);
    let std = ensure_finite(sample_std(&samples), "standard deviation")?;
    let rms = ensure_finite(processing::rms(&samples), "rms")?;
    let peak = processing::peak(&samples);
    let cf = crest_factor(peak, rms);
    let kurt = ensure_finite(excess_kurtosis(&samples, mean, std), "kurtosis")?;

    let clip_fraction = if samples.len() > MIN_CLEAN_FOR_SHAPE {
        let hi = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let clipped = samples
            .iter()
            .filter(|&&x| x >= CLIP_LEVEL * hi || x <= CLIP_LEVEL * lo)
            .count();
        clipped as f64 / samples.len() as f64
    } else {
        0.0
    };

    Ok(SignalMetrics {
        sample_count,
        nan_fraction,
        std_dev: round_to(std, 6),
        rms: round_to(rms, 6),
        peak: round_to(peak, 6),
        crest_factor: round_to(cf, 4),
        kurtosis: round_to(kurt, 4),
        clip_fraction: round_to(clip_fraction, 6),
    })
}

/// Run every check and score the signal.
pub fn evaluate(request: &DataGuardRequest) -> Result<QualityAssessment, ProcessingError> {
    let signal = &request.signal;
    let values = &signal.values;
    let mut flags = DataGuardFlags::default();
    let mut reasons = Vec::new();

    // Hard blocks
    let mut blocked = false;
    if request.asset_id.is_empty() || request.timestamp_utc.is_empty() {
        blocked = true;
        reasons.push("DG_001: Missing required fields (asset_id or timestamp)".to_string());
    }
    if values.len() < MIN_SAMPLES {
        blocked = true;
        flags.short_signal = true;
        reasons.push(format!(
            "DG_002: Too few samples ({} < {MIN_SAMPLES})",
            values.len()
        ));
    }
    if !allowed_units(signal.signal_type).contains(&signal.unit.as_str()) {
        blocked = true;
        flags.unit_mismatch = true;
        reasons.push(format!(
            "DG_005: Unit '{}' not valid for {}",
            signal.unit,
            signal.signal_type.as_str()
        ));
    }

    if blocked {
        let metrics = if values.len() >= 2 {
            compute_metrics(values).unwrap_or_default()
        } else {
            SignalMetrics::default()
        };
        debug!(asset_id = %request.asset_id, reasons = ?reasons, "Data guard blocked signal");
        return Ok(QualityAssessment {
            trace_id: request.trace_id.clone(),
            status: StatusLevel::Block,
            block: true,
            quality_score: 0.0,
            flags,
            reasons,
            metrics,
            confidence_modifier: 0.0,
        });
    }

    let metrics = compute_metrics(values)?;
    let samples = clean(values);
    let mut penalties: Vec<f64> = Vec::new();

    if metrics.nan_fraction > NAN_FRACTION_LIMIT {
        flags.nan_present = true;
        penalties.push(PENALTY_NAN);
        reasons.push(format!(
            "DG_003: NaN fraction {:.3} > {NAN_FRACTION_LIMIT}",
            metrics.nan_fraction
        ));
    }

    if metrics.clip_fraction > CLIP_FRACTION_LIMIT {
        flags.clipping_detected = true;
        penalties.push(PENALTY_CLIP);
        reasons.push(format!(
            "DG_004: Clipping fraction {:.3} > {CLIP_FRACTION_LIMIT}",
            metrics.clip_fraction
        ));
    }

    if !allowed_sampling_rates(signal.signal_type).contains(&signal.sampling_rate_hz) {
        flags.sampling_rate_suspect = true;
        penalties.push(PENALTY_SAMPLING_RATE);
        reasons.push(format!(
            "DG_006: Sampling rate {} Hz suspect",
            signal.sampling_rate_hz
        ));
    }

    if samples.len() > MIN_CLEAN_FOR_SHAPE && population_std(&diff(&samples)) < FLATLINE_STD_LIMIT
    {
        flags.flatline = true;
        penalties.push(PENALTY_FLATLINE);
        reasons.push("DG_007: Flatline detected (std of diff < 1e-6)".to_string());
    }

    if samples.len() > MIN_CLEAN_FOR_OUTLIERS && metrics.std_dev > FLATLINE_STD_LIMIT {
        let mean = processing::mean(&samples);
        let outliers = samples
            .iter()
            .filter(|&&x| ((x - mean) / metrics.std_dev).abs() > OUTLIER_Z)
            .count();
        let fraction = outliers as f64 / samples.len() as f64;
        if fraction > OUTLIER_FRACTION_LIMIT {
            flags.outlier_burst = true;
            penalties.push(PENALTY_OUTLIER);
            reasons.push(format!(
                "DG_009: Outlier burst fraction {fraction:.3} > {OUTLIER_FRACTION_LIMIT}"
            ));
        }
    }

    if metrics.kurtosis > SPIKE_KURTOSIS_LIMIT || metrics.crest_factor > SPIKE_CREST_LIMIT {
        flags.spike_burst = true;
        penalties.push(PENALTY_SPIKE);
        reasons.push(format!(
            "DG_010: Spike burst (kurtosis={:.2}, CF={:.2})",
            metrics.kurtosis, metrics.crest_factor
        ));
    }

    if let Some(context) = &request.context {
        if context.rpm.is_none() {
            penalties.push(PENALTY_MISSING_RPM);
            reasons.push("DG_013: RPM missing, reduced feature set".to_string());
        }
        if context.mount_type == Some(MountType::Magnet) && metrics.rms > MAGNET_RMS_LIMIT {
            penalties.push(PENALTY_MAGNET);
            reasons.push("DG_016: Magnet mount may slip at high RMS".to_string());
        }
    }

    let quality = penalties.iter().product::<f64>().clamp(0.0, 1.0);
    let status = StatusLevel::from_quality(quality);

    debug!(
        asset_id = %request.asset_id,
        quality = quality,
        penalties = penalties.len(),
        "Data guard scored signal"
    );

    Ok(QualityAssessment {
        trace_id: request.trace_id.clone(),
        status,
        block: false,
        quality_score: round_to(quality, 4),
        flags,
        reasons,
        metrics,
        confidence_modifier: round_to(quality, 4),
    })
}

/// Verdict when the statistics themselves cannot be computed.
///
/// Not a block: the signal passed every hard gate, so it only carries a
/// quality penalty and zeroed metrics.
pub fn uncomputed(request: &DataGuardRequest) -> QualityAssessment {
    let quality = PENALTY_UNCOMPUTED;
    QualityAssessment {
        trace_id: request.trace_id.clone(),
        status: StatusLevel::from_quality(quality),
        block: false,
        quality_score: quality,
        flags: DataGuardFlags::default(),
        reasons: vec!["Signal statistics could not be computed".to_string()],
        metrics: SignalMetrics {
            sample_count: request.signal.values.len(),
            nan_fraction: round_to(gap_fraction(&request.signal.values), 6),
            ..SignalMetrics::default()
        },
        confidence_modifier: quality,
    }
}

pub fn run_with_outcome(request: &DataGuardRequest) -> StageOutcome<QualityAssessment> {
    guard_with(Stage::DataGuard, evaluate(request), || uncomputed(request))
}

pub fn run(request: &DataGuardRequest) -> QualityAssessment {
    run_with_outcome(request).response
}
