//! System-wide default constants.
//!
//! Grouped by stage for easy discovery. Table-shaped defaults (weight
//! profiles, action catalog, diagnosis map) live in `rules::catalog`.

// ============================================================================
// Shared classification boundaries
// ============================================================================

/// Severity bucket lower bounds (half-open intervals).
pub const SEVERITY_WATCH: f64 = 0.30;
pub const SEVERITY_WARNING: f64 = 0.50;
pub const SEVERITY_ALARM: f64 = 0.80;

/// SSI lower bounds for degrading / unstable / critical.
pub const SSI_DEGRADING: f64 = 0.30;
pub const SSI_UNSTABLE: f64 = 0.60;
pub const SSI_CRITICAL: f64 = 0.80;

/// Guard used for divisions and log floors.
pub const EPSILON: f64 = 1e-9;

// ============================================================================
// Stage 0: Data Guard
// ============================================================================

/// Hard block below this many samples.
pub const MIN_SAMPLES: usize = 256;

pub const NAN_FRACTION_LIMIT: f64 = 0.01;
pub const CLIP_FRACTION_LIMIT: f64 = 0.01;
/// Samples within this fraction of the extreme count as clipped.
pub const CLIP_LEVEL: f64 = 0.999;
pub const FLATLINE_STD_LIMIT: f64 = 1e-6;
pub const OUTLIER_Z: f64 = 3.0;
pub const OUTLIER_FRACTION_LIMIT: f64 = 0.02;
pub const SPIKE_KURTOSIS_LIMIT: f64 = 8.0;
pub const SPIKE_CREST_LIMIT: f64 = 6.0;
/// RMS above which a magnet mount is suspected of rocking.
pub const MAGNET_RMS_LIMIT: f64 = 10.0;

pub const PENALTY_NAN: f64 = 0.6;
pub const PENALTY_CLIP: f64 = 0.5;
pub const PENALTY_SAMPLING_RATE: f64 = 0.7;
pub const PENALTY_FLATLINE: f64 = 0.4;
pub const PENALTY_OUTLIER: f64 = 0.9;
pub const PENALTY_SPIKE: f64 = 0.6;
pub const PENALTY_MISSING_RPM: f64 = 0.85;
pub const PENALTY_MAGNET: f64 = 0.8;
/// Applied when the statistics overflow and no other check can run.
pub const PENALTY_UNCOMPUTED: f64 = 0.5;

pub const VELOCITY_UNITS: &[&str] = &["mm/s", "inch/s", "in/s"];
pub const ACCELERATION_UNITS: &[&str] = &["g", "m/s²", "m/s2"];
pub const DISPLACEMENT_UNITS: &[&str] = &["µm", "um", "mm", "mil"];

pub const SAMPLING_RATES: &[u32] = &[256, 512, 1024, 2048, 2560, 5120, 6400, 10240, 25600, 51200];
pub const DISPLACEMENT_SAMPLING_RATES: &[u32] = &[256, 512, 1024, 2048, 2560, 5120, 6400];

// ============================================================================
// Stage A: Trend Engine
// ============================================================================

pub const TREND_SEVERITY_MULTIPLIER: f64 = 10.0;
/// Slope normalisation span (samples).
pub const TREND_SLOPE_SPAN: usize = 1000;
pub const TREND_MIN_SLOPE_SAMPLES: usize = 4;
pub const LOGISTIC_CLAMP: f64 = 20.0;
pub const VARIANCE_CHAOTIC_PCT: f64 = 60.0;
pub const VARIANCE_PROCESS_PCT: f64 = 40.0;
pub const CHAOTIC_SLOPE_MAX: f64 = 0.05;

/// (ratio, severity floor) pairs, checked high to low.
pub const BASELINE_RATIO_FLOORS: &[(f64, f64)] = &[(2.0, 0.9), (1.5, 0.7), (1.2, 0.4)];

// ============================================================================
// Stage B+: Slope Intelligence
// ============================================================================

pub const STEP_JUMP: f64 = 0.5;
pub const CHAOTIC_VOLATILITY: f64 = 0.3;
pub const CHAOTIC_SLOPE_LIMIT: f64 = 0.02;
pub const ACCEL_SLOPE: f64 = 0.05;
pub const ACCEL_CHANGE: f64 = 0.02;
pub const DRIFT_SLOPE: f64 = 0.02;
pub const NLI_MULTIPLIER: f64 = 5.0;

// ============================================================================
// Stage B++: Stability Lens
// ============================================================================

pub const SEDL_WEIGHT_SE: f64 = 0.5;
pub const SEDL_WEIGHT_TE: f64 = 0.3;
pub const SEDL_WEIGHT_DE: f64 = 0.2;
pub const TEMPORAL_HISTOGRAM_BINS: usize = 50;

// ============================================================================
// Stage C: Fusion
// ============================================================================

/// SSI floor applied under critical instability.
pub const INSTABILITY_SSI_FLOOR: f64 = 0.70;
pub const PROCESS_CORRELATION_LIMIT: f64 = 0.70;
pub const TOP_CONTRIBUTORS: usize = 3;

// ============================================================================
// Stage D: Health Stage
// ============================================================================

pub const ESCALATION_UNSTABLE_SLOPE: f64 = 0.05;
pub const ESCALATION_DEGRADING_SLOPE: f64 = 0.02;
pub const DEGRADING_FAST_SLOPE: f64 = 0.03;

// ============================================================================
// Stage E: Maintenance Plan
// ============================================================================

pub const W_SEVERITY: f64 = 0.45;
pub const W_CONFIDENCE: f64 = 0.25;
pub const W_CRITICALITY: f64 = 0.20;
pub const W_URGENCY: f64 = 0.10;
pub const SAFETY_MULTIPLIER: f64 = 1.5;
pub const SPARES_PENALTY: f64 = 0.7;
pub const MANPOWER_PENALTY: f64 = 0.7;
pub const PRIORITY_IMMEDIATE: f64 = 85.0;
pub const PRIORITY_24H: f64 = 70.0;
pub const PRIORITY_7D: f64 = 50.0;

pub const CONFIRMATION_ACTION: &str = "ACT001";
pub const SHUTDOWN_ACTION: &str = "ACT008";

// ============================================================================
// Stage F: Reliability
// ============================================================================

pub const RUL_CAP_DAYS: f64 = 3650.0;
pub const ACCELERATION_CHANGE: f64 = 0.01;
pub const NLI_ADJUST_LIMIT: f64 = 0.6;
pub const WEIBULL_ALPHA_SEVERITY: f64 = 0.8;
pub const WEIBULL_GAMMA_DEGRADATION: f64 = 0.6;
pub const WEIBULL_R_TARGET: f64 = 0.90;
pub const WEIBULL_ETA_FLOOR_HOURS: f64 = 100.0;
/// 30 days in hours.
pub const WEIBULL_HORIZON_HOURS: f64 = 720.0;

// ============================================================================
// Orchestrator
// ============================================================================

/// V and A proxies when only the horizontal axis was measured.
pub const V_FROM_H: f64 = 0.85;
pub const A_FROM_H: f64 = 0.60;

pub const DEFAULT_WORKER_THREADS: usize = 4;
pub const DEFAULT_SPECTRUM_WINDOW: usize = 256;
pub const MIN_SPECTRUM_WINDOW: usize = 16;
