//! Stage 0 through B++ records: quality gate, trend features and the three
//! parallel analysis branches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    default_schema_version, ContextInput, Direction, SeverityLevel, SignalInput, SignalMetrics,
    SignalType, StabilityState, StatusLevel, TrendClass,
};

// ============================================================================
// Stage 0: Data Guard
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataGuardRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub timestamp_utc: String,
    pub signal: SignalInput,
    #[serde(default)]
    pub context: Option<ContextInput>,
}

/// One boolean per detection rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DataGuardFlags {
    pub flatline: bool,
    pub nan_present: bool,
    pub clipping_detected: bool,
    pub dropout_detected: bool,
    pub unit_mismatch: bool,
    pub sampling_rate_suspect: bool,
    pub short_signal: bool,
    pub frequency_invalid: bool,
    pub timestamp_gap: bool,
    pub outlier_burst: bool,
    pub spike_burst: bool,
}

/// Data guard verdict: quality score in [0, 1] plus the reasons behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    #[serde(default)]
    pub trace_id: Option<String>,
    pub status: StatusLevel,
    pub block: bool,
    pub quality_score: f64,
    pub flags: DataGuardFlags,
    pub reasons: Vec<String>,
    pub metrics: SignalMetrics,
    pub confidence_modifier: f64,
}

impl Default for QualityAssessment {
    fn default() -> Self {
        Self {
            trace_id: None,
            status: StatusLevel::Pass,
            block: false,
            quality_score: 1.0,
            flags: DataGuardFlags::default(),
            reasons: Vec::new(),
            metrics: SignalMetrics::default(),
            confidence_modifier: 1.0,
        }
    }
}

// ============================================================================
// Stage A: Trend Engine
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRequest {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    #[serde(default)]
    pub signal_type: SignalType,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate_hz: u32,
    #[serde(deserialize_with = "super::signal::samples_with_gaps")]
    pub values: Vec<f64>,
    #[serde(default)]
    pub baseline: Option<f64>,
    #[serde(default)]
    pub context: Option<ContextInput>,
}

fn default_machine_type() -> String {
    "generic".to_string()
}

fn default_sampling_rate() -> u32 {
    6400
}

impl Default for TrendRequest {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            machine_type: default_machine_type(),
            signal_type: SignalType::Velocity,
            direction: Direction::H,
            sampling_rate_hz: default_sampling_rate(),
            values: Vec::new(),
            baseline: None,
            context: None,
        }
    }
}

/// Feature vector and severity derived from one waveform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendFeatures {
    pub overall_rms: f64,
    pub peak: f64,
    pub kurtosis: f64,
    pub crest_factor: f64,
    pub baseline: Option<f64>,
    pub ratio_to_baseline: Option<f64>,
    pub degradation: f64,
    pub severity_score: f64,
    pub severity_level: SeverityLevel,
    /// machine / process / chaotic, or unknown / error for degenerate runs
    pub trend_classification: String,
    #[serde(default)]
    pub rule_ids_triggered: Vec<String>,
}

impl Default for TrendFeatures {
    fn default() -> Self {
        Self {
            overall_rms: 0.0,
            peak: 0.0,
            kurtosis: 0.0,
            crest_factor: 0.0,
            baseline: None,
            ratio_to_baseline: None,
            degradation: 0.0,
            severity_score: 0.0,
            severity_level: SeverityLevel::Normal,
            trend_classification: "unknown".to_string(),
            rule_ids_triggered: Vec::new(),
        }
    }
}

// ============================================================================
// Stage B: Initiator Rules
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InitiatorRequest {
    #[serde(default)]
    pub asset_id: String,
    /// Component family key: afb, journal, tpjb, coupling, ac_motor, ...
    pub component: String,
    /// Raw channel magnitudes and supplementary metrics (H, V, A, kurtosis,
    /// crest_factor, temperature).
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// Comparison operator used by rule conditions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Comparison {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "==")]
    Eq,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Ge => value >= threshold,
            Comparison::Le => value <= threshold,
            Comparison::Gt => value > threshold,
            Comparison::Lt => value < threshold,
            Comparison::Eq => (value - threshold).abs() < 1e-9,
        }
    }
}

/// A condition that held for a matched rule, with the observed value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggeredCondition {
    pub expr: String,
    pub op: Comparison,
    pub threshold: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitiatorMatch {
    pub rule_id: String,
    pub initiator: String,
    pub diagnosis: String,
    pub score: f64,
    pub triggered_conditions: Vec<TriggeredCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InitiatorReport {
    pub component: String,
    pub num_matches: usize,
    pub matched_rules: Vec<InitiatorMatch>,
    /// Highest base severity across matches (0 when nothing matched).
    pub confidence: f64,
}

// ============================================================================
// Stage B+: Slope Intelligence
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlopeRequest {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default = "default_parameter")]
    pub parameter: String,
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default = "default_window_points")]
    pub window_n_points: usize,
    #[serde(default)]
    pub context: Option<ContextInput>,
}

fn default_parameter() -> String {
    "overall_rms_velocity".to_string()
}

fn default_window_points() -> usize {
    3
}

impl Default for SlopeRequest {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            parameter: default_parameter(),
            timestamps: Vec::new(),
            values: Vec::new(),
            window_n_points: default_window_points(),
            context: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SlopeAssessment {
    /// Log-domain least-squares slope per sample step.
    pub slope: f64,
    /// Second-half slope minus first-half slope.
    pub slope_change: f64,
    /// NLI, residual volatility scaled into [0, 1].
    pub instability_index: f64,
    pub trend_class: TrendClass,
    pub severity_score: f64,
}

// ============================================================================
// Stage B++: Stability-Entropy Diagnostic Lens
// ============================================================================

/// Pre-computed entropy components.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EntropyMetrics {
    #[serde(rename = "SE")]
    pub se: f64,
    #[serde(rename = "TE")]
    pub te: f64,
    #[serde(rename = "DE")]
    pub de: f64,
    #[serde(rename = "dSE_dt")]
    pub dse_dt: f64,
}

/// Raw per-axis series for entropy computation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AxisSpectra {
    #[serde(rename = "H")]
    pub h: Vec<f64>,
    #[serde(rename = "V")]
    pub v: Vec<f64>,
    #[serde(rename = "A")]
    pub a: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityRequest {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub metrics: Option<EntropyMetrics>,
    #[serde(default)]
    pub spectra: Option<AxisSpectra>,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_window_days() -> u32 {
    7
}

impl Default for StabilityRequest {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            metrics: None,
            spectra: None,
            window_days: default_window_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StabilityAssessment {
    #[serde(rename = "SE")]
    pub se: f64,
    #[serde(rename = "TE")]
    pub te: f64,
    #[serde(rename = "DE")]
    pub de: f64,
    #[serde(rename = "dSE_dt")]
    pub dse_dt: f64,
    /// Composite stability index; 1.0 is fully ordered.
    #[serde(rename = "SI")]
    pub si: f64,
    pub stability_state: StabilityState,
    pub severity_level: SeverityLevel,
    pub triggered_rules: Vec<String>,
}

impl Default for StabilityAssessment {
    fn default() -> Self {
        Self {
            se: 0.0,
            te: 0.0,
            de: 0.0,
            dse_dt: 0.0,
            si: 1.0,
            stability_state: StabilityState::Stable,
            severity_level: SeverityLevel::Normal,
            triggered_rules: Vec::new(),
        }
    }
}
