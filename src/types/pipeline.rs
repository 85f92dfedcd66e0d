//! Orchestrator records: the composite request, the per-stage trace and the
//! final recommendation.

use serde::{Deserialize, Serialize};

use super::{
    decision::default_criticality, default_schema_version, ContextInput, FusionResult,
    HealthAssessment, HealthStage, InitiatorReport, MaintenancePlan, QualityAssessment,
    ReliabilityMetrics, ReliabilityProjection, SeverityLevel, SignalInput, SlopeAssessment,
    StabilityAssessment, TrendFeatures,
};

/// Raw secondary-axis waveforms, when the sensor is triaxial.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecondaryAxes {
    #[serde(rename = "V")]
    pub v: Option<Vec<f64>>,
    #[serde(rename = "A")]
    pub a: Option<Vec<f64>>,
}

/// Single request that drives the whole nine-stage pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisRequest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub timestamp_utc: String,
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    #[serde(default = "default_system_type")]
    pub system_type: String,
    pub signal: SignalInput,
    #[serde(default)]
    pub context: Option<ContextInput>,
    /// Component family for initiator matching and Weibull lookup.
    #[serde(default = "default_component")]
    pub component: String,
    #[serde(default)]
    pub historical_timestamps: Option<Vec<String>>,
    #[serde(default)]
    pub historical_values: Option<Vec<f64>>,
    #[serde(default = "default_criticality")]
    pub criticality: f64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: f64,
    #[serde(default)]
    pub secondary_axes: Option<SecondaryAxes>,
    #[serde(default)]
    pub operating_hours: Option<f64>,
}

fn default_machine_type() -> String {
    "generic".to_string()
}

fn default_system_type() -> String {
    "pump_train_horizontal".to_string()
}

fn default_component() -> String {
    "afb".to_string()
}

fn default_failure_threshold() -> f64 {
    8.0
}

impl Default for FullAnalysisRequest {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            trace_id: None,
            asset_id: String::new(),
            timestamp_utc: String::new(),
            machine_type: default_machine_type(),
            system_type: default_system_type(),
            signal: SignalInput::default(),
            context: None,
            component: default_component(),
            historical_timestamps: None,
            historical_values: None,
            criticality: default_criticality(),
            failure_threshold: default_failure_threshold(),
            secondary_axes: None,
            operating_hours: None,
        }
    }
}

/// One response per stage, kept for observability only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineTrace {
    #[serde(rename = "module0")]
    pub data_guard: Option<QualityAssessment>,
    #[serde(rename = "moduleA")]
    pub trend: Option<TrendFeatures>,
    #[serde(rename = "moduleB")]
    pub initiators: Option<InitiatorReport>,
    #[serde(rename = "moduleBplus")]
    pub slope: Option<SlopeAssessment>,
    #[serde(rename = "moduleBpp")]
    pub stability: Option<StabilityAssessment>,
    #[serde(rename = "moduleC")]
    pub fusion: Option<FusionResult>,
    #[serde(rename = "moduleD")]
    pub health: Option<HealthAssessment>,
    #[serde(rename = "moduleE")]
    pub maintenance: Option<MaintenancePlan>,
    #[serde(rename = "moduleF")]
    pub reliability: Option<ReliabilityProjection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisResponse {
    pub schema_version: String,
    pub trace_id: String,
    pub asset_id: String,
    pub final_severity_level: SeverityLevel,
    pub final_severity_score: f64,
    pub confidence: f64,
    pub health_stage: HealthStage,
    pub rul_days: Option<f64>,
    pub risk_index: f64,
    pub recommended_action: String,
    pub recommended_window: String,
    pub reliability_metrics: Option<ReliabilityMetrics>,
    pub module_trace: PipelineTrace,
    pub execution_time_ms: f64,
}
