//! Stage C through F records: fusion, health stage, maintenance plan and
//! reliability projection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    BathtubPhase, EscalationLevel, HealthStage, StabilityState, SystemState, TrendClass,
};

// ============================================================================
// Stage C: Fusion
// ============================================================================

/// Per-block evidence collected from the three analysis branches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BlockInput {
    #[serde(rename = "B_match_score")]
    pub match_score: f64,
    #[serde(rename = "Bplus_trend_class")]
    pub trend_class: TrendClass,
    #[serde(rename = "Bplus_confidence")]
    pub trend_confidence: f64,
    pub process_correlation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FusionRequest {
    /// Named weight profile key: pump_train_horizontal, gearbox_train, fan_train
    pub system_type: String,
    #[serde(default)]
    pub profile_id: Option<String>,
    /// Block name to evidence. Ordered so contributor ties resolve by name.
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockInput>,
    /// Entropy-lens state used for the instability gate.
    #[serde(default)]
    pub stability_state: Option<StabilityState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusionResult {
    pub system_type: String,
    pub profile_id: String,
    /// System Stability Index in [0, 1].
    #[serde(rename = "SSI")]
    pub ssi: f64,
    pub system_state: SystemState,
    pub top_contributors: Vec<String>,
    pub recommended_action: String,
}

impl Default for FusionResult {
    fn default() -> Self {
        Self {
            system_type: String::new(),
            profile_id: String::new(),
            ssi: 0.0,
            system_state: SystemState::Stable,
            top_contributors: Vec::new(),
            recommended_action: SystemState::Stable.action().to_string(),
        }
    }
}

// ============================================================================
// Stage D: Health Stage
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HealthRequest {
    #[serde(rename = "SSI")]
    pub ssi: f64,
    #[serde(rename = "SSI_slope", default)]
    pub ssi_slope: f64,
    #[serde(default)]
    pub system_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthAssessment {
    pub degradation_stage: HealthStage,
    pub rul_band: String,
    pub escalation_level: EscalationLevel,
    pub recommended_action: String,
}

impl Default for HealthAssessment {
    fn default() -> Self {
        Self {
            degradation_stage: HealthStage::Healthy,
            rul_band: "> 6 months".to_string(),
            escalation_level: EscalationLevel::Level0,
            recommended_action: "Continue monitoring".to_string(),
        }
    }
}

// ============================================================================
// Stage E: Maintenance Plan
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default = "default_severity")]
    pub severity_score: f64,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_criticality")]
    pub criticality: f64,
    #[serde(default = "default_urgency")]
    pub urgency: f64,
    #[serde(default)]
    pub safety_flag: bool,
    #[serde(default = "ready")]
    pub spares_ready: bool,
    #[serde(default = "ready")]
    pub manpower_ready: bool,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
}

fn default_severity() -> f64 {
    0.5
}

fn default_confidence() -> f64 {
    0.7
}

pub(crate) fn default_criticality() -> f64 {
    0.6
}

fn default_urgency() -> f64 {
    0.5
}

fn ready() -> bool {
    true
}

impl Default for MaintenanceRequest {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            severity_score: default_severity(),
            confidence: default_confidence(),
            criticality: default_criticality(),
            urgency: default_urgency(),
            safety_flag: false,
            spares_ready: true,
            manpower_ready: true,
            diagnosis: None,
            component: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    pub rank: usize,
    pub priority_score: f64,
    pub window: String,
    pub action_id: String,
    pub action_title: String,
    pub justification: String,
    pub verification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MaintenancePlan {
    pub plan_items: Vec<PlanItem>,
    pub total_actions: usize,
}

// ============================================================================
// Stage F: Reliability Projection
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityRequest {
    #[serde(default)]
    pub asset_id: String,
    pub severity_score: f64,
    pub confidence: f64,
    pub slope_log: f64,
    #[serde(default)]
    pub slope_change: f64,
    #[serde(rename = "instability_index_NLI", default)]
    pub instability_index: f64,
    #[serde(default = "default_criticality")]
    pub criticality: f64,
    pub current_value: f64,
    pub failure_threshold: f64,
    #[serde(default = "default_component_type")]
    pub component_type: String,
    #[serde(default)]
    pub operating_hours: f64,
    #[serde(rename = "SSI", default)]
    pub ssi: f64,
    #[serde(default)]
    pub baseline_value: Option<f64>,
}

fn default_component_type() -> String {
    "bearing".to_string()
}

impl Default for ReliabilityRequest {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            severity_score: 0.0,
            confidence: 0.0,
            slope_log: 0.0,
            slope_change: 0.0,
            instability_index: 0.0,
            criticality: default_criticality(),
            current_value: 0.0,
            failure_threshold: 0.0,
            component_type: default_component_type(),
            operating_hours: 0.0,
            ssi: 0.0,
            baseline_value: None,
        }
    }
}

/// Condition-adjusted Weibull reliability figures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReliabilityMetrics {
    pub beta_base: f64,
    pub beta_adj: f64,
    pub eta_base_hours: f64,
    pub eta_adj_hours: f64,
    pub hazard_rate: f64,
    pub bathtub_phase: BathtubPhase,
    pub pf_interval_position: f64,
    pub weibull_failure_prob_30d: f64,
    pub weibull_rul_days: Option<f64>,
    pub nowlan_heap_pattern: String,
}

impl Default for ReliabilityMetrics {
    fn default() -> Self {
        Self {
            beta_base: 1.0,
            beta_adj: 1.0,
            eta_base_hours: 50_000.0,
            eta_adj_hours: 50_000.0,
            hazard_rate: 0.0,
            bathtub_phase: BathtubPhase::UsefulLife,
            pf_interval_position: 0.0,
            weibull_failure_prob_30d: 0.0,
            weibull_rul_days: None,
            nowlan_heap_pattern: "E".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReliabilityProjection {
    #[serde(rename = "RUL_days")]
    pub rul_days: f64,
    pub failure_probability_30d: f64,
    pub confidence: f64,
    pub risk_index: f64,
    pub recommended_window: String,
    pub reliability_metrics: Option<ReliabilityMetrics>,
}

impl Default for ReliabilityProjection {
    fn default() -> Self {
        Self {
            rul_days: 0.0,
            failure_probability_30d: 0.0,
            confidence: 0.0,
            risk_index: 0.0,
            recommended_window: "Planned".to_string(),
            reliability_metrics: None,
        }
    }
}
