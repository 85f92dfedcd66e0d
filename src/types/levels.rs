//! Ordinal and categorical levels shared across stages.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    SEVERITY_ALARM, SEVERITY_WARNING, SEVERITY_WATCH, SSI_CRITICAL, SSI_DEGRADING, SSI_UNSTABLE,
};

/// Data guard verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    #[default]
    Pass,
    Warn,
    Fail,
    Block,
}

impl StatusLevel {
    /// Map a non-blocking quality score to pass/warn/fail.
    pub fn from_quality(quality: f64) -> Self {
        if quality >= 0.8 {
            Self::Pass
        } else if quality >= 0.5 {
            Self::Warn
        } else {
            Self::Fail
        }
    }
}

/// Ordinal severity: normal < watch < warning < alarm.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    #[default]
    Normal,
    Watch,
    Warning,
    Alarm,
}

impl SeverityLevel {
    /// Bucket a severity score at the 0.3 / 0.5 / 0.8 boundaries.
    ///
    /// Intervals are half-open; anything at or above 0.8 (including values
    /// above 1.0) is an alarm.
    pub fn from_score(score: f64) -> Self {
        if score >= SEVERITY_ALARM {
            Self::Alarm
        } else if score >= SEVERITY_WARNING {
            Self::Warning
        } else if score >= SEVERITY_WATCH {
            Self::Watch
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityLevel::Normal => write!(f, "normal"),
            SeverityLevel::Watch => write!(f, "watch"),
            SeverityLevel::Warning => write!(f, "warning"),
            SeverityLevel::Alarm => write!(f, "alarm"),
        }
    }
}

/// Log-domain trend class from slope intelligence.
///
/// Mutually exclusive; assigned by a fixed precedence chain
/// (Step, Chaotic, Accelerating, Drift, Stable).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TrendClass {
    #[default]
    Stable,
    Drift,
    Accelerating,
    Chaotic,
    Step,
}

impl std::fmt::Display for TrendClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendClass::Stable => write!(f, "Stable"),
            TrendClass::Drift => write!(f, "Drift"),
            TrendClass::Accelerating => write!(f, "Accelerating"),
            TrendClass::Chaotic => write!(f, "Chaotic"),
            TrendClass::Step => write!(f, "Step"),
        }
    }
}

/// Entropy-lens stability state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum StabilityState {
    #[default]
    Stable,
    Drifting,
    Destabilizing,
    Chaotic,
    #[serde(rename = "Critical_Instability")]
    CriticalInstability,
}

/// System-level state derived by fusion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemState {
    #[default]
    Stable,
    Degrading,
    Unstable,
    Critical,
    #[serde(rename = "process-driven")]
    ProcessDriven,
}

impl SystemState {
    /// Threshold classification of an SSI value at 0.30 / 0.60 / 0.80.
    pub fn from_ssi(ssi: f64) -> Self {
        if ssi >= SSI_CRITICAL {
            Self::Critical
        } else if ssi >= SSI_UNSTABLE {
            Self::Unstable
        } else if ssi >= SSI_DEGRADING {
            Self::Degrading
        } else {
            Self::Stable
        }
    }

    /// Short action token associated with each state.
    pub fn action(self) -> &'static str {
        match self {
            SystemState::Stable => "monitor",
            SystemState::Degrading => "alert",
            SystemState::Unstable => "intervene",
            SystemState::Critical => "shutdown_or_trip",
            SystemState::ProcessDriven => "investigate_process",
        }
    }
}

/// Degradation stage. `Blocked` is only produced by the orchestrator when the
/// quality gate aborts the run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum HealthStage {
    #[default]
    Healthy,
    Degrading,
    Unstable,
    Critical,
    Blocked,
}

impl std::fmt::Display for HealthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStage::Healthy => write!(f, "Healthy"),
            HealthStage::Degrading => write!(f, "Degrading"),
            HealthStage::Unstable => write!(f, "Unstable"),
            HealthStage::Critical => write!(f, "Critical"),
            HealthStage::Blocked => write!(f, "Blocked"),
        }
    }
}

/// Escalation level 0-3.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub enum EscalationLevel {
    #[default]
    #[serde(rename = "Level_0")]
    Level0,
    #[serde(rename = "Level_1")]
    Level1,
    #[serde(rename = "Level_2")]
    Level2,
    #[serde(rename = "Level_3")]
    Level3,
}

/// Bathtub-curve regime inferred from the adjusted Weibull shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BathtubPhase {
    InfantMortality,
    #[default]
    UsefulLife,
    WearOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_buckets_are_half_open() {
        assert_eq!(SeverityLevel::from_score(0.0), SeverityLevel::Normal);
        assert_eq!(SeverityLevel::from_score(0.29), SeverityLevel::Normal);
        assert_eq!(SeverityLevel::from_score(0.3), SeverityLevel::Watch);
        assert_eq!(SeverityLevel::from_score(0.5), SeverityLevel::Warning);
        assert_eq!(SeverityLevel::from_score(0.8), SeverityLevel::Alarm);
        assert_eq!(SeverityLevel::from_score(1.0), SeverityLevel::Alarm);
        assert!(SeverityLevel::Watch < SeverityLevel::Alarm);
    }

    #[test]
    fn test_ssi_state_boundaries() {
        assert_eq!(SystemState::from_ssi(0.29), SystemState::Stable);
        assert_eq!(SystemState::from_ssi(0.30), SystemState::Degrading);
        assert_eq!(SystemState::from_ssi(0.60), SystemState::Unstable);
        assert_eq!(SystemState::from_ssi(0.80), SystemState::Critical);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&StabilityState::CriticalInstability).unwrap();
        assert_eq!(json, "\"Critical_Instability\"");
        let json = serde_json::to_string(&SystemState::ProcessDriven).unwrap();
        assert_eq!(json, "\"process-driven\"");
        let json = serde_json::to_string(&StatusLevel::Pass).unwrap();
        assert_eq!(json, "\"pass\"");
        let json = serde_json::to_string(&EscalationLevel::Level2).unwrap();
        assert_eq!(json, "\"Level_2\"");
        let json = serde_json::to_string(&BathtubPhase::WearOut).unwrap();
        assert_eq!(json, "\"wear_out\"");
    }
}
