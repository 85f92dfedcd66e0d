//! Stage D: Health Stage
//!
//! SSI thresholds give the base stage; a positive SSI slope may escalate
//! Healthy or Degrading by one level. Critical never escalates further.

use tracing::debug;

use super::{guard, Stage, StageOutcome};
use crate::config::defaults::{
    DEGRADING_FAST_SLOPE, ESCALATION_DEGRADING_SLOPE, ESCALATION_UNSTABLE_SLOPE, SSI_CRITICAL,
    SSI_DEGRADING, SSI_UNSTABLE,
};
use crate::processing::ProcessingError;
use crate::types::{EscalationLevel, HealthAssessment, HealthRequest, HealthStage};

pub fn stage_from_ssi(ssi: f64) -> HealthStage {
    if ssi >= SSI_CRITICAL {
        HealthStage::Critical
    } else if ssi >= SSI_UNSTABLE {
        HealthStage::Unstable
    } else if ssi >= SSI_DEGRADING {
        HealthStage::Degrading
    } else {
        HealthStage::Healthy
    }
}

/// One-level escalation on a rising SSI. Thresholds are strict.
pub fn escalate(stage: HealthStage, ssi_slope: f64) -> HealthStage {
    match stage {
        HealthStage::Degrading if ssi_slope > ESCALATION_UNSTABLE_SLOPE => HealthStage::Unstable,
        HealthStage::Healthy if ssi_slope > ESCALATION_DEGRADING_SLOPE => HealthStage::Degrading,
        other => other,
    }
}

pub fn rul_band(stage: HealthStage) -> &'static str {
    match stage {
        HealthStage::Critical => "< 7 days",
        HealthStage::Unstable => "1-4 weeks",
        HealthStage::Degrading => "1-6 months",
        HealthStage::Healthy | HealthStage::Blocked => "> 6 months",
    }
}

/// Degrading and still rising faster than 0.03 per step, short of the
/// Unstable escalation.
pub fn is_fast_degrading(stage: HealthStage, ssi_slope: f64) -> bool {
    stage == HealthStage::Degrading && ssi_slope > DEGRADING_FAST_SLOPE
}

/// Escalation level and action text. A fast-rising Degrading stage keeps
/// Level 1 and is only reported in the trace.
pub fn escalation(stage: HealthStage, ssi_slope: f64) -> (EscalationLevel, &'static str) {
    match stage {
        HealthStage::Critical => (EscalationLevel::Level3, "Immediate intervention required"),
        HealthStage::Unstable => (EscalationLevel::Level2, "Prepare intervention"),
        HealthStage::Degrading if is_fast_degrading(stage, ssi_slope) => {
            debug!(ssi_slope, "Fast degradation inside Degrading band");
            (EscalationLevel::Level1, "Schedule inspection")
        }
        HealthStage::Degrading => (EscalationLevel::Level1, "Schedule inspection"),
        HealthStage::Healthy | HealthStage::Blocked => {
            (EscalationLevel::Level0, "Continue monitoring")
        }
    }
}

pub fn evaluate(request: &HealthRequest) -> Result<HealthAssessment, ProcessingError> {
    if !request.ssi.is_finite() || !request.ssi_slope.is_finite() {
        return Err(ProcessingError::NonFinite("SSI"));
    }

    let stage = escalate(stage_from_ssi(request.ssi), request.ssi_slope);
    let (escalation_level, action) = escalation(stage, request.ssi_slope);

    debug!(
        ssi = request.ssi,
        ssi_slope = request.ssi_slope,
        stage = %stage,
        fast_degrading = is_fast_degrading(stage, request.ssi_slope),
        "Health stage assigned"
    );

    Ok(HealthAssessment {
        degradation_stage: stage,
        rul_band: rul_band(stage).to_string(),
        escalation_level,
        recommended_action: action.to_string(),
    })
}

pub fn run_with_outcome(request: &HealthRequest) -> StageOutcome<HealthAssessment> {
    guard(Stage::Health, evaluate(request))
}

pub fn run(request: &HealthRequest) -> HealthAssessment {
    run_with_outcome(request).response
}
