//! Stage E: Maintenance Plan
//!
//! Weighted priority score, an urgency window, and a ranked action list
//! picked from the diagnosis text.

use tracing::debug;

use super::{guard, Stage, StageOutcome};
use crate::config::defaults::{
    CONFIRMATION_ACTION, MANPOWER_PENALTY, PRIORITY_24H, PRIORITY_7D, PRIORITY_IMMEDIATE,
    SAFETY_MULTIPLIER, SHUTDOWN_ACTION, SPARES_PENALTY, W_CONFIDENCE, W_CRITICALITY, W_SEVERITY,
    W_URGENCY,
};
use crate::processing::{round_to, ProcessingError};
use crate::rules::{catalog::generic_action, RuleBook, RuleProvider};
use crate::types::{MaintenancePlan, MaintenanceRequest, PlanItem};

/// Priority in [0, 100].
pub fn priority_score(request: &MaintenanceRequest) -> f64 {
    let base = W_SEVERITY * request.severity_score
        + W_CONFIDENCE * request.confidence
        + W_CRITICALITY * request.criticality
        + W_URGENCY * request.urgency;
    let safety = if request.safety_flag { SAFETY_MULTIPLIER } else { 1.0 };
    let spares = if request.spares_ready { 1.0 } else { SPARES_PENALTY };
    let manpower = if request.manpower_ready { 1.0 } else { MANPOWER_PENALTY };
    (100.0 * base * safety * spares * manpower).clamp(0.0, 100.0)
}

pub fn priority_window(priority: f64) -> &'static str {
    if priority >= PRIORITY_IMMEDIATE {
        "Immediate"
    } else if priority >= PRIORITY_24H {
        "24 hours"
    } else if priority >= PRIORITY_7D {
        "7 days"
    } else {
        "Next shutdown"
    }
}

/// Action ids in selection order, deduplicated.
///
/// Shutdown leads at immediate priority; then every diagnosis stem found in
/// the text contributes its actions in table order. With nothing selected
/// the confirmation run is used.
pub fn select_actions(
    diagnosis: Option<&str>,
    priority: f64,
    provider: &dyn RuleProvider,
) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    if priority >= PRIORITY_IMMEDIATE {
        selected.push(SHUTDOWN_ACTION.to_string());
    }

    if let Some(text) = diagnosis {
        let lowered = text.to_lowercase();
        for entry in provider.diagnosis_map() {
            if lowered.contains(entry.stem.as_str()) {
                selected.extend(entry.actions.iter().cloned());
            }
        }
    }

    if selected.is_empty() {
        selected.push(CONFIRMATION_ACTION.to_string());
    }

    let mut unique: Vec<String> = Vec::with_capacity(selected.len());
    for id in selected {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

pub fn evaluate(
    request: &MaintenanceRequest,
    provider: &dyn RuleProvider,
) -> Result<MaintenancePlan, ProcessingError> {
    let inputs = [
        request.severity_score,
        request.confidence,
        request.criticality,
        request.urgency,
    ];
    if inputs.iter().any(|v| !v.is_finite()) {
        return Err(ProcessingError::NonFinite("priority inputs"));
    }

    let priority = priority_score(request);
    let window = priority_window(priority);
    let action_ids = select_actions(request.diagnosis.as_deref(), priority, provider);

    let plan_items: Vec<PlanItem> = action_ids
        .into_iter()
        .enumerate()
        .map(|(i, action_id)| {
            let spec = provider
                .action(&action_id)
                .cloned()
                .unwrap_or_else(|| generic_action(&action_id));
            PlanItem {
                rank: i + 1,
                priority_score: round_to(priority, 2),
                window: window.to_string(),
                action_id,
                action_title: spec.title,
                justification: spec.justification,
                verification: spec.verification,
            }
        })
        .collect();

    debug!(
        asset_id = %request.asset_id,
        priority = priority,
        window,
        actions = plan_items.len(),
        "Maintenance plan built"
    );

    Ok(MaintenancePlan {
        total_actions: plan_items.len(),
        plan_items,
    })
}

pub fn run_with_outcome(
    request: &MaintenanceRequest,
    provider: &dyn RuleProvider,
) -> StageOutcome<MaintenancePlan> {
    guard(Stage::Maintenance, evaluate(request, provider))
}

/// Evaluate against the globally configured rule book.
pub fn run(request: &MaintenanceRequest) -> MaintenancePlan {
    run_with_outcome(request, RuleBook::global().as_ref()).response
}
