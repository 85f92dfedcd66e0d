//! Stage C: Fusion
//!
//! Combines per-block evidence into the System Stability Index. Each block
//! is scored by a fixed precedence table, weighted by the system-type
//! profile and summed. Critical instability from the entropy lens floors the
//! result at 0.70.

use std::collections::BTreeMap;

use tracing::debug;

use super::{guard_with, Stage, StageOutcome};
use crate::config::defaults::{
    INSTABILITY_SSI_FLOOR, PROCESS_CORRELATION_LIMIT, TOP_CONTRIBUTORS,
};
use crate::processing::{clamp01, round_to, ProcessingError};
use crate::rules::{catalog::DEFAULT_PROFILE_ID, RuleBook, RuleProvider};
use crate::types::{
    BlockInput, FusionRequest, FusionResult, StabilityState, SystemState, TrendClass,
};

/// Block score by precedence, first match wins.
pub fn block_score(block: &BlockInput) -> f64 {
    let b = block.match_score;
    let c = block.trend_confidence;
    match block.trend_class {
        _ if b >= 0.90 => 0.90,
        TrendClass::Accelerating if c >= 0.70 => 0.85,
        TrendClass::Step if c >= 0.70 => 0.80,
        TrendClass::Drift if c >= 0.60 => 0.65,
        TrendClass::Chaotic if block.process_correlation >= 0.70 => 0.35,
        class if b >= 0.70 && (class == TrendClass::Stable || c < 0.50) => 0.55,
        TrendClass::Stable if b < 0.30 => 0.15,
        _ => 0.40,
    }
}

/// Weights for the blocks actually present.
///
/// Without profile weights every block gets 1/n. With them, only present
/// blocks keep a weight, renormalised when their sum falls below 0.99.
pub fn effective_weights(
    profile_weights: Option<&BTreeMap<String, f64>>,
    blocks: &BTreeMap<String, BlockInput>,
) -> BTreeMap<String, f64> {
    match profile_weights.filter(|w| !w.is_empty()) {
        None => {
            let n = blocks.len() as f64;
            blocks.keys().map(|k| (k.clone(), 1.0 / n)).collect()
        }
        Some(weights) => {
            let active: BTreeMap<String, f64> = blocks
                .keys()
                .filter_map(|k| weights.get(k).map(|w| (k.clone(), *w)))
                .collect();
            let sum: f64 = active.values().sum();
            if sum > 0.0 && sum < 0.99 {
                active.into_iter().map(|(k, w)| (k, w / sum)).collect()
            } else {
                active
            }
        }
    }
}

pub fn evaluate(
    request: &FusionRequest,
    provider: &dyn RuleProvider,
) -> Result<FusionResult, ProcessingError> {
    if let Some((name, _)) = request.blocks.iter().find(|(_, b)| {
        ![b.match_score, b.trend_confidence, b.process_correlation]
            .iter()
            .all(|v| v.is_finite())
    }) {
        return Err(ProcessingError::InvalidInput(format!(
            "block '{name}' carries a non-finite value"
        )));
    }

    let profile = provider.profile(&request.system_type);
    let profile_id = request.profile_id.clone().unwrap_or_else(|| {
        profile.map_or_else(|| DEFAULT_PROFILE_ID.to_string(), |p| p.id.clone())
    });
    let weights = effective_weights(profile.map(|p| &p.weights), &request.blocks);

    let contributions: Vec<(&String, f64)> = request
        .blocks
        .iter()
        .map(|(name, block)| {
            let w = weights.get(name).copied().unwrap_or(0.0);
            (name, w * block_score(block))
        })
        .collect();

    let mut ssi = clamp01(contributions.iter().map(|(_, c)| c).sum());
    if request.stability_state == Some(StabilityState::CriticalInstability) {
        ssi = ssi.max(INSTABILITY_SSI_FLOOR);
    }

    let process_driven = request
        .blocks
        .values()
        .filter(|b| b.process_correlation >= PROCESS_CORRELATION_LIMIT)
        .count();
    // strict majority; a tie does not override
    let system_state = if process_driven * 2 > request.blocks.len() {
        SystemState::ProcessDriven
    } else {
        SystemState::from_ssi(ssi)
    };

    let mut ranked = contributions;
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_contributors = ranked
        .into_iter()
        .take(TOP_CONTRIBUTORS)
        .map(|(name, _)| name.clone())
        .collect();

    debug!(
        system_type = %request.system_type,
        profile_id = %profile_id,
        blocks = request.blocks.len(),
        ssi = ssi,
        state = ?system_state,
        "Fusion complete"
    );

    Ok(FusionResult {
        system_type: request.system_type.clone(),
        profile_id,
        ssi: round_to(ssi, 4),
        system_state,
        top_contributors,
        recommended_action: system_state.action().to_string(),
    })
}

pub fn run_with_outcome(
    request: &FusionRequest,
    provider: &dyn RuleProvider,
) -> StageOutcome<FusionResult> {
    guard_with(Stage::Fusion, evaluate(request, provider), || FusionResult {
        system_type: request.system_type.clone(),
        ..FusionResult::default()
    })
}

/// Evaluate against the globally configured rule book.
pub fn run(request: &FusionRequest) -> FusionResult {
    run_with_outcome(request, RuleBook::global().as_ref()).response
}
