//! Stage B: Initiator Rules
//!
//! Matches directional ratios and supplementary metrics against the fault
//! signatures of one component family. Rules are independent; confidence is
//! the strongest matched base severity, not a sum.

use tracing::debug;

use super::{guard_with, Stage, StageOutcome};
use crate::processing::{round_to, ProcessingError};
use crate::rules::{Condition, InitiatorRule, MetricSnapshot, RuleBook, RuleProvider};
use crate::types::{InitiatorMatch, InitiatorReport, InitiatorRequest, TriggeredCondition};

fn triggered(condition: &Condition, value: f64) -> TriggeredCondition {
    TriggeredCondition {
        expr: condition.metric.key().to_string(),
        op: condition.op,
        threshold: condition.threshold,
        value: round_to(value, 4),
    }
}

/// Conditions that fired for `rule`, or `None` when it does not match.
///
/// AND conditions are checked until the first failure. On failure the first
/// satisfied fallback condition matches on its own.
pub fn match_rule(rule: &InitiatorRule, snapshot: &MetricSnapshot) -> Option<Vec<TriggeredCondition>> {
    let mut fired = Vec::with_capacity(rule.conditions.len());
    let mut all_met = true;

    for condition in rule.conditions {
        let value = snapshot.value(condition.metric);
        if condition.holds(value) {
            fired.push(triggered(condition, value));
        } else {
            all_met = false;
            break;
        }
    }

    if !all_met {
        let value_of = |c: &Condition| snapshot.value(c.metric);
        let alternative = rule.fallback.iter().find(|c| c.holds(value_of(c)))?;
        return Some(vec![triggered(alternative, value_of(alternative))]);
    }

    (!fired.is_empty()).then_some(fired)
}

pub fn evaluate(
    request: &InitiatorRequest,
    provider: &dyn RuleProvider,
) -> Result<InitiatorReport, ProcessingError> {
    if let Some((key, _)) = request.metrics.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ProcessingError::InvalidInput(format!(
            "metric '{key}' is not finite"
        )));
    }

    let component = request.component.to_lowercase();
    let snapshot = MetricSnapshot::from_map(&request.metrics);

    let matched_rules: Vec<InitiatorMatch> = provider
        .initiator_rules(&component)
        .iter()
        .filter_map(|rule| {
            match_rule(rule, &snapshot).map(|conditions| InitiatorMatch {
                rule_id: rule.rule_id.to_string(),
                initiator: rule.initiator.to_string(),
                diagnosis: rule.diagnosis.to_string(),
                score: rule.severity_base,
                triggered_conditions: conditions,
            })
        })
        .collect();

    let confidence = matched_rules
        .iter()
        .map(|m| m.score)
        .fold(0.0_f64, f64::max);

    debug!(
        component = %component,
        matches = matched_rules.len(),
        confidence = confidence,
        "Initiator rules evaluated"
    );

    Ok(InitiatorReport {
        component,
        num_matches: matched_rules.len(),
        matched_rules,
        confidence: round_to(confidence, 4),
    })
}

pub fn run_with_outcome(
    request: &InitiatorRequest,
    provider: &dyn RuleProvider,
) -> StageOutcome<InitiatorReport> {
    guard_with(Stage::Initiators, evaluate(request, provider), || InitiatorReport {
        component: request.component.clone(),
        ..InitiatorReport::default()
    })
}

/// Evaluate against the globally configured rule book.
pub fn run(request: &InitiatorRequest) -> InitiatorReport {
    run_with_outcome(request, RuleBook::global().as_ref()).response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Comparison;
    use std::collections::BTreeMap;

    fn request(component: &str, metrics: &[(&str, f64)]) -> InitiatorRequest {
        InitiatorRequest {
            asset_id: "P-101".to_string(),
            component: component.to_string(),
            metrics: metrics
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn ids(report: &InitiatorReport) -> Vec<&str> {
        report.matched_rules.iter().map(|m| m.rule_id.as_str()).collect()
    }

    #[test]
    fn test_starved_bearing_matches_lubrication_rules() {
        let book = RuleBook::default();
        let req = request(
            "AFB",
            &[("H", 2.0), ("V", 2.0), ("A", 0.4), ("kurtosis", 6.0), ("temperature", 55.0)],
        );
        let report = evaluate(&req, &book).unwrap();
        assert_eq!(report.component, "afb");
        assert_eq!(ids(&report), vec!["AFB03", "AFB04", "AFB16"]);
        assert_eq!(report.num_matches, 3);
        assert_eq!(report.confidence, 0.8);

        let afb03 = &report.matched_rules[0];
        assert_eq!(afb03.triggered_conditions.len(), 3);
        assert_eq!(afb03.triggered_conditions[0].expr, "H_V_ratio");
        assert_eq!(afb03.triggered_conditions[2].op, Comparison::Ge);
        assert_eq!(afb03.triggered_conditions[2].value, 6.0);
    }

    #[test]
    fn test_or_fallback_reports_single_condition() {
        let book = RuleBook::default();
        // H/V = 0.5 fails the >= 1.6 branch but satisfies the < 0.6 fallback
        let report = evaluate(&request("afb", &[("H", 1.0), ("V", 2.0), ("A", 0.1)]), &book).unwrap();
        let afb02 = report
            .matched_rules
            .iter()
            .find(|m| m.rule_id == "AFB02")
            .unwrap();
        assert_eq!(afb02.triggered_conditions.len(), 1);
        assert_eq!(afb02.triggered_conditions[0].op, Comparison::Lt);
        assert_eq!(afb02.triggered_conditions[0].value, 0.5);
    }

    #[test]
    fn test_unknown_component_is_empty() {
        let report = evaluate(&request("turbine", &[("H", 5.0)]), &RuleBook::default()).unwrap();
        assert_eq!(report.num_matches, 0);
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.component, "turbine");
    }

    #[test]
    fn test_missing_channels_use_floor_values() {
        // no H/V/A at all: every ratio is 1.0
        let report = evaluate(&request("tpjb", &[]), &RuleBook::default()).unwrap();
        assert_eq!(ids(&report), vec!["TPJB01"]);
        assert_eq!(report.confidence, 0.6);
    }

    #[test]
    fn test_confidence_is_max_not_sum() {
        let report = evaluate(
            &request("shafts", &[("H", 1.0), ("V", 1.0), ("A", 2.0), ("kurtosis", 5.0)]),
            &RuleBook::default(),
        )
        .unwrap();
        assert_eq!(ids(&report), vec!["S03", "S05"]);
        assert_eq!(report.confidence, 0.95);
    }

    #[test]
    fn test_non_finite_metric_falls_back() {
        let req = request("AFB", &[("H", f64::NAN)]);
        let outcome = run_with_outcome(&req, &RuleBook::default());
        assert!(outcome.is_fallback());
        assert_eq!(outcome.response.component, "AFB");
        assert_eq!(outcome.response.num_matches, 0);
    }
}
