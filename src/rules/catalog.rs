//! Built-in fusion profiles, maintenance actions and diagnosis stems.
//!
//! These back `EngineConfig::default()` and any table a config file leaves
//! out.

use std::collections::BTreeMap;

use crate::config::{ActionSpec, DiagnosisKeyword, ProfileConfig};

/// Profile id used when a system type has no configured weights.
pub const DEFAULT_PROFILE_ID: &str = "PROFILE_DEFAULT";

fn profile(system_type: &str, id: &str, weights: &[(&str, f64)]) -> ProfileConfig {
    ProfileConfig {
        system_type: system_type.to_string(),
        id: id.to_string(),
        weights: weights.iter().map(|(k, w)| ((*k).to_string(), *w)).collect(),
    }
}

pub fn default_profiles() -> Vec<ProfileConfig> {
    vec![
        profile(
            "pump_train_horizontal",
            "PROFILE_PUMP_A",
            &[
                ("foundation", 0.15),
                ("ac_motor", 0.10),
                ("coupling", 0.10),
                ("shafts", 0.10),
                ("afb", 0.25),
                ("fluid_flow", 0.30),
            ],
        ),
        profile(
            "gearbox_train",
            "PROFILE_GBX_A",
            &[
                ("foundation", 0.15),
                ("ac_motor", 0.10),
                ("coupling", 0.10),
                ("shafts", 0.10),
                ("gears", 0.35),
                ("afb", 0.20),
            ],
        ),
        profile(
            "fan_train",
            "PROFILE_FAN_A",
            &[
                ("foundation", 0.15),
                ("ac_motor", 0.15),
                ("coupling", 0.05),
                ("shafts", 0.10),
                ("afb", 0.25),
                ("fluid_flow", 0.30),
            ],
        ),
    ]
}

const ACTIONS: &[(&str, &str, &str, &str)] = &[
    (
        "ACT001",
        "Vibration re-measure (confirmation run)",
        "Confirm trend before committing to intervention",
        "Compare new RMS to previous within ±10%",
    ),
    (
        "ACT002",
        "Bearing lubrication / grease replenishment",
        "High frequency or temperature rise indicates lubrication deficit",
        "HF amplitude and temperature return to baseline within 24h",
    ),
    (
        "ACT003",
        "Alignment check (laser / dial indicator)",
        "Axial dominance and coupling signature indicate misalignment",
        "Alignment report within tolerance per OEM spec",
    ),
    (
        "ACT004",
        "Balance correction (single / dual plane)",
        "1× dominance with horizontal preference indicates imbalance",
        "1× amplitude reduced by ≥50% post-correction",
    ),
    (
        "ACT005",
        "Bearing replacement (scheduled)",
        "BPFO/BPFI signatures with acceleration confirms bearing defect",
        "Post-replacement vibration within acceptance limits",
    ),
    (
        "ACT006",
        "Foundation tightening / soft foot correction",
        "V/H ratio and looseness indicate structural issues",
        "Phase stability and reduced looseness harmonics",
    ),
    (
        "ACT007",
        "Process investigation (not machine fault)",
        "Trend correlates with process variable, not machine degradation",
        "Vibration returns to normal with process stabilisation",
    ),
    (
        "ACT008",
        "Emergency shutdown / trip recommendation",
        "Critical SSI with accelerating trend, imminent failure risk",
        "Machine isolated, inspection completed before restart",
    ),
];

pub fn default_actions() -> BTreeMap<String, ActionSpec> {
    ACTIONS
        .iter()
        .map(|(id, title, justification, verification)| {
            (
                (*id).to_string(),
                ActionSpec {
                    title: (*title).to_string(),
                    justification: (*justification).to_string(),
                    verification: (*verification).to_string(),
                },
            )
        })
        .collect()
}

/// Stems match broader word forms ("imbalanc" covers imbalance/imbalanced).
const DIAGNOSIS_STEMS: &[(&str, &[&str])] = &[
    ("imbalanc", &["ACT004", "ACT001"]),
    ("unbalanc", &["ACT004", "ACT001"]),
    ("misalign", &["ACT003", "ACT001"]),
    ("bearing", &["ACT002", "ACT005"]),
    ("lubric", &["ACT002"]),
    ("loose", &["ACT006", "ACT001"]),
    ("foundation", &["ACT006"]),
    ("process", &["ACT007"]),
    ("critical", &["ACT008"]),
    ("shutdown", &["ACT008"]),
    ("cavitat", &["ACT007", "ACT001"]),
    ("resonan", &["ACT006", "ACT001"]),
];

pub fn default_diagnosis_map() -> Vec<DiagnosisKeyword> {
    DIAGNOSIS_STEMS
        .iter()
        .map(|(stem, actions)| DiagnosisKeyword {
            stem: (*stem).to_string(),
            actions: actions.iter().map(|a| (*a).to_string()).collect(),
        })
        .collect()
}

/// Rendering for an action id missing from the catalog.
pub fn generic_action(id: &str) -> ActionSpec {
    ActionSpec {
        title: format!("Action {id}"),
        justification: "See diagnosis".to_string(),
        verification: "Verify post-action".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_sum_to_one() {
        for p in default_profiles() {
            let sum: f64 = p.weights.values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {sum}", p.id);
        }
    }

    #[test]
    fn test_diagnosis_map_only_references_catalog() {
        let actions = default_actions();
        for entry in default_diagnosis_map() {
            for id in &entry.actions {
                assert!(actions.contains_key(id), "{} -> {id}", entry.stem);
            }
        }
    }

    #[test]
    fn test_generic_action_text() {
        let spec = generic_action("ACT042");
        assert_eq!(spec.title, "Action ACT042");
        assert_eq!(spec.justification, "See diagnosis");
        assert_eq!(spec.verification, "Verify post-action");
    }
}
