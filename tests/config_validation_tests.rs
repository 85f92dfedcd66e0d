//! Config Validation Tests
//!
//! Loading engine configuration from TOML files on disk: defaults for absent
//! sections, wholesale table replacement, and validation failures that must
//! stop startup.

use std::io::Write;
use std::sync::Arc;

use rapid_ai::config::{ConfigError, EngineConfig, PipelineConfig};
use rapid_ai::rules::{RuleBook, RuleProvider};
use rapid_ai::stages::{fusion, maintenance_plan};
use rapid_ai::types::{BlockInput, FusionRequest, MaintenanceRequest, TrendClass};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn minimal_file_keeps_builtin_tables() {
    let file = write_config(
        r#"
[server]
addr = "127.0.0.1:9100"
cors_origins = ["http://localhost:5173"]
"#,
    );
    let config = EngineConfig::load_from_file(file.path()).expect("valid config");
    assert_eq!(config.server.addr, "127.0.0.1:9100");
    assert_eq!(config.server.cors_origins.len(), 1);
    assert_eq!(config.pipeline.worker_threads, 4);
    assert_eq!(config.profiles.len(), 3);
    assert!(config.actions.contains_key("ACT008"));
}

#[test]
fn custom_profiles_replace_defaults_and_drive_fusion() {
    let file = write_config(
        r#"
[[profiles]]
system_type = "compressor_train"
id = "SITE_COMP_1"
weights = { afb = 0.6, coupling = 0.4 }
"#,
    );
    let config = EngineConfig::load_from_file(file.path()).expect("valid config");
    assert_eq!(config.profiles.len(), 1);

    let book = RuleBook::from_config(&config);
    assert!(book.profile("pump_train_horizontal").is_none());
    let request = FusionRequest {
        system_type: "compressor_train".to_string(),
        profile_id: None,
        blocks: [
            (
                "afb".to_string(),
                BlockInput {
                    match_score: 0.95,
                    trend_class: TrendClass::Stable,
                    trend_confidence: 0.0,
                    process_correlation: 0.0,
                },
            ),
            (
                "coupling".to_string(),
                BlockInput {
                    match_score: 0.1,
                    trend_class: TrendClass::Stable,
                    trend_confidence: 0.0,
                    process_correlation: 0.0,
                },
            ),
        ]
        .into_iter()
        .collect(),
        stability_state: None,
    };
    let result = fusion::evaluate(&request, &book).expect("fusion");
    assert_eq!(result.profile_id, "SITE_COMP_1");
    // 0.6 * 0.90 + 0.4 * 0.15
    assert!((result.ssi - 0.60).abs() < 1e-9);
}

#[test]
fn custom_diagnosis_map_selects_configured_actions() {
    let file = write_config(
        r#"
[actions.ACT001]
title = "Confirm with second measurement"
justification = "Rule out sensor fault"
verification = "Repeat within 10%"

[actions.ACT008]
title = "Controlled shutdown"
justification = "Imminent failure risk"
verification = "Machine isolated"

[actions.ACT020]
title = "Borescope gear mesh"
justification = "Tooth damage suspected"
verification = "No pitting visible"

[[diagnosis_map]]
stem = "tooth"
actions = ["ACT020"]
"#,
    );
    let config = EngineConfig::load_from_file(file.path()).expect("valid config");
    let book: Arc<dyn RuleProvider> = Arc::new(RuleBook::from_config(&config));

    let request = MaintenanceRequest {
        diagnosis: Some("Gear tooth breakage".to_string()),
        ..MaintenanceRequest::default()
    };
    let plan = maintenance_plan::evaluate(&request, book.as_ref()).expect("plan");
    assert_eq!(plan.total_actions, 1);
    assert_eq!(plan.plan_items[0].action_id, "ACT020");
    assert_eq!(plan.plan_items[0].action_title, "Borescope gear mesh");
}

#[test]
fn unbalanced_weights_fail_validation() {
    let file = write_config(
        r#"
[[profiles]]
system_type = "fan_train"
id = "PROFILE_FAN_X"
weights = { afb = 0.5, foundation = 0.2 }
"#,
    );
    match EngineConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("fan_train"));
            assert!(errors[0].contains("0.700"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn every_problem_is_reported_at_once() {
    let file = write_config(
        r#"
[pipeline]
worker_threads = 0
spectrum_window = 4

[[profiles]]
system_type = "fan_train"
id = ""
weights = { afb = 1.0 }
"#,
    );
    let Err(ConfigError::Validation(errors)) = EngineConfig::load_from_file(file.path()) else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.len(), 3, "{errors:?}");
    let message = ConfigError::Validation(errors).to_string();
    assert!(message.starts_with("Config validation failed:"));
    assert!(message.contains("worker_threads"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[pipeline\nworker_threads = 2");
    let err = EngineConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = EngineConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn pipeline_section_defaults_are_usable() {
    let config = PipelineConfig::default();
    assert!(config.worker_threads >= 1);
    assert!(config.spectrum_window >= 16);
}
