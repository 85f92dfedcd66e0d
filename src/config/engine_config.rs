//! Engine Configuration - fusion profiles, action catalog and runtime sizing
//!
//! Each struct implements `Default` with the built-in tables, so an absent
//! or partial config file behaves exactly like the stock engine.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::defaults;
use crate::rules::catalog;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an engine deployment.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$RAPID_AI_CONFIG` env var
/// 2. `./rapid_ai.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Orchestrator sizing
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// System-type weight profiles used by fusion
    #[serde(default = "catalog::default_profiles")]
    pub profiles: Vec<ProfileConfig>,

    /// Maintenance action catalog keyed by action id
    #[serde(default = "catalog::default_actions")]
    pub actions: BTreeMap<String, ActionSpec>,

    /// Ordered diagnosis keyword stems
    #[serde(default = "catalog::default_diagnosis_map")]
    pub diagnosis_map: Vec<DiagnosisKeyword>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            pipeline: PipelineConfig::default(),
            profiles: catalog::default_profiles(),
            actions: catalog::default_actions(),
            diagnosis_map: catalog::default_diagnosis_map(),
        }
    }
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$RAPID_AI_CONFIG` environment variable
    /// 2. `./rapid_ai.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that exists but fails to parse or validate is an error; the
    /// engine must not start on half-read tables.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("RAPID_AI_CONFIG") {
            let p = PathBuf::from(&path);
            let config = Self::load_from_file(&p)?;
            info!(path = %p.display(), profiles = config.profiles.len(), "Loaded engine config from RAPID_AI_CONFIG");
            return Ok(config);
        }

        let local = PathBuf::from("rapid_ai.toml");
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(profiles = config.profiles.len(), "Loaded engine config from ./rapid_ai.toml");
            return Ok(config);
        }

        info!("No rapid_ai.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate cross-table consistency. Collects every problem before
    /// returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.pipeline.worker_threads == 0 {
            errors.push("pipeline.worker_threads must be >= 1".to_string());
        }
        if self.pipeline.spectrum_window < defaults::MIN_SPECTRUM_WINDOW {
            errors.push(format!(
                "pipeline.spectrum_window ({}) must be >= {}",
                self.pipeline.spectrum_window,
                defaults::MIN_SPECTRUM_WINDOW
            ));
        }

        let mut seen_types = HashSet::new();
        for profile in &self.profiles {
            if profile.id.trim().is_empty() {
                errors.push(format!("profile '{}': id must not be empty", profile.system_type));
            }
            if !seen_types.insert(profile.system_type.as_str()) {
                errors.push(format!("profile '{}' is defined more than once", profile.system_type));
            }
            if profile.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
                errors.push(format!(
                    "profile '{}': weights must be finite and non-negative",
                    profile.system_type
                ));
            }
            let sum: f64 = profile.weights.values().sum();
            if (sum - 1.0).abs() > 0.01 {
                errors.push(format!(
                    "profile '{}': weights must sum to ~1.0, got {:.3}",
                    profile.system_type, sum
                ));
            }
        }

        for entry in &self.diagnosis_map {
            if entry.stem.trim().is_empty() {
                errors.push("diagnosis_map: stem must not be empty".to_string());
            }
            for id in &entry.actions {
                if !self.actions.contains_key(id) {
                    errors.push(format!(
                        "diagnosis_map '{}': action {} is not in the catalog",
                        entry.stem, id
                    ));
                }
            }
        }

        for required in [defaults::CONFIRMATION_ACTION, defaults::SHUTDOWN_ACTION] {
            if !self.actions.contains_key(required) {
                errors.push(format!("actions: {required} is required"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address. Overridden by `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_server_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            cors_origins: Vec::new(),
        }
    }
}

// ============================================================================
// Pipeline Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum stages executing at once across all requests.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Leading samples of each axis handed to the stability lens.
    #[serde(default = "default_spectrum_window")]
    pub spectrum_window: usize,
}

fn default_worker_threads() -> usize {
    defaults::DEFAULT_WORKER_THREADS
}

fn default_spectrum_window() -> usize {
    defaults::DEFAULT_SPECTRUM_WINDOW
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            spectrum_window: default_spectrum_window(),
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Block weights for one system type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    pub system_type: String,
    pub id: String,
    pub weights: BTreeMap<String, f64>,
}

/// Catalog entry for a maintenance action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionSpec {
    pub title: String,
    pub justification: String,
    pub verification: String,
}

/// Diagnosis stem and the actions it recommends, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosisKeyword {
    pub stem: String,
    pub actions: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================
