//! Engine Configuration Module
//!
//! Operator-tunable profiles, action catalog and runtime sizing loaded from
//! TOML. The initiator rule table is compiled in.
//!
//! ## Loading Order
//!
//! 1. `RAPID_AI_CONFIG` environment variable (path to TOML file)
//! 2. `rapid_ai.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let workers = config::get().pipeline.worker_threads;
//! ```

mod engine_config;
pub mod defaults;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// A second call is ignored with a warning.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global engine configuration.
///
/// Library callers that never ran `init()` (tests, embedding) get the
/// built-in defaults.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}
