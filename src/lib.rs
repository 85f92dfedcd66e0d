//! RAPID AI: Condition-Monitoring Decision Pipeline
//!
//! Nine deterministic scoring stages for rotating machinery, from a raw
//! vibration waveform to a ranked maintenance plan and a remaining-life
//! projection.
//!
//! ## Architecture
//!
//! - **Stages**: pure stage functions with a catch-and-default boundary
//! - **Pipeline**: orchestrator with a bounded worker pool and a three-way fan-out
//! - **Rules**: initiator signatures, fusion weight profiles and the action catalog
//! - **API**: thin axum surface over every stage and the composite pipeline

pub mod api;
pub mod config;
pub mod pipeline;
pub mod processing;
pub mod rules;
pub mod stages;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, EngineConfig};

// Re-export the composite entry point
pub use pipeline::{PipelineError, PipelineOrchestrator};

// Re-export the table provider
pub use rules::{RuleBook, RuleProvider};

// Re-export the stage boundary
pub use stages::{Stage, StageOutcome};

// Re-export commonly used types
pub use types::{
    FullAnalysisRequest, FullAnalysisResponse, HealthStage, PipelineTrace, SeverityLevel,
    SignalInput,
};
