//! Shared data structures for the condition-monitoring decision pipeline
//!
//! This module defines the value records exchanged between stages:
//! - Signal intake: SignalInput, ContextInput, SignalMetrics
//! - Stage 0: QualityAssessment (data guard)
//! - Stage A: TrendFeatures (trend engine)
//! - Stage B / B+ / B++: InitiatorReport, SlopeAssessment, StabilityAssessment
//! - Stage C / D: FusionResult, HealthAssessment
//! - Stage E / F: MaintenancePlan, ReliabilityProjection
//! - Orchestrator: FullAnalysisRequest, PipelineTrace, FullAnalysisResponse
//!
//! Every record is produced once per invocation and never mutated afterwards.

mod levels;
mod signal;
mod analysis;
mod decision;
mod pipeline;

pub use levels::*;
pub use signal::*;
pub use analysis::*;
pub use decision::*;
pub use pipeline::*;

/// Wire schema version carried by intake and pipeline records.
pub const SCHEMA_VERSION: &str = "1.0";

pub(crate) fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}
