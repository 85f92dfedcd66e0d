//! Pipeline stages
//!
//! Nine pure functions, one per decision step. Every stage exposes:
//! - `evaluate(..) -> Result<Response, ProcessingError>`: the computation itself
//! - `run_with_outcome(..) -> StageOutcome<Response>`: safe default plus cause
//! - `run(..) -> Response`: the infallible entry point used by callers
//!
//! Degenerate input (too few samples, zero variance) is not an error; it
//! yields the stage's documented default directly from `evaluate`. Errors are
//! reserved for unexpected numeric failures and are absorbed by [`guard`].

pub mod data_guard;
pub mod fusion;
pub mod health_stage;
pub mod initiator_rules;
pub mod maintenance_plan;
pub mod reliability;
pub mod slope_intel;
pub mod stability_lens;
pub mod trend_engine;

use tracing::warn;

use crate::processing::ProcessingError;

/// Stage identifiers, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    DataGuard,
    Trend,
    Initiators,
    Slope,
    Stability,
    Fusion,
    Health,
    Maintenance,
    Reliability,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::DataGuard,
        Stage::Trend,
        Stage::Initiators,
        Stage::Slope,
        Stage::Stability,
        Stage::Fusion,
        Stage::Health,
        Stage::Maintenance,
        Stage::Reliability,
    ];

    /// Short code used in HTTP routes and the pipeline trace.
    pub fn code(self) -> &'static str {
        match self {
            Stage::DataGuard => "module0",
            Stage::Trend => "moduleA",
            Stage::Initiators => "moduleB",
            Stage::Slope => "moduleBplus",
            Stage::Stability => "moduleBpp",
            Stage::Fusion => "moduleC",
            Stage::Health => "moduleD",
            Stage::Maintenance => "moduleE",
            Stage::Reliability => "moduleF",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::DataGuard => "data_guard",
            Stage::Trend => "trend_engine",
            Stage::Initiators => "initiator_rules",
            Stage::Slope => "slope_intel",
            Stage::Stability => "stability_lens",
            Stage::Fusion => "fusion",
            Stage::Health => "health_stage",
            Stage::Maintenance => "maintenance_plan",
            Stage::Reliability => "reliability",
        };
        write!(f, "{name}")
    }
}

/// A stage response plus the error that forced a fallback, if any.
///
/// The cause is for logs and tests only; it is never part of the response
/// contract.
#[derive(Debug, Clone)]
pub struct StageOutcome<T> {
    pub response: T,
    pub cause: Option<ProcessingError>,
}

impl<T> StageOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        self.cause.is_some()
    }

    pub fn into_response(self) -> T {
        self.response
    }
}

/// Convert a stage result into an outcome, falling back to `T::default()`.
pub fn guard<T: Default>(stage: Stage, result: Result<T, ProcessingError>) -> StageOutcome<T> {
    guard_with(stage, result, T::default)
}

/// Convert a stage result into an outcome with an explicit fallback.
pub fn guard_with<T>(
    stage: Stage,
    result: Result<T, ProcessingError>,
    fallback: impl FnOnce() -> T,
) -> StageOutcome<T> {
    match result {
        Ok(response) => StageOutcome {
            response,
            cause: None,
        },
        Err(e) => {
            warn!(stage = %stage, error = %e, "Stage failed, returning safe default");
            StageOutcome {
                response: fallback(),
                cause: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_passes_success_through() {
        let outcome = guard(Stage::Fusion, Ok(7_u32));
        assert_eq!(outcome.response, 7);
        assert!(!outcome.is_fallback());
    }

    #[test]
    fn test_guard_records_cause_and_defaults() {
        let outcome: StageOutcome<u32> =
            guard(Stage::Trend, Err(ProcessingError::NonFinite("slope")));
        assert_eq!(outcome.response, 0);
        assert_eq!(outcome.cause, Some(ProcessingError::NonFinite("slope")));
    }

    #[test]
    fn test_guard_with_uses_explicit_fallback() {
        let outcome = guard_with(
            Stage::Trend,
            Err(ProcessingError::InvalidInput("x".into())),
            || "error",
        );
        assert_eq!(outcome.into_response(), "error");
    }

    #[test]
    fn test_stage_codes_are_unique() {
        let mut codes: Vec<&str> = Stage::ALL.iter().map(|s| s.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 9);
    }
}
