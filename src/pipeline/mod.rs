//! Decision Pipeline Module
//!
//! ## Nine-Stage Flow
//!
//! ```text
//! STAGE 0:  Data Guard (block? return early)
//! STAGE A:  Trend Engine on the primary signal
//! STAGE B:  Initiator Rules     ─┐
//! STAGE B+: Slope Intelligence   ├─ concurrent, joined before fusion
//! STAGE B++: Stability Lens     ─┘
//! STAGE C:  Fusion into the System Stability Index
//! STAGE D:  Health Stage
//! STAGE E:  Maintenance Plan
//! STAGE F:  Reliability Projection
//! ```
//!
//! GUARANTEE: a Data Guard block skips every later stage.

mod orchestrator;

pub use orchestrator::{PipelineError, PipelineOrchestrator};
