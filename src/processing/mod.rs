//! Signal processing module - statistics, spectra and axis derivation

mod fft;
mod stats;
mod triaxial;

pub use fft::*;
pub use stats::*;
pub use triaxial::*;

use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("FFT error: {0}")]
    FftError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Clamp into the unit interval. NaN maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Reject a NaN or infinite result before it leaves a stage.
pub fn ensure_finite(value: f64, what: &'static str) -> Result<f64, ProcessingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProcessingError::NonFinite(what))
    }
}
