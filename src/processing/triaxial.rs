//! Triaxial derivation
//!
//! Single-axis sensors only measure H. V and A are then estimated with
//! fixed ratios typical of horizontal rotating machinery; they are
//! approximations, not measurements, and are reported as such.

use crate::config::defaults::{A_FROM_H, V_FROM_H};
use crate::types::{AxisSpectra, SecondaryAxes};

use super::{clean, rms};

/// Per-axis magnitudes plus where each came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMagnitudes {
    pub h: f64,
    pub v: f64,
    pub a: f64,
    pub v_measured: bool,
    pub a_measured: bool,
}

/// Derive V and A from secondary waveforms when present, else by proxy.
pub fn derive_magnitudes(h_rms: f64, secondary: Option<&SecondaryAxes>) -> AxisMagnitudes {
    let measured = |axis: Option<&Vec<f64>>| -> Option<f64> {
        let samples = clean(axis?);
        (samples.len() >= 2).then(|| rms(&samples))
    };

    let v = secondary.and_then(|s| measured(s.v.as_ref()));
    let a = secondary.and_then(|s| measured(s.a.as_ref()));

    AxisMagnitudes {
        h: h_rms,
        v: v.unwrap_or(h_rms * V_FROM_H),
        a: a.unwrap_or(h_rms * A_FROM_H),
        v_measured: v.is_some(),
        a_measured: a.is_some(),
    }
}

/// Leading `window` clean samples of each available axis.
///
/// Axes without a real waveform stay empty; the entropy lens then treats
/// them as carrying no energy.
pub fn spectra_window(
    primary: &[f64],
    secondary: Option<&SecondaryAxes>,
    window: usize,
) -> AxisSpectra {
    let head = |values: &[f64]| -> Vec<f64> { clean(values).into_iter().take(window).collect() };

    AxisSpectra {
        h: head(primary),
        v: secondary
            .and_then(|s| s.v.as_deref())
            .map(head)
            .unwrap_or_default(),
        a: secondary
            .and_then(|s| s.a.as_deref())
            .map(head)
            .unwrap_or_default(),
    }
}
