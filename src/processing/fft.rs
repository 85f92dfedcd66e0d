//! FFT computation using rustfft
//!
//! One-sided power spectra for the stability lens. The transform runs at
//! the exact input length (no zero padding) so bin k sits at k·fs/n.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use super::{normalized_shannon, ProcessingError};

/// Pre-planned forward FFT of a fixed length.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    size: usize,
}

impl FftProcessor {
    /// Plan a forward FFT for `size` samples.
    pub fn new(size: usize) -> Result<Self, ProcessingError> {
        if size < 2 {
            return Err(ProcessingError::InsufficientData {
                needed: 2,
                available: size,
            });
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Ok(Self { fft, size })
    }

    /// Squared magnitudes of bins 1..=n/2 (DC dropped, Nyquist kept for
    /// even n).
    pub fn power_spectrum(&self, signal: &[f64]) -> Result<Vec<f64>, ProcessingError> {
        if signal.len() != self.size {
            return Err(ProcessingError::FftError(format!(
                "planned for {} samples, got {}",
                self.size,
                signal.len()
            )));
        }

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        self.fft.process(&mut buffer);

        let power: Vec<f64> = buffer
            .iter()
            .take(self.size / 2 + 1)
            .skip(1)
            .map(Complex::norm_sqr)
            .collect();

        if power.iter().any(|p| !p.is_finite()) {
            return Err(ProcessingError::NonFinite("power spectrum"));
        }
        Ok(power)
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Normalised Shannon entropy of the one-sided power spectrum.
///
/// 0 for a silent signal; near 1 for white noise; near 0 for a pure tone.
pub fn spectral_entropy(signal: &[f64]) -> Result<f64, ProcessingError> {
    let processor = FftProcessor::new(signal.len())?;
    let power = processor.power_spectrum(signal)?;
    let magnitude_sum: f64 = power.iter().map(|p| p.sqrt()).sum();
    if magnitude_sum < 1e-12 {
        return Ok(0.0);
    }
    Ok(normalized_shannon(&power))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn tone(n: usize, cycles: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * cycles * i as f64 / n as f64).sin())
            .collect()
    }

    #[test]
    fn test_power_spectrum_bin_count() {
        let processor = FftProcessor::new(256).unwrap();
        let power = processor.power_spectrum(&tone(256, 8.0)).unwrap();
        assert_eq!(power.len(), 128);
        let odd = FftProcessor::new(255).unwrap();
        assert_eq!(odd.power_spectrum(&tone(255, 8.0)).unwrap().len(), 127);
    }

    #[test]
    fn test_tone_energy_lands_in_its_bin() {
        let processor = FftProcessor::new(256).unwrap();
        let power = processor.power_spectrum(&tone(256, 8.0)).unwrap();
        let (idx, _) = power
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, p)| if *p > best.1 { (i, *p) } else { best });
        // bin 8 sits at index 7 once DC is dropped
        assert_eq!(idx, 7);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let processor = FftProcessor::new(64).unwrap();
        assert!(processor.power_spectrum(&[0.0; 32]).is_err());
        assert!(FftProcessor::new(1).is_err());
    }

    #[test]
    fn test_spectral_entropy_orders_tone_below_noise() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise: Vec<f64> = (0..256).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let tone_se = spectral_entropy(&tone(256, 8.0)).unwrap();
        let noise_se = spectral_entropy(&noise).unwrap();
        assert!(tone_se < 0.1, "tone entropy {tone_se}");
        assert!(noise_se > 0.8, "noise entropy {noise_se}");
        assert_eq!(spectral_entropy(&[0.0; 64]).unwrap(), 0.0);
    }
}
