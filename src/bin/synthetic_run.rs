//! Synthetic Bearing Degradation Run
//!
//! Generates one vibration capture per simulated day for a rolling-element
//! bearing that slowly wears out, and feeds each capture (plus the history
//! so far) through the full decision pipeline:
//! - Healthy running: shaft tone and broadband noise
//! - Defect onset: periodic impacts appear at the outer-race frequency
//! - Advanced wear: impacts grow and the overall level climbs
//! - Near failure: impacts dominate the waveform
//!
//! # Usage
//! ```bash
//! ./synthetic-run --days 60 --seed 7
//! ./synthetic-run --days 30 --format json > run.jsonl
//! ```

use std::f64::consts::PI;

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use rapid_ai::types::{ContextInput, Direction, FullAnalysisRequest, SignalInput, SignalType};
use rapid_ai::PipelineOrchestrator;

// ============================================================================
// Machine Constants
// ============================================================================

/// Sampling rate (Hz)
const SAMPLING_RATE: u32 = 6400;
/// Samples per capture
const CAPTURE_SAMPLES: usize = 2048;
/// Shaft speed (rpm)
const SHAFT_RPM: f64 = 1480.0;
/// Outer-race defect frequency as a multiple of shaft speed
const BPFO_ORDER: f64 = 3.57;
/// Healthy overall level (mm/s rms)
const BASE_LEVEL: f64 = 1.2;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synthetic-run")]
#[command(about = "Degrading bearing history fed through the RAPID AI pipeline")]
#[command(version)]
struct Args {
    /// Number of simulated days
    #[arg(short, long, default_value = "45", value_parser = clap::value_parser!(u32).range(2..=365))]
    days: u32,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Failure threshold (mm/s rms)
    #[arg(long, default_value = "8.0")]
    threshold: f64,
}

// ============================================================================
// Degradation Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// No defect (0-40%)
    Healthy,
    /// Impacts first visible (40-70%)
    Onset,
    /// Growing impacts and overall level (70-90%)
    Advanced,
    /// Impacts dominate (90-100%)
    NearFailure,
}

impl Phase {
    fn from_progress(progress: f64) -> Self {
        match progress {
            p if p < 0.40 => Phase::Healthy,
            p if p < 0.70 => Phase::Onset,
            p if p < 0.90 => Phase::Advanced,
            _ => Phase::NearFailure,
        }
    }

    /// Overall level multiplier and impact amplitude (mm/s).
    fn severity(&self, progress: f64) -> (f64, f64) {
        match self {
            Phase::Healthy => (1.0, 0.0),
            Phase::Onset => (1.0 + (progress - 0.40), 0.8),
            Phase::Advanced => (1.3 + 3.0 * (progress - 0.70), 2.5),
            Phase::NearFailure => (1.9 + 8.0 * (progress - 0.90), 6.0),
        }
    }
}

// ============================================================================
// Signal Synthesis
// ============================================================================

struct BearingSimulator {
    rng: StdRng,
    noise: Normal<f64>,
}

impl BearingSimulator {
    fn new(seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            noise: Normal::new(0.0, 0.35)?,
        })
    }

    /// One capture at the given degradation progress in [0, 1].
    fn capture(&mut self, progress: f64) -> Vec<f64> {
        let phase = Phase::from_progress(progress);
        let (level, impact) = phase.severity(progress);

        let shaft_hz = SHAFT_RPM / 60.0;
        let impact_period = (SAMPLING_RATE as f64 / (shaft_hz * BPFO_ORDER)).round() as usize;
        let dt = 1.0 / SAMPLING_RATE as f64;

        (0..CAPTURE_SAMPLES)
            .map(|i| {
                let t = i as f64 * dt;
                let tone = BASE_LEVEL * std::f64::consts::SQRT_2 * (2.0 * PI * shaft_hz * t).sin();
                // decaying ring-down after each impact
                let since = i % impact_period.max(1);
                let ring = impact * (-(since as f64) / 6.0).exp() * (2.0 * PI * 1800.0 * t).sin();
                level * (tone + self.noise.sample(&mut self.rng)) + ring
            })
            .collect()
    }
}

fn rms(values: &[f64]) -> f64 {
    (values.iter().map(|v| v * v).sum::<f64>() / values.len().max(1) as f64).sqrt()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let json = args.format == "json";

    let pipeline = PipelineOrchestrator::from_global();
    let mut sim = BearingSimulator::new(args.seed)?;
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0).single().unwrap_or_else(Utc::now);

    let mut history_values: Vec<f64> = Vec::new();
    let mut history_timestamps: Vec<String> = Vec::new();

    if !json {
        println!(
            "{:>4}  {:>8}  {:>8}  {:>10}  {:>9}  {:>10}  action",
            "day", "rms", "severity", "stage", "RUL_days", "window"
        );
    }

    for day in 0..args.days {
        let progress = day as f64 / (args.days - 1) as f64;
        let values = sim.capture(progress);
        let timestamp = (start + Duration::days(i64::from(day))).to_rfc3339();

        history_values.push(rms(&values));
        history_timestamps.push(timestamp.clone());

        let request = FullAnalysisRequest {
            asset_id: "PUMP-101".to_string(),
            timestamp_utc: timestamp,
            component: "afb".to_string(),
            signal: SignalInput {
                signal_type: SignalType::Velocity,
                direction: Direction::H,
                unit: "mm/s".to_string(),
                sampling_rate_hz: SAMPLING_RATE,
                values,
            },
            context: Some(ContextInput {
                rpm: Some(SHAFT_RPM),
                temperature_c: Some(45.0 + 25.0 * progress),
                ..ContextInput::default()
            }),
            historical_values: Some(history_values.clone()),
            historical_timestamps: Some(history_timestamps.clone()),
            failure_threshold: args.threshold,
            operating_hours: Some(8_000.0 + 24.0 * f64::from(day)),
            ..FullAnalysisRequest::default()
        };

        let response = pipeline.evaluate(request).await?;

        if json {
            println!("{}", serde_json::to_string(&response)?);
        } else {
            let rul = response
                .rul_days
                .map_or_else(|| "-".to_string(), |d| format!("{d:.1}"));
            println!(
                "{:>4}  {:>8.3}  {:>8}  {:>10}  {:>9}  {:>10}  {}",
                day,
                history_values.last().copied().unwrap_or_default(),
                response.final_severity_level.to_string(),
                response.health_stage.to_string(),
                rul,
                response.recommended_window,
                response.recommended_action
            );
        }
    }

    Ok(())
}
