//! Signal intake records: raw samples, acquisition context and derived metrics.

use serde::{Deserialize, Deserializer, Serialize};

/// Physical quantity measured by the sensor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    #[default]
    Velocity,
    Acceleration,
    Displacement,
}

impl SignalType {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Velocity => "velocity",
            SignalType::Acceleration => "acceleration",
            SignalType::Displacement => "displacement",
        }
    }
}

/// Measurement direction tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    H,
    V,
    A,
    X,
    Y,
    Z,
    #[serde(rename = "RAD", alias = "radial")]
    Radial,
    #[serde(rename = "AX", alias = "axial")]
    Axial,
}

/// Sensor mounting method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    Stud,
    Adhesive,
    Magnet,
    Handheld,
    Pad,
}

/// Measurement location on the machine train.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Location {
    #[serde(rename = "DE")]
    DriveEnd,
    #[serde(rename = "NDE")]
    NonDriveEnd,
    #[serde(rename = "GB_IN")]
    GearboxInput,
    #[serde(rename = "GB_OUT")]
    GearboxOutput,
    #[serde(rename = "PUMP_DE")]
    PumpDriveEnd,
    #[serde(rename = "PUMP_NDE")]
    PumpNonDriveEnd,
    Casing,
}

/// One captured waveform.
///
/// JSON `null` samples are read as NaN so gaps survive the wire format; NaN
/// serializes back to `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignalInput {
    pub signal_type: SignalType,
    pub direction: Direction,
    pub unit: String,
    pub sampling_rate_hz: u32,
    #[serde(deserialize_with = "samples_with_gaps")]
    pub values: Vec<f64>,
}

/// Acquisition context supplied alongside a signal.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextInput {
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub sensor_range: Option<String>,
    #[serde(default)]
    pub mount_type: Option<MountType>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// Descriptive statistics computed once per signal by the data guard.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SignalMetrics {
    pub sample_count: usize,
    pub nan_fraction: f64,
    pub std_dev: f64,
    pub rms: f64,
    pub peak: f64,
    pub crest_factor: f64,
    pub kurtosis: f64,
    pub clip_fraction: f64,
}

pub(crate) fn samples_with_gaps<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_samples_become_nan() {
        let json = r#"{
            "signal_type": "velocity",
            "direction": "H",
            "unit": "mm/s",
            "sampling_rate_hz": 6400,
            "values": [1.0, null, 2.5]
        }"#;
        let signal: SignalInput = serde_json::from_str(json).unwrap();
        assert_eq!(signal.values.len(), 3);
        assert!(signal.values[1].is_nan());
        assert_eq!(signal.signal_type, SignalType::Velocity);
    }

    #[test]
    fn test_direction_aliases() {
        let d: Direction = serde_json::from_str("\"radial\"").unwrap();
        assert_eq!(d, Direction::Radial);
        let d: Direction = serde_json::from_str("\"AX\"").unwrap();
        assert_eq!(d, Direction::Axial);
    }
}
