use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::FilterRequest;
use crate::models::{NoiseKind, NoiseSpec, WaveformShape, WaveformSpec};
use crate::utils;

pub const DEFAULT_SAMPLE_RATE: f64 = 1000.0;
pub const DEFAULT_DURATION: f64 = 2.0;
pub const DEFAULT_RESPONSE_POINTS: usize = 8000;
pub const DEFAULT_PREVIEW_SAMPLES: usize = 500;

/// Everything one pipeline run needs. Callers own this record and pass it in
/// explicitly; nothing in the crate keeps it between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub waveform: WaveformSpec,
    pub noise: NoiseSpec,
    pub filter: FilterRequest,
    pub sample_rate: f64,
    pub duration: f64,
    pub response_points: usize,
    /// Frequency window (Hz) used for spectra and responses in reports.
    pub display_band: (f64, f64),
    /// How many leading samples of each signal go into a preview.
    pub preview_samples: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            waveform: WaveformSpec::new(WaveformShape::Sine, 1.0, 10.0),
            noise: NoiseSpec::new(NoiseKind::FixedTone, 0.3, 50.0),
            filter: FilterRequest::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
            response_points: DEFAULT_RESPONSE_POINTS,
            display_band: (0.0, 100.0),
            preview_samples: DEFAULT_PREVIEW_SAMPLES,
        }
    }
}

impl SimulationConfig {
    /// Defaults overlaid with `FILTER_SIM_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overrides sampling settings from the environment. Unset or
    /// unparsable variables leave the current value untouched.
    pub fn apply_env(&mut self) {
        if let Some(rate) = env_value::<f64>("FILTER_SIM_SAMPLE_RATE") {
            self.sample_rate = rate;
        }
        if let Some(duration) = env_value::<f64>("FILTER_SIM_DURATION") {
            self.duration = duration;
        }
        if let Some(points) = env_value::<usize>("FILTER_SIM_RESPONSE_POINTS") {
            self.response_points = points;
        }
    }

    /// Reads a JSON config file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("couldn't read config {}: {}", path.as_ref().display(), e))?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

fn env_value<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = utils::get_env(key, None);
    if raw.is_empty() {
        return None;
    }
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CutoffSource, FilterRequest};
    use std::io::Write;

    #[test]
    fn test_default_matches_reference_page() {
        let config = SimulationConfig::default();
        assert_eq!(config.sample_rate, 1000.0);
        assert_eq!(config.duration, 2.0);
        assert_eq!(config.waveform.frequency, 10.0);
        assert_eq!(config.noise.frequency, 50.0);
        assert_eq!(
            config.filter,
            FilterRequest::low_pass(CutoffSource::Direct { hz: 30.0 }, 4)
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = r#"{
            "duration": 1.0,
            "noise": {
                "kind": {"type": "band_limited", "half_width": 5.0},
                "amplitude": 0.3,
                "frequency": 60.0
            }
        }"#;
        write!(file, "{}", raw).unwrap();

        let config = SimulationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.duration, 1.0);
        assert_eq!(config.sample_rate, 1000.0);
        assert_eq!(config.noise.kind, NoiseKind::BandLimited { half_width: 5.0 });
        assert_eq!(config.noise.frequency, 60.0);
    }

    #[test]
    fn test_env_overlay_and_bad_values() {
        // Only this test touches FILTER_SIM_* variables.
        unsafe {
            std::env::set_var("FILTER_SIM_SAMPLE_RATE", " 2000 ");
            std::env::set_var("FILTER_SIM_DURATION", "abc");
            std::env::set_var("FILTER_SIM_RESPONSE_POINTS", "256");
        }
        let config = SimulationConfig::from_env();
        assert_eq!(config.sample_rate, 2000.0);
        assert_eq!(config.duration, 2.0);
        assert_eq!(config.response_points, 256);

        unsafe {
            std::env::remove_var("FILTER_SIM_SAMPLE_RATE");
            std::env::remove_var("FILTER_SIM_DURATION");
            std::env::remove_var("FILTER_SIM_RESPONSE_POINTS");
        }
        let config = SimulationConfig::from_env();
        assert_eq!(config.sample_rate, SimulationConfig::default().sample_rate);
        assert_eq!(config.response_points, SimulationConfig::default().response_points);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(SimulationConfig::from_json_file("/nonexistent/filter-sim.json").is_err());
    }
}
