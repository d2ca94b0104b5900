use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use slog::{debug, info, Logger};

use crate::analysis::{
    attenuation_db, attenuation_ratio, frequency_response, snr_improvement, spectrum,
    SnrImprovement,
};
use crate::error::Result;
use crate::filter::{apply, design, estimated_cutoff, time_constant};
use crate::models::{
    FilterBand, FilterCoefficients, FrequencyResponse, NoiseKind, Signal, SimulationConfig,
    Spectrum, TimeGrid,
};
use crate::signal::{mix, noise, waveform};

/// Scalar figures shown next to the plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub family: &'static str,
    pub order: usize,
    pub cutoff: String,
    /// `1/(2π fc)` for low/high-pass designs.
    pub time_constant_s: Option<f64>,
    /// Geometric mean of the signal and noise frequencies.
    pub suggested_cutoff_hz: Option<f64>,
    /// One-pass `20·log10|H|` at the noise frequency.
    pub noise_attenuation_db: f64,
    /// One-pass `|H|` at the noise frequency.
    pub noise_ratio: f64,
    /// `|H|²` at the noise frequency, the gain a forward-backward pass applies.
    pub noise_ratio_zero_phase: f64,
    /// `Finite(±inf)` when one of the amplitudes is zero.
    pub snr_improvement: SnrImprovement,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub time: Vec<f64>,
    pub clean: Signal,
    pub noise: Signal,
    pub composite: Signal,
    pub filtered: Signal,
    pub coefficients: FilterCoefficients,
    pub input_spectrum: Spectrum,
    pub filtered_spectrum: Spectrum,
    pub response: FrequencyResponse,
    pub summary: FilterSummary,
    pub display_band: (f64, f64),
}

/// Leading samples of the time-domain signals.
#[derive(Debug, Serialize)]
pub struct SignalPreview<'a> {
    pub time: &'a [f64],
    pub clean: &'a [f64],
    pub composite: &'a [f64],
    pub filtered: &'a [f64],
}

/// Spectra and response cut down to the display band.
#[derive(Debug, Serialize)]
pub struct DisplayWindow {
    pub input_spectrum: Spectrum,
    pub filtered_spectrum: Spectrum,
    pub response: FrequencyResponse,
}

impl SimulationReport {
    /// First `n` samples of each signal (all of them if shorter).
    pub fn preview(&self, n: usize) -> SignalPreview<'_> {
        let n = n.min(self.time.len());
        SignalPreview {
            time: &self.time[..n],
            clean: &self.clean[..n],
            composite: &self.composite[..n],
            filtered: &self.filtered[..n],
        }
    }

    pub fn display_window(&self) -> DisplayWindow {
        let (low, high) = self.display_band;
        DisplayWindow {
            input_spectrum: self.input_spectrum.band(low, high),
            filtered_spectrum: self.filtered_spectrum.band(low, high),
            response: self.response.band(low, high),
        }
    }
}

/// Runs generate → mix → design → filter → analyze for `config`.
///
/// All randomness comes from `rng`, so a seeded generator reproduces a run.
pub fn simulate<R: Rng>(
    config: &SimulationConfig,
    logger: &Logger,
    rng: &mut R,
) -> Result<SimulationReport> {
    let start = Instant::now();
    let grid = TimeGrid::new(config.sample_rate, config.duration)?;

    let clean = waveform::generate(&config.waveform, &grid)?;
    let noise = noise::generate(&config.noise, &grid, rng)?;
    let band_limited = matches!(config.noise.kind, NoiseKind::BandLimited { .. });
    if band_limited && noise.iter().all(|&v| v == 0.0) {
        info!(logger, "noise band holds no FFT bins, noise is silent";
            "frequency" => config.noise.frequency);
    }
    let composite = mix(&clean, &noise)?;

    let spec = config.filter.resolve(grid.sample_rate())?;
    let coefficients = design(&spec)?;
    info!(logger, "filter designed";
        "family" => spec.band.name(),
        "order" => spec.order,
        "cutoff" => spec.cutoff_summary());

    let filtered = apply(&coefficients, &composite)?;

    let input_spectrum = spectrum(&composite, grid.sample_rate());
    let filtered_spectrum = spectrum(&filtered, grid.sample_rate());
    let response = frequency_response(&coefficients, grid.sample_rate(), config.response_points)?;

    let noise_ratio = attenuation_ratio(&response, config.noise.frequency)?;
    let snr = snr_improvement(
        &clean,
        &filtered,
        config.waveform.amplitude,
        config.noise.amplitude,
    )?;
    if snr == SnrImprovement::Infinite {
        debug!(logger, "filtered signal matches the clean signal exactly");
    }

    let time_constant_s = match spec.band {
        FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
            Some(time_constant(cutoff_hz)?)
        }
        FilterBand::BandPass { .. } => None,
    };

    let summary = FilterSummary {
        family: spec.band.name(),
        order: spec.order,
        cutoff: spec.cutoff_summary(),
        time_constant_s,
        suggested_cutoff_hz: estimated_cutoff(config.waveform.frequency, config.noise.frequency)
            .ok(),
        noise_attenuation_db: attenuation_db(&response, config.noise.frequency)?,
        noise_ratio,
        noise_ratio_zero_phase: noise_ratio * noise_ratio,
        snr_improvement: snr,
    };

    debug!(logger, "simulation finished";
        "samples" => grid.len(),
        "elapsed_ms" => start.elapsed().as_secs_f64() * 1000.0);

    Ok(SimulationReport {
        time: grid.to_vec(),
        clean,
        noise,
        composite,
        filtered,
        coefficients,
        input_spectrum,
        filtered_spectrum,
        response,
        summary,
        display_band: config.display_band,
    })
}

/// Same as [`simulate`], using the thread-local generator.
pub fn simulate_default(config: &SimulationConfig, logger: &Logger) -> Result<SimulationReport> {
    simulate(config, logger, &mut rand::rng())
}
