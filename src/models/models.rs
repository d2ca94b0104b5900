use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Samples of a real-valued signal, indexed like the `TimeGrid` it came from.
pub type Signal = Vec<f64>;

/// Uniform sampling instants `t_i = i / sample_rate` for `i in 0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    sample_rate: f64,
    len: usize,
}

impl TimeGrid {
    /// Builds a grid spanning `duration` seconds, i.e. `round(duration * sample_rate)` samples.
    pub fn new(sample_rate: f64, duration: f64) -> Result<Self> {
        let valid = sample_rate.is_finite()
            && sample_rate > 0.0
            && duration.is_finite()
            && duration > 0.0;
        let len = (duration * sample_rate).round();
        if !valid || len < 1.0 {
            return Err(SimError::InvalidGrid { sample_rate, duration });
        }
        Ok(TimeGrid { sample_rate, len: len as usize })
    }

    /// Builds a grid with an explicit number of samples.
    pub fn with_samples(sample_rate: f64, len: usize) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) || len == 0 {
            return Err(SimError::InvalidGrid {
                sample_rate,
                duration: len as f64 / sample_rate,
            });
        }
        Ok(TimeGrid { sample_rate, len })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn step(&self) -> f64 {
        1.0 / self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.len as f64 / self.sample_rate
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Timestamp of sample `i`.
    pub fn time(&self, i: usize) -> f64 {
        i as f64 / self.sample_rate
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.time(i))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.times().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveformShape {
    Sine,
    Square,
    Sawtooth,
}

/// Parameters of the clean test waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformSpec {
    pub shape: WaveformShape,
    pub amplitude: f64,
    pub frequency: f64,
    /// Phase offset in radians, subtracted from `2π f t`.
    #[serde(default)]
    pub phase: f64,
}

impl WaveformSpec {
    pub fn new(shape: WaveformShape, amplitude: f64, frequency: f64) -> Self {
        WaveformSpec { shape, amplitude, frequency, phase: 0.0 }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseKind {
    /// Deterministic interfering tone.
    FixedTone,
    /// Tone whose phase is drawn once per generation.
    RandomPhaseTone,
    /// Gaussian noise, independent per sample.
    White,
    /// Gaussian noise confined to `frequency ± half_width`, normalized to unit peak.
    BandLimited { half_width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub kind: NoiseKind,
    pub amplitude: f64,
    pub frequency: f64,
}

impl NoiseSpec {
    pub fn new(kind: NoiseKind, amplitude: f64, frequency: f64) -> Self {
        NoiseSpec { kind, amplitude, frequency }
    }
}

/// Filter family together with the edge frequencies it needs, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FilterBand {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
}

impl FilterBand {
    pub fn name(&self) -> &'static str {
        match self {
            FilterBand::LowPass { .. } => "low-pass",
            FilterBand::HighPass { .. } => "high-pass",
            FilterBand::BandPass { .. } => "band-pass",
        }
    }

    /// Edge frequencies in Hz: one for low/high-pass, two for band-pass.
    pub fn edges(&self) -> Vec<f64> {
        match *self {
            FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
                vec![cutoff_hz]
            }
            FilterBand::BandPass { low_hz, high_hz } => vec![low_hz, high_hz],
        }
    }
}

/// A complete Butterworth request: band, prototype order and sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub band: FilterBand,
    pub order: usize,
    pub sample_rate: f64,
}

impl FilterSpec {
    pub const MIN_ORDER: usize = 1;
    pub const MAX_ORDER: usize = 10;

    pub fn new(band: FilterBand, order: usize, sample_rate: f64) -> Self {
        FilterSpec { band, order, sample_rate }
    }

    pub fn low_pass(cutoff_hz: f64, order: usize, sample_rate: f64) -> Self {
        Self::new(FilterBand::LowPass { cutoff_hz }, order, sample_rate)
    }

    pub fn high_pass(cutoff_hz: f64, order: usize, sample_rate: f64) -> Self {
        Self::new(FilterBand::HighPass { cutoff_hz }, order, sample_rate)
    }

    pub fn band_pass(low_hz: f64, high_hz: f64, order: usize, sample_rate: f64) -> Self {
        Self::new(FilterBand::BandPass { low_hz, high_hz }, order, sample_rate)
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Edge frequencies divided by Nyquist.
    pub fn normalized_cutoffs(&self) -> Vec<f64> {
        let nyquist = self.nyquist();
        self.band.edges().into_iter().map(|f| f / nyquist).collect()
    }

    /// Human-readable cutoff, e.g. "30.00 Hz" or "15.00-35.00 Hz".
    pub fn cutoff_summary(&self) -> String {
        match self.band {
            FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
                format!("{:.2} Hz", cutoff_hz)
            }
            FilterBand::BandPass { low_hz, high_hz } => format!("{:.2}-{:.2} Hz", low_hz, high_hz),
        }
    }
}

/// Transfer function `B(z)/A(z)` produced by the designer. `a[0]` is 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCoefficients {
    spec: FilterSpec,
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    pub(crate) fn new(spec: FilterSpec, b: Vec<f64>, a: Vec<f64>) -> Self {
        FilterCoefficients { spec, b, a }
    }

    /// The validated request these coefficients realize.
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Feed-forward coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Feedback coefficients.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Number of poles of the realized digital filter.
    pub fn order(&self) -> usize {
        self.a.len().saturating_sub(1)
    }
}

/// Magnitude spectrum of a signal over strictly positive frequencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spectrum {
    pub bins: Vec<(f64, f64)>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.bins.iter().map(|&(f, _)| f).collect()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|&(_, m)| m).collect()
    }

    /// Bin with the largest magnitude.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.bins
            .iter()
            .copied()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Bins with `low_hz <= f <= high_hz`.
    pub fn band(&self, low_hz: f64, high_hz: f64) -> Spectrum {
        Spectrum {
            bins: self
                .bins
                .iter()
                .copied()
                .filter(|&(f, _)| f >= low_hz && f <= high_hz)
                .collect(),
        }
    }
}

/// Complex filter response sampled on `[0, Nyquist)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyResponse {
    pub points: Vec<(f64, Complex<f64>)>,
}

impl FrequencyResponse {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.points.iter().map(|&(f, _)| f).collect()
    }

    /// `|H(f)|` as a voltage ratio.
    pub fn magnitude(&self) -> Vec<f64> {
        self.points.iter().map(|(_, h)| h.norm()).collect()
    }

    /// `20·log10|H(f)|`.
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.points.iter().map(|(_, h)| 20.0 * h.norm().log10()).collect()
    }

    /// Unwrapped phase in degrees.
    pub fn phase_degrees(&self) -> Vec<f64> {
        let wrapped: Vec<f64> = self.points.iter().map(|(_, h)| h.arg()).collect();
        crate::analysis::unwrap_phase(&wrapped)
            .into_iter()
            .map(f64::to_degrees)
            .collect()
    }

    /// Index of the sample whose frequency is closest to `target_hz`.
    pub fn nearest_index(&self, target_hz: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.0 - target_hz)
                    .abs()
                    .partial_cmp(&(b.0 - target_hz).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Samples with `low_hz <= f <= high_hz`.
    pub fn band(&self, low_hz: f64, high_hz: f64) -> FrequencyResponse {
        FrequencyResponse {
            points: self
                .points
                .iter()
                .copied()
                .filter(|&(f, _)| f >= low_hz && f <= high_hz)
                .collect(),
        }
    }
}
