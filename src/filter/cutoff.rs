use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result};
use crate::models::{FilterBand, FilterSpec};

/// Where a low/high-pass cutoff comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CutoffSource {
    /// Cutoff given in Hz.
    Direct { hz: f64 },
    /// First-order RC section: ohms and farads.
    Rc { resistance: f64, capacitance: f64 },
    /// Time constant in seconds.
    TimeConstant { tau: f64 },
}

impl CutoffSource {
    /// Cutoff frequency in Hz. A direct cutoff is passed through as given;
    /// the designer rejects it against the sample rate.
    pub fn resolve(&self) -> Result<f64> {
        match *self {
            CutoffSource::Direct { hz } => Ok(hz),
            CutoffSource::Rc { resistance, capacitance } => rc_cutoff(resistance, capacitance),
            CutoffSource::TimeConstant { tau } => {
                let tau = ensure_positive("time constant", tau)?;
                Ok(1.0 / (TAU * tau))
            }
        }
    }
}

/// `fc = 1 / (2πRC)`.
pub fn rc_cutoff(resistance: f64, capacitance: f64) -> Result<f64> {
    let r = ensure_positive("resistance", resistance)?;
    let c = ensure_positive("capacitance", capacitance)?;
    Ok(1.0 / (TAU * r * c))
}

/// `τ = 1 / (2π fc)`, in seconds.
pub fn time_constant(cutoff_hz: f64) -> Result<f64> {
    let fc = ensure_positive("cutoff frequency", cutoff_hz)?;
    Ok(1.0 / (TAU * fc))
}

/// Geometric mean of the signal and noise frequencies, a reasonable first
/// guess for a cutoff that separates them.
pub fn estimated_cutoff(signal_hz: f64, noise_hz: f64) -> Result<f64> {
    let s = ensure_positive("signal frequency", signal_hz)?;
    let n = ensure_positive("noise frequency", noise_hz)?;
    Ok((s * n).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum BandRequest {
    LowPass { cutoff: CutoffSource },
    HighPass { cutoff: CutoffSource },
    BandPass { low_hz: f64, high_hz: f64 },
}

/// Filter as a user asks for it, before the sample rate is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub band: BandRequest,
    pub order: usize,
}

impl Default for FilterRequest {
    fn default() -> Self {
        FilterRequest::low_pass(CutoffSource::Direct { hz: 30.0 }, 4)
    }
}

impl FilterRequest {
    pub fn low_pass(cutoff: CutoffSource, order: usize) -> Self {
        FilterRequest { band: BandRequest::LowPass { cutoff }, order }
    }

    pub fn high_pass(cutoff: CutoffSource, order: usize) -> Self {
        FilterRequest { band: BandRequest::HighPass { cutoff }, order }
    }

    pub fn band_pass(low_hz: f64, high_hz: f64, order: usize) -> Self {
        FilterRequest { band: BandRequest::BandPass { low_hz, high_hz }, order }
    }

    /// Turns the request into a concrete spec at `sample_rate`. Range checks
    /// against Nyquist are left to the designer.
    pub fn resolve(&self, sample_rate: f64) -> Result<FilterSpec> {
        let band = match self.band {
            BandRequest::LowPass { cutoff } => {
                FilterBand::LowPass { cutoff_hz: cutoff.resolve()? }
            }
            BandRequest::HighPass { cutoff } => {
                FilterBand::HighPass { cutoff_hz: cutoff.resolve()? }
            }
            BandRequest::BandPass { low_hz, high_hz } => FilterBand::BandPass { low_hz, high_hz },
        };
        Ok(FilterSpec::new(band, self.order, sample_rate))
    }
}
