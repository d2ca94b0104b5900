use std::fmt;

use serde::Serialize;

use crate::error::{ensure_non_negative, Result, SimError};
use crate::models::FrequencyResponse;

/// `20·log10|H|` at the response sample nearest to `target_hz`.
pub fn attenuation_db(response: &FrequencyResponse, target_hz: f64) -> Result<f64> {
    Ok(20.0 * attenuation_ratio(response, target_hz)?.log10())
}

/// `|H|` (voltage ratio) at the response sample nearest to `target_hz`.
pub fn attenuation_ratio(response: &FrequencyResponse, target_hz: f64) -> Result<f64> {
    let idx = response.nearest_index(target_hz).ok_or(SimError::EmptyResponse)?;
    Ok(response.points[idx].1.norm())
}

/// Change in signal-to-noise ratio across the filter, in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "db", rename_all = "snake_case")]
pub enum SnrImprovement {
    Finite(f64),
    /// The filtered signal matches the clean one exactly.
    Infinite,
}

impl fmt::Display for SnrImprovement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SnrImprovement::Finite(db) => write!(f, "{:.1} dB", db),
            SnrImprovement::Infinite => write!(f, "∞ dB"),
        }
    }
}

/// Compares the amplitude SNR going in with the power SNR coming out:
///
/// `snr_in  = 20·log10(amplitude_signal / amplitude_noise)`
/// `snr_out = 10·log10(var(filtered) / var(filtered - clean))`
///
/// Variances are population variances. Note the input side is an amplitude
/// ratio and the output side a power ratio.
///
/// A zero residual is `Infinite` whatever the amplitudes. Otherwise a zero
/// amplitude goes through the formula unchanged: silent noise gives
/// `Finite(-inf)` and a silent signal `Finite(+inf)`. Negative or
/// non-finite amplitudes are `InvalidParameter`.
pub fn snr_improvement(
    clean: &[f64],
    filtered: &[f64],
    amplitude_signal: f64,
    amplitude_noise: f64,
) -> Result<SnrImprovement> {
    if clean.len() != filtered.len() {
        return Err(SimError::ShapeMismatch {
            left: clean.len(),
            right: filtered.len(),
        });
    }
    let residual: Vec<f64> = filtered.iter().zip(clean).map(|(f, c)| f - c).collect();
    let noise_power = variance(&residual);
    if noise_power == 0.0 {
        return Ok(SnrImprovement::Infinite);
    }

    let amplitude_signal = ensure_non_negative("signal amplitude", amplitude_signal)?;
    let amplitude_noise = ensure_non_negative("noise amplitude", amplitude_noise)?;

    let snr_in = 20.0 * (amplitude_signal / amplitude_noise).log10();
    let snr_out = 10.0 * (variance(filtered) / noise_power).log10();
    Ok(SnrImprovement::Finite(snr_out - snr_in))
}

fn variance(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}
