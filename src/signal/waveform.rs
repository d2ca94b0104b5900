use std::f64::consts::{PI, TAU};

use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::models::{Signal, TimeGrid, WaveformShape, WaveformSpec};

/// Generates the clean test waveform over `grid`.
pub fn generate(spec: &WaveformSpec, grid: &TimeGrid) -> Result<Signal> {
    let amplitude = ensure_non_negative("waveform amplitude", spec.amplitude)?;
    let frequency = ensure_positive("waveform frequency", spec.frequency)?;

    let signal = grid
        .times()
        .map(|t| {
            let theta = TAU * frequency * t - spec.phase;
            amplitude * unit_sample(spec.shape, theta)
        })
        .collect();
    Ok(signal)
}

/// Value of a unit-amplitude waveform at phase angle `theta` (radians).
fn unit_sample(shape: WaveformShape, theta: f64) -> f64 {
    match shape {
        WaveformShape::Sine => theta.sin(),
        WaveformShape::Square => {
            // Positive half period first, matching the sign of sin(theta).
            if theta.rem_euclid(TAU) < PI { 1.0 } else { -1.0 }
        }
        WaveformShape::Sawtooth => theta.rem_euclid(TAU) / PI - 1.0,
    }
}
