use std::f64::consts::{PI, TAU};

use num_complex::Complex;

use crate::error::{Result, SimError};
use crate::models::{FilterCoefficients, FrequencyResponse};

/// Evaluates `H(e^{jω}) = B(e^{-jω}) / A(e^{-jω})` at `num_points` evenly
/// spaced frequencies `ω_k = πk/num_points`, covering `[0, Nyquist)`.
pub fn frequency_response(
    coeffs: &FilterCoefficients,
    sample_rate: f64,
    num_points: usize,
) -> Result<FrequencyResponse> {
    if num_points == 0 {
        return Err(SimError::InvalidParameter {
            name: "response points",
            value: 0.0,
        });
    }

    let points = (0..num_points)
        .map(|k| {
            let w = PI * k as f64 / num_points as f64;
            let h = evaluate(coeffs.b(), w) / evaluate(coeffs.a(), w);
            (w * sample_rate / TAU, h)
        })
        .collect();
    Ok(FrequencyResponse { points })
}

/// `Σ c[m]·e^{-jωm}`
fn evaluate(coefficients: &[f64], w: f64) -> Complex<f64> {
    coefficients
        .iter()
        .enumerate()
        .map(|(m, &c)| Complex::from_polar(c, -w * m as f64))
        .sum()
}

/// Removes jumps larger than π between consecutive phase samples by adding
/// multiples of 2π.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut correction = 0.0;
    for (i, &p) in phase.iter().enumerate() {
        if i > 0 {
            let d = p - phase[i - 1];
            let mut wrapped = (d + PI).rem_euclid(TAU) - PI;
            if wrapped == -PI && d > 0.0 {
                wrapped = PI;
            }
            if d.abs() >= PI {
                correction += wrapped - d;
            }
        }
        out.push(p + correction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::design;
    use crate::models::FilterSpec;

    #[test]
    fn test_lowpass_half_power_and_rolloff() {
        let coeffs = design(&FilterSpec::low_pass(30.0, 4, 1000.0)).unwrap();
        let response = frequency_response(&coeffs, 1000.0, 8000).unwrap();
        assert_eq!(response.len(), 8000);
        assert_eq!(response.points[0].0, 0.0);
        assert!(response.points[7999].0 < 500.0);

        let mags = response.magnitude();
        let at_fc = response.nearest_index(30.0).unwrap();
        assert!(mags[at_fc] >= 0.5);
        assert!((mags[at_fc] - 0.5_f64.sqrt()).abs() < 1e-6);

        // Non-increasing for three octaves above the cutoff.
        let end = response.nearest_index(240.0).unwrap();
        for i in at_fc..end {
            assert!(mags[i + 1] <= mags[i] + 1e-12, "rise at {} Hz", response.points[i].0);
        }
        assert!((mags[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bandpass_edges_and_centre() {
        let coeffs = design(&FilterSpec::band_pass(15.0, 35.0, 2, 1000.0)).unwrap();
        let response = frequency_response(&coeffs, 1000.0, 8000).unwrap();
        let mags = response.magnitude();
        let lo = mags[response.nearest_index(15.0).unwrap()];
        let hi = mags[response.nearest_index(35.0).unwrap()];
        assert!((lo - 0.5_f64.sqrt()).abs() < 1e-6);
        assert!((hi - 0.5_f64.sqrt()).abs() < 1e-6);

        let (peak_idx, peak) = mags
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert!((peak - 1.0).abs() < 1e-6);
        assert!((response.points[peak_idx].0 - (15.0_f64 * 35.0).sqrt()).abs() < 0.5);
    }

    #[test]
    fn test_magnitude_db_and_phase() {
        let coeffs = design(&FilterSpec::low_pass(30.0, 4, 1000.0)).unwrap();
        let response = frequency_response(&coeffs, 1000.0, 8000).unwrap();
        let db = response.magnitude_db();
        assert!((db[response.nearest_index(30.0).unwrap()] + 3.0103).abs() < 1e-3);

        let phase = response.phase_degrees();
        assert_eq!(phase[0], 0.0);
        // Unwrapped phase keeps falling through the pass band: -4·45° at fc.
        assert!((phase[response.nearest_index(30.0).unwrap()] + 180.0).abs() < 1.0);
        let windowed = response.band(0.0, 100.0);
        assert!(windowed.points.iter().all(|&(f, _)| f <= 100.0));
    }

    #[test]
    fn test_zero_points_rejected() {
        let coeffs = design(&FilterSpec::low_pass(30.0, 2, 1000.0)).unwrap();
        assert!(matches!(
            frequency_response(&coeffs, 1000.0, 0),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_unwrap_phase() {
        let wrapped = [0.0, 3.0, -3.0, -1.0];
        let unwrapped = unwrap_phase(&wrapped);
        assert_eq!(unwrapped[0], 0.0);
        assert_eq!(unwrapped[1], 3.0);
        assert!((unwrapped[2] - (TAU - 3.0)).abs() < 1e-12);
        assert!((unwrapped[3] - (TAU - 1.0)).abs() < 1e-12);
        assert!(unwrap_phase(&[]).is_empty());
    }
}
