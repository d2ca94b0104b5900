use std::f64::consts::TAU;

use num_complex::Complex;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::models::{NoiseKind, NoiseSpec, Signal, TimeGrid};
use crate::signal::fft::{fft_frequencies, ifft};

/// Generates the interference signal described by `spec`, drawing any
/// randomness from `rng`.
///
/// `BandLimited` noise is normalized to a unit peak and ignores
/// `spec.amplitude`; the other kinds scale by it.
pub fn generate<R: Rng>(spec: &NoiseSpec, grid: &TimeGrid, rng: &mut R) -> Result<Signal> {
    let amplitude = ensure_non_negative("noise amplitude", spec.amplitude)?;

    let noise = match spec.kind {
        NoiseKind::FixedTone => {
            let frequency = ensure_positive("noise frequency", spec.frequency)?;
            tone(amplitude, frequency, 0.0, grid)
        }
        NoiseKind::RandomPhaseTone => {
            let frequency = ensure_positive("noise frequency", spec.frequency)?;
            let phi = rng.random_range(0.0..TAU);
            tone(amplitude, frequency, phi, grid)
        }
        NoiseKind::White => (0..grid.len())
            .map(|_| {
                let z: f64 = StandardNormal.sample(rng);
                amplitude * z
            })
            .collect(),
        NoiseKind::BandLimited { half_width } => {
            let frequency = ensure_positive("noise frequency", spec.frequency)?;
            let half_width = ensure_non_negative("band half width", half_width)?;
            band_limited_noise(
                frequency - half_width,
                frequency + half_width,
                grid.len(),
                grid.sample_rate(),
                rng,
            )
        }
    };
    Ok(noise)
}

/// Same as [`generate`], using the thread-local generator.
pub fn generate_default(spec: &NoiseSpec, grid: &TimeGrid) -> Result<Signal> {
    let mut rng = rand::rng();
    generate(spec, grid, &mut rng)
}

/// Gaussian noise whose spectrum is confined to `min_freq <= |f| <= max_freq`,
/// scaled so that its largest absolute sample is exactly 1.
///
/// Returns all zeros when no FFT bin falls inside the band.
pub fn band_limited_noise<R: Rng>(
    min_freq: f64,
    max_freq: f64,
    samples: usize,
    sample_rate: f64,
    rng: &mut R,
) -> Signal {
    let freqs = fft_frequencies(samples, sample_rate);
    let spectrum: Vec<Complex<f64>> = freqs
        .iter()
        .map(|f| {
            let f = f.abs();
            if f >= min_freq && f <= max_freq {
                let re: f64 = StandardNormal.sample(rng);
                let im: f64 = StandardNormal.sample(rng);
                Complex::new(re, im)
            } else {
                Complex::new(0.0, 0.0)
            }
        })
        .collect();

    let noise: Vec<f64> = ifft(&spectrum).into_iter().map(|c| c.re).collect();
    let peak = noise.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if peak == 0.0 || !peak.is_finite() {
        return vec![0.0; samples];
    }
    noise.into_iter().map(|v| v / peak).collect()
}

fn tone(amplitude: f64, frequency: f64, phase: f64, grid: &TimeGrid) -> Signal {
    grid.times()
        .map(|t| amplitude * (TAU * frequency * t + phase).sin())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::fft::fft;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid() -> TimeGrid {
        TimeGrid::new(1000.0, 1.0).unwrap()
    }

    #[test]
    fn test_fixed_tone_is_deterministic() {
        let spec = NoiseSpec::new(NoiseKind::FixedTone, 0.3, 50.0);
        let mut rng = StdRng::seed_from_u64(1);
        let a = generate(&spec, &grid(), &mut rng).unwrap();
        let b = generate(&spec, &grid(), &mut rng).unwrap();
        assert_eq!(a, b);
        assert!(a[0].abs() < 1e-12);
        // Quarter period of 50 Hz is 5 ms.
        assert!((a[5] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_random_phase_tone_keeps_amplitude() {
        let spec = NoiseSpec::new(NoiseKind::RandomPhaseTone, 0.5, 50.0);
        let mut rng = StdRng::seed_from_u64(7);
        let noise = generate(&spec, &grid(), &mut rng).unwrap();
        let peak = noise.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!(peak <= 0.5 + 1e-12);
        assert!(peak > 0.49);
    }

    #[test]
    fn test_random_phase_changes_between_calls() {
        let spec = NoiseSpec::new(NoiseKind::RandomPhaseTone, 1.0, 50.0);
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate(&spec, &grid(), &mut rng).unwrap();
        let b = generate(&spec, &grid(), &mut rng).unwrap();
        assert_ne!(a[0], b[0]);
    }

    #[test]
    fn test_white_noise_statistics() {
        let spec = NoiseSpec::new(NoiseKind::White, 2.0, 1.0);
        let grid = TimeGrid::new(1000.0, 10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let noise = generate(&spec, &grid, &mut rng).unwrap();
        let n = noise.len() as f64;
        let mean = noise.iter().sum::<f64>() / n;
        let var = noise.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1);
        // Standard deviation should be close to the amplitude.
        assert!((var.sqrt() - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_band_limited_noise_is_unit_peak() {
        let mut rng = StdRng::seed_from_u64(11);
        let noise = band_limited_noise(45.0, 55.0, 1000, 1000.0, &mut rng);
        assert_eq!(noise.len(), 1000);
        let peak = noise.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!((peak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_band_limited_noise_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(5);
        let noise = band_limited_noise(45.0, 55.0, 1000, 1000.0, &mut rng);
        let spectrum = fft(&noise);
        // 1 Hz resolution: only bins 45..=55 (and mirrors) may carry energy.
        for (k, value) in spectrum.iter().enumerate().take(500) {
            if !(45..=55).contains(&k) {
                assert!(value.norm() < 1e-9, "bin {} leaked {}", k, value.norm());
            }
        }
    }

    #[test]
    fn test_band_without_bins_is_silent() {
        let mut rng = StdRng::seed_from_u64(9);
        // 10 Hz resolution; no bin lies in [41, 49].
        let noise = band_limited_noise(41.0, 49.0, 100, 1000.0, &mut rng);
        assert_eq!(noise.len(), 100);
        assert!(noise.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_band_limited_ignores_amplitude() {
        let spec = NoiseSpec::new(NoiseKind::BandLimited { half_width: 5.0 }, 0.3, 50.0);
        let mut rng = StdRng::seed_from_u64(13);
        let noise = generate(&spec, &grid(), &mut rng).unwrap();
        let peak = noise.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!((peak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_negative_amplitude() {
        let spec = NoiseSpec::new(NoiseKind::White, -1.0, 50.0);
        assert!(generate_default(&spec, &grid()).is_err());
    }
}
