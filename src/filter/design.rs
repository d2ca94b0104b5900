use std::f64::consts::PI;

use num_complex::Complex;

use crate::error::{Result, SimError};
use crate::models::{FilterBand, FilterCoefficients, FilterSpec};

/// Sample rate (in normalized units) the bilinear transform is carried out at.
/// With `fs = 2` the normalized cutoff `wn` maps to `4·tan(π·wn/2)`.
const BILINEAR_FS: f64 = 2.0;

/// Zeros, poles and gain of a transfer function.
#[derive(Debug, Clone)]
struct Zpk {
    zeros: Vec<Complex<f64>>,
    poles: Vec<Complex<f64>>,
    gain: f64,
}

impl Zpk {
    fn relative_degree(&self) -> usize {
        self.poles.len().saturating_sub(self.zeros.len())
    }
}

/// Designs a digital Butterworth filter for `spec`.
///
/// The analog prototype of order `spec.order` is shifted to the requested band
/// and mapped to the z-plane with the bilinear transform. Band-pass designs
/// end up with `2 * order` poles.
pub fn design(spec: &FilterSpec) -> Result<FilterCoefficients> {
    let normalized = validate(spec)?;
    let prototype = butterworth_prototype(spec.order);

    let analog = match spec.band {
        FilterBand::LowPass { .. } => lowpass_transform(prototype, prewarp(normalized[0])),
        FilterBand::HighPass { .. } => highpass_transform(prototype, prewarp(normalized[0])),
        FilterBand::BandPass { .. } => {
            let low = prewarp(normalized[0]);
            let high = prewarp(normalized[1]);
            bandpass_transform(prototype, (low * high).sqrt(), high - low)
        }
    };

    let digital = bilinear(analog, BILINEAR_FS);
    let b = poly(&digital.zeros)
        .into_iter()
        .map(|c| c * digital.gain)
        .collect();
    let a = poly(&digital.poles);

    Ok(FilterCoefficients::new(*spec, b, a))
}

/// Checks order and edges, returning the edges normalized by Nyquist.
fn validate(spec: &FilterSpec) -> Result<Vec<f64>> {
    if spec.order < FilterSpec::MIN_ORDER || spec.order > FilterSpec::MAX_ORDER {
        return Err(SimError::InvalidOrder {
            order: spec.order,
            min: FilterSpec::MIN_ORDER,
            max: FilterSpec::MAX_ORDER,
        });
    }
    if !(spec.sample_rate.is_finite() && spec.sample_rate > 0.0) {
        return Err(SimError::InvalidParameter {
            name: "sample rate",
            value: spec.sample_rate,
        });
    }

    let nyquist = spec.nyquist();
    for cutoff_hz in spec.band.edges() {
        let wn = cutoff_hz / nyquist;
        if !(wn.is_finite() && wn > 0.0 && wn < 1.0) {
            return Err(SimError::InvalidCutoff { cutoff_hz, nyquist_hz: nyquist });
        }
    }
    if let FilterBand::BandPass { low_hz, high_hz } = spec.band {
        if low_hz >= high_hz {
            return Err(SimError::InvalidBand { low_hz, high_hz });
        }
    }
    Ok(spec.normalized_cutoffs())
}

/// Pre-warps a Nyquist-normalized frequency for the bilinear transform.
fn prewarp(wn: f64) -> f64 {
    2.0 * BILINEAR_FS * (PI * wn / BILINEAR_FS).tan()
}

/// Analog Butterworth prototype with unit cutoff: no zeros, poles evenly
/// spaced on the left half of the unit circle.
fn butterworth_prototype(order: usize) -> Zpk {
    let n = order as i64;
    let poles = (0..n)
        .map(|k| {
            let m = -n + 1 + 2 * k;
            let theta = PI * m as f64 / (2 * n) as f64;
            -Complex::from_polar(1.0, theta)
        })
        .collect();
    Zpk { zeros: Vec::new(), poles, gain: 1.0 }
}

fn lowpass_transform(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.relative_degree();
    Zpk {
        zeros: proto.zeros.iter().map(|&z| z * wo).collect(),
        poles: proto.poles.iter().map(|&p| p * wo).collect(),
        gain: proto.gain * wo.powi(degree as i32),
    }
}

fn highpass_transform(proto: Zpk, wo: f64) -> Zpk {
    let degree = proto.relative_degree();
    let num: Complex<f64> = proto.zeros.iter().map(|&z| -z).product();
    let den: Complex<f64> = proto.poles.iter().map(|&p| -p).product();

    let mut zeros: Vec<Complex<f64>> = proto.zeros.iter().map(|&z| wo / z).collect();
    zeros.extend(std::iter::repeat_n(Complex::new(0.0, 0.0), degree));
    Zpk {
        zeros,
        poles: proto.poles.iter().map(|&p| wo / p).collect(),
        gain: proto.gain * (num / den).re,
    }
}

fn bandpass_transform(proto: Zpk, wo: f64, bw: f64) -> Zpk {
    let degree = proto.relative_degree();
    let split = |roots: &[Complex<f64>]| -> Vec<Complex<f64>> {
        let scaled: Vec<Complex<f64>> = roots.iter().map(|&r| r * (bw / 2.0)).collect();
        let offsets: Vec<Complex<f64>> = scaled.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
        let upper = scaled.iter().zip(&offsets).map(|(&r, &d)| r + d);
        let lower = scaled.iter().zip(&offsets).map(|(&r, &d)| r - d);
        upper.chain(lower).collect()
    };

    let mut zeros = split(&proto.zeros);
    zeros.extend(std::iter::repeat_n(Complex::new(0.0, 0.0), degree));
    Zpk {
        zeros,
        poles: split(&proto.poles),
        gain: proto.gain * bw.powi(degree as i32),
    }
}

/// Maps an analog zpk system to the z-plane; zeros at infinity land on `z = -1`.
fn bilinear(analog: Zpk, fs: f64) -> Zpk {
    let degree = analog.relative_degree();
    let fs2 = Complex::new(2.0 * fs, 0.0);

    let num: Complex<f64> = analog.zeros.iter().map(|&z| fs2 - z).product();
    let den: Complex<f64> = analog.poles.iter().map(|&p| fs2 - p).product();

    let mut zeros: Vec<Complex<f64>> =
        analog.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    zeros.extend(std::iter::repeat_n(Complex::new(-1.0, 0.0), degree));
    Zpk {
        zeros,
        poles: analog.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect(),
        gain: analog.gain * (num / den).re,
    }
}

/// Monic polynomial with the given roots, highest power first. Roots come in
/// conjugate pairs here, so the imaginary parts cancel and are dropped.
fn poly(roots: &[Complex<f64>]) -> Vec<f64> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &root in roots {
        let mut next = coeffs.clone();
        next.push(Complex::new(0.0, 0.0));
        for (i, c) in coeffs.iter().enumerate() {
            next[i + 1] -= root * *c;
        }
        coeffs = next;
    }
    coeffs.into_iter().map(|c| c.re).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{:?} != {:?}", actual, expected);
        }
    }

    /// |H| at `freq_hz`, evaluated straight from the coefficients.
    fn gain_at(coeffs: &FilterCoefficients, freq_hz: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / coeffs.spec().sample_rate;
        let eval = |c: &[f64]| -> Complex<f64> {
            c.iter()
                .enumerate()
                .map(|(k, &v)| Complex::from_polar(v, -w * k as f64))
                .sum()
        };
        (eval(coeffs.b()) / eval(coeffs.a())).norm()
    }

    #[test]
    fn test_first_order_lowpass_coefficients() {
        // Reference values from the closed-form bilinear design.
        let coeffs = design(&FilterSpec::low_pass(30.0, 1, 1000.0)).unwrap();
        let k = (PI * 0.03).tan();
        let b0 = k / (1.0 + k);
        let a1 = (k - 1.0) / (k + 1.0);
        assert_close(coeffs.b(), &[b0, b0], 1e-12);
        assert_close(coeffs.a(), &[1.0, a1], 1e-12);
    }

    #[test]
    fn test_second_order_lowpass_matches_biquad() {
        // RBJ Butterworth biquad, Q = 1/sqrt(2).
        let coeffs = design(&FilterSpec::low_pass(100.0, 2, 1000.0)).unwrap();
        let k = (PI * 100.0 / 1000.0).tan();
        let q = 1.0 / 2.0_f64.sqrt();
        let norm = 1.0 / (1.0 + k / q + k * k);
        let b0 = k * k * norm;
        let a1 = 2.0 * (k * k - 1.0) * norm;
        let a2 = (1.0 - k / q + k * k) * norm;
        assert_close(coeffs.b(), &[b0, 2.0 * b0, b0], 1e-12);
        assert_close(coeffs.a(), &[1.0, a1, a2], 1e-12);
    }

    #[test]
    fn test_leading_feedback_coefficient_is_one() {
        for order in 1..=10 {
            let coeffs = design(&FilterSpec::high_pass(20.0, order, 1000.0)).unwrap();
            assert_eq!(coeffs.a()[0], 1.0);
            assert_eq!(coeffs.order(), order);
        }
    }

    #[test]
    fn test_lowpass_half_power_at_cutoff() {
        for order in [1, 2, 4, 7, 10] {
            let coeffs = design(&FilterSpec::low_pass(30.0, order, 1000.0)).unwrap();
            // Transfer-function form loses a few digits at high orders.
            assert!((gain_at(&coeffs, 0.0) - 1.0).abs() < 1e-4);
            assert!((gain_at(&coeffs, 30.0) - 0.5_f64.sqrt()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_highpass_blocks_dc_and_passes_nyquist() {
        let coeffs = design(&FilterSpec::high_pass(20.0, 4, 1000.0)).unwrap();
        assert!(gain_at(&coeffs, 0.0) < 1e-9);
        assert!((gain_at(&coeffs, 500.0) - 1.0).abs() < 1e-9);
        assert!((gain_at(&coeffs, 20.0) - 0.5_f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_bandpass_doubles_the_order() {
        let coeffs = design(&FilterSpec::band_pass(15.0, 35.0, 3, 1000.0)).unwrap();
        assert_eq!(coeffs.a().len(), 7);
        assert_eq!(coeffs.b().len(), 7);
        assert!((gain_at(&coeffs, 15.0) - 0.5_f64.sqrt()).abs() < 1e-6);
        assert!((gain_at(&coeffs, 35.0) - 0.5_f64.sqrt()).abs() < 1e-6);
        assert!(gain_at(&coeffs, 0.0) < 1e-9);
    }

    #[test]
    fn test_cutoff_above_nyquist() {
        let err = design(&FilterSpec::low_pass(600.0, 4, 1000.0)).unwrap_err();
        assert_eq!(err, SimError::InvalidCutoff { cutoff_hz: 600.0, nyquist_hz: 500.0 });
        assert!(design(&FilterSpec::low_pass(500.0, 4, 1000.0)).is_err());
        assert!(design(&FilterSpec::high_pass(0.0, 4, 1000.0)).is_err());
        assert!(design(&FilterSpec::high_pass(-5.0, 4, 1000.0)).is_err());
    }

    #[test]
    fn test_inverted_band() {
        let err = design(&FilterSpec::band_pass(50.0, 20.0, 2, 1000.0)).unwrap_err();
        assert_eq!(err, SimError::InvalidBand { low_hz: 50.0, high_hz: 20.0 });
        assert!(matches!(
            design(&FilterSpec::band_pass(30.0, 30.0, 2, 1000.0)),
            Err(SimError::InvalidBand { .. })
        ));
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(
            design(&FilterSpec::low_pass(30.0, 0, 1000.0)),
            Err(SimError::InvalidOrder { order: 0, .. })
        ));
        assert!(matches!(
            design(&FilterSpec::low_pass(30.0, 11, 1000.0)),
            Err(SimError::InvalidOrder { order: 11, .. })
        ));
    }

    #[test]
    fn test_poly_from_roots() {
        let roots = [Complex::new(1.0, 0.0), Complex::new(2.0, 0.0)];
        assert_close(&poly(&roots), &[1.0, -3.0, 2.0], 1e-12);
        let pair = [Complex::new(0.0, 1.0), Complex::new(0.0, -1.0)];
        assert_close(&poly(&pair), &[1.0, 0.0, 1.0], 1e-12);
    }
}
