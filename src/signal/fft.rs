use num_complex::Complex;
use rustfft::FftPlanner;

/// Performs the forward Fast Fourier Transform on a real input signal.
pub fn fft(input: &[f64]) -> Vec<Complex<f64>> {
    // Convert input to complex numbers.
    let mut buffer: Vec<Complex<f64>> = input.iter().map(|&v| Complex::new(v, 0.0)).collect();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Inverse FFT, scaled by `1/n` so that `ifft(fft(x)) == x`.
pub fn ifft(spectrum: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut buffer = spectrum.to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(buffer.len());
    ifft.process(&mut buffer);

    // rustfft leaves the output unnormalized.
    let scale = 1.0 / buffer.len() as f64;
    for value in buffer.iter_mut() {
        *value *= scale;
    }
    buffer
}

/// Signed frequency of every FFT bin, laid out like the transform output:
/// `0, 1, .., (n-1)/2, -(n/2), .., -1` times `sample_rate / n`.
pub fn fft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    let resolution = sample_rate / n as f64;
    let positive = n.div_ceil(2);
    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 * resolution
            } else {
                (k as f64 - n as f64) * resolution
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft() {
        let input = [1.0, 2.0, 3.0, 4.0];
        let result = fft(&input);

        // X[0] = 10, X[1] = -2 + 2i, X[2] = -2, X[3] = -2 - 2i
        assert_eq!(result.len(), 4);
        assert!((result[0] - Complex::new(10.0, 0.0)).norm() < 1e-12);
        assert!((result[1] - Complex::new(-2.0, 2.0)).norm() < 1e-12);
        assert!((result[2] - Complex::new(-2.0, 0.0)).norm() < 1e-12);
        assert!((result[3] - Complex::new(-2.0, -2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_ifft_inverts_fft() {
        let input = [0.5, -1.0, 3.0, 2.0, 0.0];
        let restored = ifft(&fft(&input));
        for (x, y) in input.iter().zip(restored.iter()) {
            assert!((x - y.re).abs() < 1e-12);
            assert!(y.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_fft_frequencies_even_and_odd() {
        assert_eq!(fft_frequencies(4, 4.0), vec![0.0, 1.0, -2.0, -1.0]);
        assert_eq!(fft_frequencies(5, 5.0), vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(fft(&[]).is_empty());
        assert!(ifft(&[]).is_empty());
    }
}
