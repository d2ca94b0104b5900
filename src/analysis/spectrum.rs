use crate::models::Spectrum;
use crate::signal::fft;

/// Magnitude spectrum `|X_k|` over the strictly positive FFT bins
/// `k = 1..=(n-1)/2`, at `k * sample_rate / n` Hz.
///
/// Magnitudes are not normalized: a unit sine falling on a bin reads `n/2`.
pub fn spectrum(signal: &[f64], sample_rate: f64) -> Spectrum {
    let n = signal.len();
    if n < 3 {
        return Spectrum::default();
    }

    let transform = fft(signal);
    let resolution = sample_rate / n as f64;
    let bins = (1..=(n - 1) / 2)
        .map(|k| (k as f64 * resolution, transform[k].norm()))
        .collect();
    Spectrum { bins }
}
