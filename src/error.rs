use thiserror::Error;

/// Errors raised by the simulation pipeline.
///
/// None of these are recovered inside the crate; the caller decides what to
/// show instead of a plot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid cutoff {cutoff_hz} Hz: must lie in (0, {nyquist_hz}) Hz, below Nyquist")]
    InvalidCutoff { cutoff_hz: f64, nyquist_hz: f64 },

    #[error("invalid filter order {order}: must be between {min} and {max}")]
    InvalidOrder { order: usize, min: usize, max: usize },

    #[error("invalid pass band: low edge {low_hz} Hz must be below high edge {high_hz} Hz")]
    InvalidBand { low_hz: f64, high_hz: f64 },

    #[error("signal lengths differ: {left} vs {right} samples")]
    ShapeMismatch { left: usize, right: usize },

    #[error("signal of {actual} samples too short for order {order} (needs more than {required})")]
    UnstableFilter {
        order: usize,
        required: usize,
        actual: usize,
    },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("invalid time grid: sample rate {sample_rate} Hz, duration {duration} s")]
    InvalidGrid { sample_rate: f64, duration: f64 },

    #[error("frequency response has no samples")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Rejects non-finite or negative values for a named parameter.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

/// Rejects non-finite, zero or negative values for a named parameter.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}
