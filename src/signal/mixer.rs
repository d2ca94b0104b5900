use crate::error::{Result, SimError};
use crate::models::Signal;

/// Adds `noise` onto `clean`, sample by sample.
pub fn mix(clean: &[f64], noise: &[f64]) -> Result<Signal> {
    if clean.len() != noise.len() {
        return Err(SimError::ShapeMismatch {
            left: clean.len(),
            right: noise.len(),
        });
    }
    Ok(clean.iter().zip(noise).map(|(c, n)| c + n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix() {
        let mixed = mix(&[1.0, 2.0, 3.0], &[0.5, -2.0, 0.0]).unwrap();
        assert_eq!(mixed, vec![1.5, 0.0, 3.0]);
    }

    #[test]
    fn test_mix_length_mismatch() {
        let err = mix(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, SimError::ShapeMismatch { left: 2, right: 1 });
    }
}
