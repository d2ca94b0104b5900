use crate::error::{Result, SimError};
use crate::models::{FilterCoefficients, Signal};

/// Filters `signal` forwards and then backwards so the result has no phase
/// shift and the squared magnitude response of one pass.
///
/// Both ends are extended by an odd reflection of `3 * max(len(a), len(b))`
/// samples and each pass starts from the filter's steady state, which keeps
/// start-up transients out of the returned samples.
pub fn apply(coeffs: &FilterCoefficients, signal: &[f64]) -> Result<Signal> {
    let padlen = 3 * coeffs.a().len().max(coeffs.b().len());
    if signal.len() <= padlen {
        return Err(SimError::UnstableFilter {
            order: coeffs.order(),
            required: padlen,
            actual: signal.len(),
        });
    }

    let zi = steady_state(coeffs).ok_or(SimError::UnstableFilter {
        order: coeffs.order(),
        required: padlen,
        actual: signal.len(),
    })?;
    let extended = odd_extend(signal, padlen);

    let initial: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut forward = lfilter(coeffs, &extended, &initial);

    forward.reverse();
    let initial: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
    let mut backward = lfilter(coeffs, &forward, &initial);
    backward.reverse();

    Ok(backward[padlen..padlen + signal.len()].to_vec())
}

/// Single causal pass of the filter (direct form II transposed), starting
/// from delay-line state `zi`. Missing state entries are taken as zero.
pub fn lfilter(coeffs: &FilterCoefficients, input: &[f64], zi: &[f64]) -> Signal {
    let (b, a) = padded(coeffs);
    let n = b.len();
    let mut state = vec![0.0; n - 1];
    for (s, z) in state.iter_mut().zip(zi) {
        *s = *z;
    }

    let mut output = Vec::with_capacity(input.len());
    for &x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..n - 1 {
            let next = state.get(i + 1).copied().unwrap_or(0.0);
            state[i] = b[i + 1] * x + next - a[i + 1] * y;
        }
        output.push(y);
    }
    output
}

/// Delay-line state that a unit step input holds constant, i.e. the initial
/// conditions under which a DC input produces a DC output from sample 0.
///
/// Solves `(I - Cᵀ) zi = b[1..] - a[1..] * b[0]` where `C` is the companion
/// matrix of `a`. Returns `None` if the filter has a pole at `z = 1`.
pub fn steady_state(coeffs: &FilterCoefficients) -> Option<Vec<f64>> {
    let (b, a) = padded(coeffs);
    let m = b.len() - 1;
    if m == 0 {
        return Some(Vec::new());
    }

    // (I - Cᵀ): first column carries a[1..], superdiagonal is -1.
    let mut matrix = vec![vec![0.0; m]; m];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = 1.0;
        row[0] += a[i + 1];
        if i + 1 < m {
            row[i + 1] -= 1.0;
        }
    }
    let rhs: Vec<f64> = (0..m).map(|i| b[i + 1] - a[i + 1] * b[0]).collect();
    solve(matrix, rhs)
}

/// `b` and `a` zero-padded to a common length.
fn padded(coeffs: &FilterCoefficients) -> (Vec<f64>, Vec<f64>) {
    let n = coeffs.a().len().max(coeffs.b().len()).max(1);
    let mut b = coeffs.b().to_vec();
    let mut a = coeffs.a().to_vec();
    b.resize(n, 0.0);
    a.resize(n, 0.0);
    (b, a)
}

/// Extends `x` by `padlen` samples at each end, reflected through the end
/// points: `2·x[0] - x[padlen..=1]` before and `2·x[n-1] - x[n-2..]` after.
fn odd_extend(x: &[f64], padlen: usize) -> Vec<f64> {
    let n = x.len();
    let first = x[0];
    let last = x[n - 1];

    let mut out = Vec::with_capacity(n + 2 * padlen);
    out.extend((1..=padlen).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=padlen).map(|i| 2.0 * last - x[n - 1 - i]));
    out
}

/// Gaussian elimination with partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            matrix[i][col]
                .abs()
                .partial_cmp(&matrix[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[pivot][col].abs() < 1e-14 {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Some(x)
}
