//! Lane-batched operations over contiguous `f64` slices.
//!
//! Each routine walks the slices in full `LANE_COUNT` batches and finishes the
//! remaining `len % LANE_COUNT` elements with a scalar loop, so any length is
//! accepted.

use crate::simd::{F64x4, LANE_COUNT};

/// `y[k] *= beta` for every element.
#[inline(always)]
pub fn scale(beta: f64, y: &mut [f64]) {
    let beta_v = F64x4::splat(beta);
    let mut chunks = y.chunks_exact_mut(LANE_COUNT);
    for chunk in &mut chunks {
        (F64x4::from(&chunk[..]) * beta_v).store(chunk);
    }
    for v in chunks.into_remainder() {
        *v *= beta;
    }
}

/// `sum_k alpha * x[k] * y[k]` with one vector accumulator.
///
/// Every term is formed as `(alpha * x[k]) * y[k]`, exactly as the scalar
/// kernels form it; only the summation order differs.
#[inline(always)]
pub fn scaled_dot(alpha: f64, x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "Vectors must be the same length");

    let alpha_v = F64x4::splat(alpha);
    let mut acc = F64x4::zero();

    let x_chunks = x.chunks_exact(LANE_COUNT);
    let y_chunks = y.chunks_exact(LANE_COUNT);
    let (x_tail, y_tail) = (x_chunks.remainder(), y_chunks.remainder());

    for (xc, yc) in x_chunks.zip(y_chunks) {
        acc = acc + alpha_v * F64x4::from(xc) * F64x4::from(yc);
    }

    let mut sum = acc.horizontal_sum();
    for (xv, yv) in x_tail.iter().zip(y_tail) {
        sum += alpha * xv * yv;
    }
    sum
}

/// Same sum as [`scaled_dot`], four vector accumulators per pass.
///
/// Handles `4 * LANE_COUNT` elements per iteration, then single vectors, then
/// scalars.
#[inline(always)]
pub fn scaled_dot_unrolled(alpha: f64, x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "Vectors must be the same length");

    const STEP: usize = 4 * LANE_COUNT;
    let len = x.len();
    let alpha_v = F64x4::splat(alpha);
    let mut acc = [F64x4::zero(); 4];

    let mut k = 0;
    while k + STEP <= len {
        for (u, a) in acc.iter_mut().enumerate() {
            let o = k + u * LANE_COUNT;
            *a = *a + alpha_v * F64x4::from(&x[o..]) * F64x4::from(&y[o..]);
        }
        k += STEP;
    }
    while k + LANE_COUNT <= len {
        acc[0] = acc[0] + alpha_v * F64x4::from(&x[k..]) * F64x4::from(&y[k..]);
        k += LANE_COUNT;
    }

    let mut sum = ((acc[0] + acc[1]) + (acc[2] + acc[3])).horizontal_sum();
    for kk in k..len {
        sum += alpha * x[kk] * y[kk];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_scaled_dot(alpha: f64, x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).fold(0.0, |s, (a, b)| s + alpha * a * b)
    }

    #[test]
    fn test_scale_handles_tail() {
        let mut y: Vec<f64> = (0..7).map(|v| v as f64).collect();
        scale(2.0, &mut y);
        assert_eq!(y, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_scale_empty() {
        let mut y: Vec<f64> = Vec::new();
        scale(3.0, &mut y);
        assert!(y.is_empty());
    }

    #[test]
    fn test_scaled_dot_matches_naive_for_all_tails() {
        for len in 0..40 {
            let x: Vec<f64> = (0..len).map(|v| (v % 7) as f64 * 0.5).collect();
            let y: Vec<f64> = (0..len).map(|v| 1.0 - (v % 5) as f64 * 0.25).collect();
            let expected = naive_scaled_dot(1.5, &x, &y);
            let got = scaled_dot(1.5, &x, &y);
            let got_unrolled = scaled_dot_unrolled(1.5, &x, &y);
            assert!((got - expected).abs() <= 1e-12 * expected.abs().max(1.0), "len={len}");
            assert!(
                (got_unrolled - expected).abs() <= 1e-12 * expected.abs().max(1.0),
                "len={len}"
            );
        }
    }

    #[test]
    #[should_panic(expected = "Vectors must be the same length")]
    fn test_scaled_dot_length_mismatch() {
        scaled_dot(1.0, &[1.0, 2.0], &[1.0]);
    }
}
