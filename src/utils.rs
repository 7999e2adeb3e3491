//! Tolerance helpers for comparing kernel outputs.

use num::Float;

/// Largest `|actual - expected| / max(|expected|, 1)` over paired elements.
///
/// The denominator is clamped at one, so entries near zero are compared
/// absolutely and large entries relatively.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn max_relative_error<T: Float>(actual: &[T], expected: &[T]) -> T {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Vectors must be the same length"
    );
    actual
        .iter()
        .zip(expected)
        .map(|(&a, &e)| (a - e).abs() / e.abs().max(T::one()))
        .fold(T::zero(), |acc, err| {
            if acc.is_nan() || err.is_nan() {
                T::nan()
            } else {
                acc.max(err)
            }
        })
}

/// `true` when every pair is within `tolerance` in the sense of
/// [`max_relative_error`].
pub fn approx_eq_slices<T: Float>(actual: &[T], expected: &[T], tolerance: T) -> bool {
    actual.len() == expected.len() && {
        let err = max_relative_error(actual, expected);
        !err.is_nan() && err <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_slices() {
        let v = [1.0f64, -2.0, 3.5];
        assert_eq!(max_relative_error(&v, &v), 0.0);
        assert!(approx_eq_slices(&v, &v, 0.0));
    }

    #[test]
    fn test_relative_and_absolute_regimes() {
        let err = max_relative_error(&[100.5f64, 0.25], &[100.0, 0.0]);
        assert!((err - 0.25).abs() < 1e-15);
        let err = max_relative_error(&[201.0f32], &[200.0]);
        assert!((err - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_nan_is_never_close() {
        let err = max_relative_error(&[f64::NAN, 1.0], &[1.0, 1.0]);
        assert!(err.is_nan());
        assert!(!approx_eq_slices(&[1.0, f64::NAN], &[1.0, 1.0], 1.0));
    }

    #[test]
    fn test_length_mismatch_is_not_close() {
        assert!(!approx_eq_slices(&[1.0f64], &[1.0, 2.0], 1.0));
    }
}
