//! AVX2 4-lane f64 SIMD vector implementation.
//!
//! `F64x4` wraps a 256-bit `__m256d` register holding four double-precision
//! values. Only the handful of operations the kernels need are provided:
//! full-width loads and stores, broadcast, lane-wise add and multiply, and a
//! horizontal sum with a fixed reduction order.
//!
//! Multiplies and adds are issued separately (no FMA), so a lane computes
//! exactly what the scalar expression `x * y + z` computes.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use std::ops::{Add, Mul};

use crate::simd::{Alignment, SimdLoad, SimdStore, LANE_COUNT};

/// AVX memory alignment requirement in bytes.
pub(crate) const AVX_ALIGNMENT: usize = 32;

/// AVX2 SIMD vector containing 4 packed f64 values.
#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    /// AVX 256-bit register containing 4 packed f64 values
    pub elements: __m256d,
}

impl F64x4 {
    /// Broadcasts `value` to all four lanes.
    #[inline(always)]
    pub fn splat(value: f64) -> Self {
        Self {
            elements: unsafe { _mm256_set1_pd(value) },
        }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self {
            elements: unsafe { _mm256_setzero_pd() },
        }
    }

    /// Writes the four lanes to the front of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` holds fewer than four values.
    #[inline(always)]
    pub fn store(&self, out: &mut [f64]) {
        assert!(
            out.len() >= LANE_COUNT,
            "store needs {LANE_COUNT} values, got {}",
            out.len()
        );
        unsafe { self.store_at(out.as_mut_ptr()) }
    }

    #[inline(always)]
    pub fn to_array(&self) -> [f64; LANE_COUNT] {
        let mut lanes = [0.0f64; LANE_COUNT];
        unsafe { _mm256_storeu_pd(lanes.as_mut_ptr(), self.elements) };
        lanes
    }

    /// Sum of the lanes as `(l0 + l1) + (l2 + l3)`.
    #[inline(always)]
    pub fn horizontal_sum(&self) -> f64 {
        let l = self.to_array();
        (l[0] + l[1]) + (l[2] + l[3])
    }
}

impl Alignment<f64> for F64x4 {
    #[inline(always)]
    fn is_aligned(ptr: *const f64) -> bool {
        (ptr as usize) % AVX_ALIGNMENT == 0
    }
}

impl From<&[f64]> for F64x4 {
    /// Loads the first four values of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if the slice holds fewer than four values; tails shorter than a
    /// full vector are handled by scalar remainder loops in the kernels.
    #[inline(always)]
    fn from(slice: &[f64]) -> Self {
        assert!(
            slice.len() >= LANE_COUNT,
            "load needs {LANE_COUNT} values, got {}",
            slice.len()
        );
        unsafe { Self::load(slice.as_ptr()) }
    }
}

impl SimdLoad<f64> for F64x4 {
    type Output = Self;

    #[inline(always)]
    unsafe fn load(ptr: *const f64) -> Self::Output {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F64x4::is_aligned(ptr) {
            true => Self::load_aligned(ptr),
            false => Self::load_unaligned(ptr),
        }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f64) -> Self::Output {
        Self {
            elements: _mm256_load_pd(ptr),
        }
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f64) -> Self::Output {
        Self {
            elements: _mm256_loadu_pd(ptr),
        }
    }
}

impl SimdStore<f64> for F64x4 {
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f64) {
        debug_assert!(!ptr.is_null(), "Pointer must not be null");

        match F64x4::is_aligned(ptr) {
            true => self.store_aligned_at(ptr),
            false => self.store_unaligned_at(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f64) {
        _mm256_store_pd(ptr, self.elements)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f64) {
        _mm256_storeu_pd(ptr, self.elements)
    }
}

impl Add for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_add_pd(self.elements, rhs.elements) },
        }
    }
}

impl Mul for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            elements: unsafe { _mm256_mul_pd(self.elements, rhs.elements) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_store_roundtrip_unaligned() {
        let data = [0.5f64, 1.0, 1.5, 2.0, 2.5];
        let v = F64x4::from(&data[1..]);
        let mut out = [0.0f64; 5];
        v.store(&mut out[1..]);
        assert_eq!(out, [0.0, 1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_arithmetic_matches_scalar() {
        let x = [1.25f64, -3.0, 0.1, 7.5];
        let y = [2.0f64, 0.3, -0.7, 1e-3];
        let z = [0.2f64, 0.2, 0.2, 0.2];
        let r = (F64x4::from(&x[..]) * F64x4::from(&y[..]) + F64x4::from(&z[..])).to_array();
        for l in 0..LANE_COUNT {
            assert_eq!(r[l], x[l] * y[l] + z[l]);
        }
    }

    #[test]
    fn test_horizontal_sum_order() {
        let v = F64x4::from(&[1.0f64, 2.0, 3.0, 4.0][..]);
        assert_eq!(v.horizontal_sum(), 10.0);
        assert_eq!(F64x4::splat(0.25).horizontal_sum(), 1.0);
        assert_eq!(F64x4::zero().horizontal_sum(), 0.0);
    }

    #[test]
    #[should_panic(expected = "load needs 4 values")]
    fn test_short_slice_panics() {
        let _ = F64x4::from(&[1.0f64, 2.0][..]);
    }
}
