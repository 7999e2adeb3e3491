//! Array-backed `F64x4` with the same interface as the AVX2 version.
//!
//! Fixed-size array arithmetic is simple enough for LLVM to map onto
//! whatever vector unit the target has.

use std::ops::{Add, Mul};

use crate::simd::{Alignment, SimdLoad, SimdStore, LANE_COUNT};

const ALIGNMENT: usize = 32;

#[derive(Copy, Clone, Debug)]
pub struct F64x4 {
    pub elements: [f64; LANE_COUNT],
}

impl F64x4 {
    #[inline(always)]
    pub fn splat(value: f64) -> Self {
        Self {
            elements: [value; LANE_COUNT],
        }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(0.0)
    }

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
        self.elements
    }

    /// Sum of the lanes as `(l0 + l1) + (l2 + l3)`.
    #[inline(always)]
    pub fn horizontal_sum(&self) -> f64 {
        let l = &self.elements;
        (l[0] + l[1]) + (l[2] + l[3])
    }
}

impl Alignment<f64> for F64x4 {
    #[inline(always)]
    fn is_aligned(ptr: *const f64) -> bool {
        (ptr as usize) % ALIGNMENT == 0
    }
}

impl From<&[f64]> for F64x4 {
    /// # Panics
    ///
    /// Panics if the slice holds fewer than four values.
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
        match F64x4::is_aligned(ptr) {
            true => Self::load_aligned(ptr),
            false => Self::load_unaligned(ptr),
        }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f64) -> Self::Output {
        Self::load_unaligned(ptr)
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f64) -> Self::Output {
        let mut elements = [0.0f64; LANE_COUNT];
        std::ptr::copy_nonoverlapping(ptr, elements.as_mut_ptr(), LANE_COUNT);
        Self { elements }
    }
}

impl SimdStore<f64> for F64x4 {
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f64) {
        match F64x4::is_aligned(ptr) {
            true => self.store_aligned_at(ptr),
            false => self.store_unaligned_at(ptr),
        }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f64) {
        self.store_unaligned_at(ptr)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f64) {
        std::ptr::copy_nonoverlapping(self.elements.as_ptr(), ptr, LANE_COUNT);
    }
}

impl Add for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        let mut elements = self.elements;
        for (e, r) in elements.iter_mut().zip(rhs.elements) {
            *e += r;
        }
        Self { elements }
    }
}

impl Mul for F64x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        let mut elements = self.elements;
        for (e, r) in elements.iter_mut().zip(rhs.elements) {
            *e *= r;
        }
        Self { elements }
    }
}
