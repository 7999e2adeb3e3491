//! Four-lane `f64` vectors and lane-batched slice helpers.
//!
//! The build script emits `cfg(avx2)` when the host supports AVX2; the
//! register-backed implementation is used then, the portable one otherwise.
//! Both expose the same `F64x4` interface.

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx2;

#[cfg(not(all(avx2, any(target_arch = "x86", target_arch = "x86_64"))))]
pub mod portable;

pub mod slice;
pub mod traits;

#[cfg(all(avx2, any(target_arch = "x86", target_arch = "x86_64")))]
pub use avx2::f64x4::F64x4;

#[cfg(not(all(avx2, any(target_arch = "x86", target_arch = "x86_64"))))]
pub use portable::f64x4::F64x4;

pub use traits::{Alignment, SimdLoad, SimdStore};

/// Number of f64 lanes in one `F64x4`.
pub const LANE_COUNT: usize = 4;
