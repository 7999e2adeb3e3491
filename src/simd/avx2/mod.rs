//! AVX2 SIMD implementation of the f64 lane type.
//!
//! Compiled only when the build script detected AVX2 on the host; otherwise
//! the portable implementation in `simd::portable` is used instead.

pub mod f64x4;
