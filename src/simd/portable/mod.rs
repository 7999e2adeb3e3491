//! Portable fallback used when the host has no AVX2.

pub mod f64x4;
