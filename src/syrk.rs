//! Symmetric rank-k update of the lower triangle,
//! `C[i, j] := beta * C[i, j] + alpha * sum_k A[i, k] * A[j, k]` for `j <= i`.
//!
//! `A` is `n x m` and `C` is `n x n`. Entries above the diagonal of `C` are
//! never touched. Each output row only reads `A`, so the parallel variants
//! hand whole rows of `C` to rayon.

use rayon::prelude::*;

use crate::error::{dimension_mismatch, Result};
use crate::matrix::Matrix;
use crate::simd::slice::{scale, scaled_dot, scaled_dot_unrolled};
use crate::variant::Variant;
use crate::UNROLL;

/// Operands of one SYRK run. The lower triangle of `C` is updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SyrkOperands {
    alpha: f64,
    beta: f64,
    a: Matrix,
    c: Matrix,
}

impl SyrkOperands {
    /// Bundles the operands after checking that `C` is square with one row
    /// per row of `A`.
    pub fn new(alpha: f64, beta: f64, a: Matrix, c: Matrix) -> Result<Self> {
        let n = a.rows();
        if c.shape() != (n, n) {
            return Err(dimension_mismatch("C", (n, n), c.shape()));
        }
        Ok(Self { alpha, beta, a, c })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn a(&self) -> &Matrix {
        &self.a
    }

    /// The accumulator.
    pub fn c(&self) -> &Matrix {
        &self.c
    }

    pub fn into_parts(self) -> (f64, f64, Matrix, Matrix) {
        (self.alpha, self.beta, self.a, self.c)
    }
}

pub fn run(variant: Variant, ops: &mut SyrkOperands) {
    log::debug!(
        "syrk {} on A {}x{}",
        variant,
        ops.a.rows(),
        ops.a.cols()
    );
    match variant {
        Variant::Reference => reference(ops),
        Variant::Unrolled => unrolled(ops),
        Variant::Vectorized => vectorized(ops),
        Variant::CombinedSimple => combined_simple(ops),
        Variant::Combined => combined(ops),
    }
}

/// Scales row `i` of the lower triangle by `beta`, then adds the rank-1
/// contributions one `k` at a time.
pub fn reference(ops: &mut SyrkOperands) {
    let (alpha, beta) = (ops.alpha, ops.beta);
    let a = &ops.a;
    for i in 0..a.rows() {
        reference_row(alpha, beta, a, i, ops.c.row_mut(i));
    }
}

/// The reference row loop, rows in parallel.
pub fn combined_simple(ops: &mut SyrkOperands) {
    let (alpha, beta) = (ops.alpha, ops.beta);
    let a = &ops.a;
    par_rows(&mut ops.c, |i, c_row| reference_row(alpha, beta, a, i, c_row));
}

/// Per-entry accumulator seeded with `beta * C[i, j]`, `k` unrolled by four,
/// rows in parallel.
pub fn unrolled(ops: &mut SyrkOperands) {
    let (alpha, beta) = (ops.alpha, ops.beta);
    let a = &ops.a;
    let m = a.cols();
    par_rows(&mut ops.c, |i, c_row| {
        let a_i = a.row(i);
        for (j, c_ij) in c_row[..=i].iter_mut().enumerate() {
            let a_j = a.row(j);
            let mut acc = *c_ij * beta;

            let mut k = 0;
            while k + UNROLL <= m {
                acc += alpha * a_i[k] * a_j[k];
                acc += alpha * a_i[k + 1] * a_j[k + 1];
                acc += alpha * a_i[k + 2] * a_j[k + 2];
                acc += alpha * a_i[k + 3] * a_j[k + 3];
                k += UNROLL;
            }
            while k < m {
                acc += alpha * a_i[k] * a_j[k];
                k += 1;
            }

            *c_ij = acc;
        }
    });
}

/// Vector `beta` scaling of the row prefix, then one vector dot product of
/// rows `i` and `j` of `A` per entry, rows in parallel.
pub fn vectorized(ops: &mut SyrkOperands) {
    let (alpha, beta) = (ops.alpha, ops.beta);
    let a = &ops.a;
    par_rows(&mut ops.c, |i, c_row| {
        let lower = &mut c_row[..=i];
        scale(beta, lower);
        let a_i = a.row(i);
        for (j, c_ij) in lower.iter_mut().enumerate() {
            *c_ij += scaled_dot(alpha, a_i, a.row(j));
        }
    });
}

/// [`vectorized`] with four vector accumulators per dot product.
pub fn combined(ops: &mut SyrkOperands) {
    let (alpha, beta) = (ops.alpha, ops.beta);
    let a = &ops.a;
    par_rows(&mut ops.c, |i, c_row| {
        let lower = &mut c_row[..=i];
        scale(beta, lower);
        let a_i = a.row(i);
        for (j, c_ij) in lower.iter_mut().enumerate() {
            *c_ij += scaled_dot_unrolled(alpha, a_i, a.row(j));
        }
    });
}

#[inline(always)]
fn reference_row(alpha: f64, beta: f64, a: &Matrix, i: usize, c_row: &mut [f64]) {
    let lower = &mut c_row[..=i];
    for c_ij in lower.iter_mut() {
        *c_ij *= beta;
    }
    let a_i = a.row(i);
    for k in 0..a.cols() {
        for (j, c_ij) in lower.iter_mut().enumerate() {
            *c_ij += alpha * a_i[k] * a[(j, k)];
        }
    }
}

/// Hands each row of `c` with its index to `f`, rows in parallel.
fn par_rows<F>(c: &mut Matrix, f: F)
where
    F: Fn(usize, &mut [f64]) + Sync + Send,
{
    let n = c.cols();
    if n == 0 {
        return;
    }
    c.as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| f(i, row));
}
