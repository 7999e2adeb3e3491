//! Triangular matrix-matrix multiply, `B := alpha * A^T * B`.
//!
//! `A` is `m x m` unit lower triangular and `B` is `m x n`, overwritten in
//! place. Row `i` of the result needs column `i` of `A` below the diagonal
//! (`A[k, i]` for `k > i`) and rows `k > i` of `B`, which are still unmodified
//! because rows are finished in increasing order. Splitting by columns keeps
//! that order inside every panel.

use crate::error::{dimension_mismatch, validation_error, Result};
use crate::matrix::{Diag, LowerTriangular, Matrix};
use crate::parallel::{par_column_panels, ColumnPanel};
use crate::simd::{F64x4, LANE_COUNT};
use crate::variant::Variant;
use crate::{PANEL_COLS, UNROLL};

/// Operands of one TRMM run. `B` is updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TrmmOperands {
    alpha: f64,
    a: LowerTriangular,
    b: Matrix,
}

impl TrmmOperands {
    /// Bundles the operands.
    ///
    /// # Errors
    ///
    /// `A` must have a unit diagonal and `B` one row per row of `A`.
    pub fn new(alpha: f64, a: LowerTriangular, b: Matrix) -> Result<Self> {
        if a.diag() != Diag::Unit {
            return Err(validation_error("TRMM needs a unit-diagonal A"));
        }
        let m = a.order();
        if b.rows() != m {
            return Err(dimension_mismatch("B", (m, b.cols()), b.shape()));
        }
        Ok(Self { alpha, a, b })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn a(&self) -> &LowerTriangular {
        &self.a
    }

    /// The operand that is overwritten with the result.
    pub fn b(&self) -> &Matrix {
        &self.b
    }

    pub fn into_parts(self) -> (f64, LowerTriangular, Matrix) {
        (self.alpha, self.a, self.b)
    }
}

/// Runs `variant` on `ops`.
///
/// [`Variant::CombinedSimple`] runs the reference loop over parallel column
/// panels.
pub fn run(variant: Variant, ops: &mut TrmmOperands) {
    log::debug!(
        "trmm {} on A {}x{}, B {}x{}",
        variant,
        ops.a.order(),
        ops.a.order(),
        ops.b.rows(),
        ops.b.cols()
    );
    match variant {
        Variant::Reference => reference(ops),
        Variant::Unrolled => unrolled(ops),
        Variant::Vectorized => vectorized(ops),
        Variant::CombinedSimple => combined_simple(ops),
        Variant::Combined => combined(ops),
    }
}

pub fn reference(ops: &mut TrmmOperands) {
    let alpha = ops.alpha;
    let a = &ops.a;
    let b = &mut ops.b;
    let (m, n) = b.shape();

    for i in 0..m {
        for j in 0..n {
            let mut b_ij = b[(i, j)];
            for k in i + 1..m {
                b_ij += a.strict_row(k)[i] * b[(k, j)];
            }
            b[(i, j)] = alpha * b_ij;
        }
    }
}

/// Four independent scalar accumulators over `k`, panels in parallel.
pub fn unrolled(ops: &mut TrmmOperands) {
    let (alpha, a) = (ops.alpha, &ops.a);
    par_column_panels(&mut ops.b, PANEL_COLS, |panel| {
        for i in 0..panel.rows() {
            for j in 0..panel.width() {
                entry_unrolled(alpha, a, panel, i, j);
            }
        }
    });
}

/// Four columns per step in vector registers, panels in parallel.
pub fn vectorized(ops: &mut TrmmOperands) {
    let (alpha, a) = (ops.alpha, &ops.a);
    par_column_panels(&mut ops.b, PANEL_COLS, |panel| {
        let m = panel.rows();
        let width = panel.width();
        let full = width - width % LANE_COUNT;
        for i in 0..m {
            for jj in (0..full).step_by(LANE_COUNT) {
                let mut acc = F64x4::from(&panel.row(i)[jj..]);
                for k in i + 1..m {
                    acc = acc + lane_term(a, panel, i, k, jj);
                }
                (F64x4::splat(alpha) * acc).store(&mut panel.row_mut(i)[jj..]);
            }
            for j in full..width {
                entry(alpha, a, panel, i, j);
            }
        }
    });
}

/// Vector lanes with four independent accumulators over `k`, panels in
/// parallel.
pub fn combined(ops: &mut TrmmOperands) {
    let (alpha, a) = (ops.alpha, &ops.a);
    par_column_panels(&mut ops.b, PANEL_COLS, |panel| {
        let m = panel.rows();
        let width = panel.width();
        let full = width - width % LANE_COUNT;
        for i in 0..m {
            for jj in (0..full).step_by(LANE_COUNT) {
                let mut t = [F64x4::zero(); UNROLL];

                let mut k = i + 1;
                while k + UNROLL <= m {
                    t[0] = t[0] + lane_term(a, panel, i, k, jj);
                    t[1] = t[1] + lane_term(a, panel, i, k + 1, jj);
                    t[2] = t[2] + lane_term(a, panel, i, k + 2, jj);
                    t[3] = t[3] + lane_term(a, panel, i, k + 3, jj);
                    k += UNROLL;
                }
                for kk in k..m {
                    t[0] = t[0] + lane_term(a, panel, i, kk, jj);
                }

                let b_i = F64x4::from(&panel.row(i)[jj..]);
                let sum = b_i + t[0] + t[1] + t[2] + t[3];
                (F64x4::splat(alpha) * sum).store(&mut panel.row_mut(i)[jj..]);
            }
            for j in full..width {
                entry_unrolled(alpha, a, panel, i, j);
            }
        }
    });
}

/// The reference loop body over parallel column panels.
pub fn combined_simple(ops: &mut TrmmOperands) {
    let (alpha, a) = (ops.alpha, &ops.a);
    par_column_panels(&mut ops.b, PANEL_COLS, |panel| {
        for i in 0..panel.rows() {
            for j in 0..panel.width() {
                entry(alpha, a, panel, i, j);
            }
        }
    });
}

/// `A[k, i] * B[k, jj..jj + 4]`.
#[inline(always)]
fn lane_term(
    a: &LowerTriangular,
    panel: &ColumnPanel<'_>,
    i: usize,
    k: usize,
    jj: usize,
) -> F64x4 {
    F64x4::splat(a.strict_row(k)[i]) * F64x4::from(&panel.row(k)[jj..])
}

#[inline(always)]
fn entry(alpha: f64, a: &LowerTriangular, panel: &mut ColumnPanel<'_>, i: usize, j: usize) {
    let mut b_ij = panel[(i, j)];
    for k in i + 1..panel.rows() {
        b_ij += a.strict_row(k)[i] * panel[(k, j)];
    }
    panel[(i, j)] = alpha * b_ij;
}

#[inline(always)]
fn entry_unrolled(
    alpha: f64,
    a: &LowerTriangular,
    panel: &mut ColumnPanel<'_>,
    i: usize,
    j: usize,
) {
    let m = panel.rows();
    let (mut acc0, mut acc1, mut acc2, mut acc3) = (0.0, 0.0, 0.0, 0.0);

    let mut k = i + 1;
    while k + UNROLL <= m {
        acc0 += a.strict_row(k)[i] * panel[(k, j)];
        acc1 += a.strict_row(k + 1)[i] * panel[(k + 1, j)];
        acc2 += a.strict_row(k + 2)[i] * panel[(k + 2, j)];
        acc3 += a.strict_row(k + 3)[i] * panel[(k + 3, j)];
        k += UNROLL;
    }
    while k < m {
        acc0 += a.strict_row(k)[i] * panel[(k, j)];
        k += 1;
    }

    panel[(i, j)] = alpha * (panel[(i, j)] + acc0 + acc1 + acc2 + acc3);
}
