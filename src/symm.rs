//! Symmetric matrix-matrix update, `C := alpha * A * B + beta * C`.
//!
//! `A` is `m x m` symmetric and only its lower triangle is stored; `B` and
//! `C` are `m x n`. Every variant walks row `i` of `A` once and uses each
//! `A[i, k]` (`k < i`) twice: it pushes `alpha * B[i, j] * A[i, k]` into the
//! earlier row `C[k, j]` (standing in for the mirrored `A[k, i]`) and adds
//! `B[k, j] * A[i, k]` into the running sum `temp2` that closes out `C[i, j]`
//! together with the diagonal term.
//!
//! Row `k` of `C` is still being written while later rows run, so rows cannot
//! be split across threads. Columns can: every output column only reads the
//! same column of `B`. The parallel variants therefore fan out over column
//! panels and keep the row loop sequential inside each panel.

use crate::error::{dimension_mismatch, Result};
use crate::matrix::{LowerTriangular, Matrix};
use crate::parallel::{par_column_panels, ColumnPanel};
use crate::simd::{F64x4, LANE_COUNT};
use crate::variant::Variant;
use crate::{PANEL_COLS, UNROLL};

/// Operands of one SYMM run. `C` is updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmOperands {
    alpha: f64,
    beta: f64,
    a: LowerTriangular,
    b: Matrix,
    c: Matrix,
}

impl SymmOperands {
    /// Bundles the operands after checking that `B` has `A.order()` rows and
    /// that `C` has the shape of `B`.
    pub fn new(alpha: f64, beta: f64, a: LowerTriangular, b: Matrix, c: Matrix) -> Result<Self> {
        let m = a.order();
        if b.rows() != m {
            return Err(dimension_mismatch("B", (m, b.cols()), b.shape()));
        }
        if c.shape() != b.shape() {
            return Err(dimension_mismatch("C", b.shape(), c.shape()));
        }
        Ok(Self { alpha, beta, a, b, c })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn a(&self) -> &LowerTriangular {
        &self.a
    }

    pub fn b(&self) -> &Matrix {
        &self.b
    }

    /// The accumulator.
    pub fn c(&self) -> &Matrix {
        &self.c
    }

    pub fn into_parts(self) -> (f64, f64, LowerTriangular, Matrix, Matrix) {
        (self.alpha, self.beta, self.a, self.b, self.c)
    }

    fn split(&mut self) -> (Inputs<'_>, &mut Matrix) {
        let inputs = Inputs {
            alpha: self.alpha,
            beta: self.beta,
            a: &self.a,
            b: &self.b,
        };
        (inputs, &mut self.c)
    }
}

#[derive(Clone, Copy)]
struct Inputs<'a> {
    alpha: f64,
    beta: f64,
    a: &'a LowerTriangular,
    b: &'a Matrix,
}

/// Runs `variant` on `ops`.
///
/// SYMM has no dedicated simple-combined form; [`Variant::CombinedSimple`]
/// runs the scalar loop over parallel column panels.
pub fn run(variant: Variant, ops: &mut SymmOperands) {
    log::debug!(
        "symm {} on A {}x{}, C {}x{}",
        variant,
        ops.a.order(),
        ops.a.order(),
        ops.c.rows(),
        ops.c.cols()
    );
    match variant {
        Variant::Reference => reference(ops),
        Variant::Unrolled => unrolled(ops),
        Variant::Vectorized => vectorized(ops),
        Variant::CombinedSimple => combined_simple(ops),
        Variant::Combined => combined(ops),
    }
}

/// Sequential triple loop over the whole matrix.
pub fn reference(ops: &mut SymmOperands) {
    let (inp, c) = ops.split();
    let (m, n) = c.shape();

    for i in 0..m {
        let a_row = inp.a.strict_row(i);
        let a_ii = inp.a.diagonal(i);
        for j in 0..n {
            let b_ij = inp.b[(i, j)];
            let mut temp2 = 0.0;
            for k in 0..i {
                c[(k, j)] += inp.alpha * b_ij * a_row[k];
                temp2 += inp.b[(k, j)] * a_row[k];
            }
            c[(i, j)] = inp.beta * c[(i, j)] + inp.alpha * b_ij * a_ii + inp.alpha * temp2;
        }
    }
}

/// Scalar loop with the `k` reduction unrolled by four, panels in parallel.
pub fn unrolled(ops: &mut SymmOperands) {
    let (inp, c) = ops.split();
    par_column_panels(c, PANEL_COLS, |panel| {
        for i in 0..panel.rows() {
            for j in 0..panel.width() {
                entry_unrolled(inp, panel, i, j);
            }
        }
    });
}

/// Four output columns per step in vector registers, panels in parallel.
pub fn vectorized(ops: &mut SymmOperands) {
    let (inp, c) = ops.split();
    par_column_panels(c, PANEL_COLS, |panel| {
        let width = panel.width();
        let full = width - width % LANE_COUNT;
        for i in 0..panel.rows() {
            for jj in (0..full).step_by(LANE_COUNT) {
                let ab = F64x4::splat(inp.alpha) * b_lanes(inp.b, panel, i, jj);
                let mut temp2 = F64x4::zero();
                for (k, &a_ik) in inp.a.strict_row(i).iter().enumerate() {
                    temp2 = temp2 + lane_step(inp.b, panel, ab, a_ik, k, jj);
                }
                close_lanes(inp, panel, ab, temp2, i, jj);
            }
            for j in full..width {
                entry(inp, panel, i, j);
            }
        }
    });
}

/// Vector lanes with the `k` reduction unrolled by four, panels in parallel.
///
/// The four partial `temp2` vectors are folded pairwise before closing the row.
pub fn combined(ops: &mut SymmOperands) {
    let (inp, c) = ops.split();
    par_column_panels(c, PANEL_COLS, |panel| {
        let width = panel.width();
        let full = width - width % LANE_COUNT;
        for i in 0..panel.rows() {
            let a_row = inp.a.strict_row(i);
            for jj in (0..full).step_by(LANE_COUNT) {
                let ab = F64x4::splat(inp.alpha) * b_lanes(inp.b, panel, i, jj);
                let mut t = [F64x4::zero(); UNROLL];

                let mut k = 0;
                while k + UNROLL <= i {
                    t[0] = t[0] + lane_step(inp.b, panel, ab, a_row[k], k, jj);
                    t[1] = t[1] + lane_step(inp.b, panel, ab, a_row[k + 1], k + 1, jj);
                    t[2] = t[2] + lane_step(inp.b, panel, ab, a_row[k + 2], k + 2, jj);
                    t[3] = t[3] + lane_step(inp.b, panel, ab, a_row[k + 3], k + 3, jj);
                    k += UNROLL;
                }
                for kk in k..i {
                    t[0] = t[0] + lane_step(inp.b, panel, ab, a_row[kk], kk, jj);
                }

                let temp2 = (t[0] + t[1]) + (t[2] + t[3]);
                close_lanes(inp, panel, ab, temp2, i, jj);
            }
            for j in full..width {
                entry_unrolled(inp, panel, i, j);
            }
        }
    });
}

/// The reference loop body over parallel column panels.
pub fn combined_simple(ops: &mut SymmOperands) {
    let (inp, c) = ops.split();
    par_column_panels(c, PANEL_COLS, |panel| {
        for i in 0..panel.rows() {
            for j in 0..panel.width() {
                entry(inp, panel, i, j);
            }
        }
    });
}

/// `B[i, start + jj .. start + jj + 4]` for the panel starting at `start`.
#[inline(always)]
fn b_lanes(b: &Matrix, panel: &ColumnPanel<'_>, i: usize, jj: usize) -> F64x4 {
    F64x4::from(&b.row(i)[panel.columns().start + jj..])
}

/// Pushes `ab * A[i, k]` into `C[k, jj..jj + 4]` and returns the `temp2`
/// contribution `B[k, jj..jj + 4] * A[i, k]`.
#[inline(always)]
fn lane_step(
    b: &Matrix,
    panel: &mut ColumnPanel<'_>,
    ab: F64x4,
    a_ik: f64,
    k: usize,
    jj: usize,
) -> F64x4 {
    let a_v = F64x4::splat(a_ik);
    let c_k = &mut panel.row_mut(k)[jj..jj + LANE_COUNT];
    (F64x4::from(&c_k[..]) + ab * a_v).store(c_k);
    b_lanes(b, panel, k, jj) * a_v
}

#[inline(always)]
fn close_lanes(
    inp: Inputs<'_>,
    panel: &mut ColumnPanel<'_>,
    ab: F64x4,
    temp2: F64x4,
    i: usize,
    jj: usize,
) {
    let a_ii = F64x4::splat(inp.a.diagonal(i));
    let c_i = &mut panel.row_mut(i)[jj..jj + LANE_COUNT];
    let updated = F64x4::splat(inp.beta) * F64x4::from(&c_i[..])
        + ab * a_ii
        + F64x4::splat(inp.alpha) * temp2;
    updated.store(c_i);
}

/// Scalar update of panel entry `(i, j)`.
#[inline(always)]
fn entry(inp: Inputs<'_>, panel: &mut ColumnPanel<'_>, i: usize, j: usize) {
    let col = panel.columns().start + j;
    let a_row = inp.a.strict_row(i);
    let ab = inp.alpha * inp.b[(i, col)];
    let mut temp2 = 0.0;
    for k in 0..i {
        panel[(k, j)] += ab * a_row[k];
        temp2 += inp.b[(k, col)] * a_row[k];
    }
    panel[(i, j)] = inp.beta * panel[(i, j)] + ab * inp.a.diagonal(i) + inp.alpha * temp2;
}

/// [`entry`] with the `k` loop unrolled by four.
#[inline(always)]
fn entry_unrolled(inp: Inputs<'_>, panel: &mut ColumnPanel<'_>, i: usize, j: usize) {
    let col = panel.columns().start + j;
    let a_row = inp.a.strict_row(i);
    let b = inp.b;
    let ab = inp.alpha * b[(i, col)];
    let mut temp2 = 0.0;

    let mut k = 0;
    while k + UNROLL <= i {
        panel[(k, j)] += ab * a_row[k];
        temp2 += b[(k, col)] * a_row[k];
        panel[(k + 1, j)] += ab * a_row[k + 1];
        temp2 += b[(k + 1, col)] * a_row[k + 1];
        panel[(k + 2, j)] += ab * a_row[k + 2];
        temp2 += b[(k + 2, col)] * a_row[k + 2];
        panel[(k + 3, j)] += ab * a_row[k + 3];
        temp2 += b[(k + 3, col)] * a_row[k + 3];
        k += UNROLL;
    }
    while k < i {
        panel[(k, j)] += ab * a_row[k];
        temp2 += b[(k, col)] * a_row[k];
        k += 1;
    }

    panel[(i, j)] = inp.beta * panel[(i, j)] + ab * inp.a.diagonal(i) + inp.alpha * temp2;
}
