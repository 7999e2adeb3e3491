//! Deterministic operand initializers.
//!
//! Every entry is a pure function of its indices and the dimensions, so two
//! calls with the same `(m, n)` produce bit-identical operands. Triangular
//! operands carry [`SENTINEL`](crate::matrix::SENTINEL) above the diagonal.

use crate::error::{validation_error, Result};
use crate::matrix::{Diag, LowerTriangular, Matrix};
use crate::symm::SymmOperands;
use crate::syrk::SyrkOperands;
use crate::trmm::TrmmOperands;

pub const SYMM_ALPHA: f64 = 1.5;
pub const SYMM_BETA: f64 = 1.2;
pub const SYRK_ALPHA: f64 = 1.5;
pub const SYRK_BETA: f64 = 1.2;
pub const TRMM_ALPHA: f64 = 1.5;

fn check_dims(m: usize, n: usize) -> Result<()> {
    if m == 0 || n == 0 {
        return Err(validation_error(format!(
            "dimensions must be positive, got m={m} n={n}"
        )));
    }
    Ok(())
}

/// Checks that a `rows x cols` buffer of `f64` is addressable.
fn check_buffer(operand: &str, rows: usize, cols: usize) -> Result<()> {
    rows.checked_mul(cols)
        .and_then(|len| len.checked_mul(std::mem::size_of::<f64>()))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .map(|_| ())
        .ok_or_else(|| {
            validation_error(format!(
                "operand {operand} of {rows}x{cols} values does not fit in memory"
            ))
        })
}

/// `A` is `m x m`, `B` and `C` are `m x n`.
pub fn init_symm(m: usize, n: usize) -> Result<SymmOperands> {
    check_dims(m, n)?;
    check_buffer("A", m, m)?;
    check_buffer("B", m, n)?;
    let mf = m as f64;

    let c = Matrix::from_fn(m, n, |i, j| ((i + j) % 100) as f64 / mf);
    let b = Matrix::from_fn(m, n, |i, j| ((n + i - j) % 100) as f64 / mf);
    let a = LowerTriangular::from_fn(m, Diag::NonUnit, |i, j| ((i + j) % 100) as f64 / mf);

    SymmOperands::new(SYMM_ALPHA, SYMM_BETA, a, b, c)
}

/// `A` is `n x m` (reduction depth `m`), `C` is `n x n`.
pub fn init_syrk(m: usize, n: usize) -> Result<SyrkOperands> {
    check_dims(m, n)?;
    check_buffer("A", n, m)?;
    check_buffer("C", n, n)?;
    let (mf, nf) = (m as f64, n as f64);

    let a = Matrix::from_fn(n, m, |i, j| ((i * j + 1) % n) as f64 / nf);
    let c = Matrix::from_fn(n, n, |i, j| ((i * j + 2) % m) as f64 / mf);

    SyrkOperands::new(SYRK_ALPHA, SYRK_BETA, a, c)
}

/// `A` is `m x m` unit lower triangular, `B` is `m x n`.
pub fn init_trmm(m: usize, n: usize) -> Result<TrmmOperands> {
    check_dims(m, n)?;
    check_buffer("A", m, m)?;
    check_buffer("B", m, n)?;
    let (mf, nf) = (m as f64, n as f64);

    let a = LowerTriangular::from_fn(m, Diag::Unit, |i, j| ((i + j) % m) as f64 / mf);
    let b = Matrix::from_fn(m, n, |i, j| ((n + i - j) % n) as f64 / nf);

    TrmmOperands::new(TRMM_ALPHA, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::matrix::SENTINEL;

    #[test]
    fn test_symm_small_values() {
        let ops = init_symm(4, 3).unwrap();
        assert_eq!(ops.c()[(1, 2)], 0.75);
        assert_eq!(ops.b()[(0, 2)], 0.25);
        assert_eq!(ops.a().lower(3, 1), 1.0);
        assert_eq!(ops.a().diagonal(2), 1.0);
        assert_eq!(ops.alpha(), 1.5);
        assert_eq!(ops.beta(), 1.2);
    }

    #[test]
    fn test_symm_sentinel_above_diagonal() {
        let dense = init_symm(3, 2).unwrap().into_parts().2.into_dense();
        assert_eq!(dense[(0, 1)], SENTINEL);
        assert_eq!(dense[(1, 2)], SENTINEL);
        assert_eq!(dense[(2, 1)], 1.0);
    }

    #[test]
    fn test_syrk_shapes_follow_m_n_order() {
        let ops = init_syrk(5, 3).unwrap();
        assert_eq!(ops.a().shape(), (3, 5));
        assert_eq!(ops.c().shape(), (3, 3));
        assert_eq!(ops.a()[(2, 2)], 2.0 / 3.0);
        assert_eq!(ops.c()[(1, 2)], 4.0 / 5.0);
    }

    #[test]
    fn test_trmm_unit_diagonal_and_b() {
        let ops = init_trmm(3, 4).unwrap();
        let dense = ops.a().clone().into_dense();
        assert_eq!(dense[(1, 1)], 1.0);
        assert_eq!(dense[(2, 1)], 0.0);
        assert_eq!(dense[(0, 2)], SENTINEL);
        assert_eq!(ops.b()[(0, 1)], 0.75);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(init_symm(6, 5).unwrap(), init_symm(6, 5).unwrap());
        assert_eq!(init_trmm(6, 5).unwrap(), init_trmm(6, 5).unwrap());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(init_symm(0, 3).is_err());
        assert!(init_syrk(3, 0).is_err());
        assert!(init_trmm(0, 0).is_err());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let huge = 1usize << (usize::BITS / 2);
        assert!(matches!(
            init_symm(huge, huge),
            Err(KernelError::ValidationError { .. })
        ));
        // only the square buffer overflows
        assert!(init_symm(huge, 1).is_err());
        assert!(init_syrk(1, huge).is_err());
        assert!(init_trmm(usize::MAX, 1).is_err());
    }
}
