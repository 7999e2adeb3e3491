//! Dense and lower-triangular `f64` matrices in row-major storage.
//!
//! [`Matrix`] is a plain dense matrix. [`LowerTriangular`] wraps a padded
//! `order x order` buffer but only hands out entries on or below the
//! diagonal: the strict upper region exists in memory (the initializers fill
//! it with [`SENTINEL`]) yet no method of the type can read it.

use std::ops::{Index, IndexMut};

use ndarray::Array2;

use crate::error::{dimension_mismatch, validation_error, Result};

/// Value written into storage that no correct kernel may read.
pub const SENTINEL: f64 = -999.0;

/// Row-major index of `(i, j)` with leading dimension `ld`.
#[inline(always)]
pub(crate) fn at(i: usize, j: usize, ld: usize) -> usize {
    i * ld + j
}

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a `rows x cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix whose entry `(i, j)` is `f(i, j)`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(validation_error(format!(
                "buffer holds {} values, a {rows}x{cols} matrix needs {}",
                data.len(),
                rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row `i` as a contiguous slice of `cols` values.
    #[inline(always)]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copies the matrix into an `ndarray` array of the same shape.
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows, self.cols), |(i, j)| self[(i, j)])
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[at(i, j, self.cols)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        debug_assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &mut self.data[at(i, j, self.cols)]
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(array: Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        // `iter` walks in logical (row-major) order regardless of the array's memory layout.
        let data = array.iter().copied().collect();
        Self { rows, cols, data }
    }
}

/// How the diagonal of a [`LowerTriangular`] matrix is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diag {
    /// Diagonal entries are stored and read.
    NonUnit,
    /// Diagonal entries are implicitly `1.0` and never read by kernels.
    Unit,
}

/// Square matrix of which only the lower triangle (`j <= i`) is valid.
///
/// Storage is a padded row-major `order x order` buffer. Row `i` exposes
/// `A[i, 0..=i]`; the strict upper triangle is unreachable through this type.
#[derive(Debug, Clone, PartialEq)]
pub struct LowerTriangular {
    order: usize,
    diag: Diag,
    data: Vec<f64>,
}

impl LowerTriangular {
    /// Builds the matrix from `f(i, j)` evaluated on the valid triangle only.
    ///
    /// For [`Diag::Unit`], `f` is called for `j < i` and the diagonal is stored
    /// as `1.0`. The strict upper triangle is filled with [`SENTINEL`].
    pub fn from_fn<F>(order: usize, diag: Diag, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = vec![SENTINEL; order * order];
        for i in 0..order {
            for j in 0..i {
                data[at(i, j, order)] = f(i, j);
            }
            data[at(i, i, order)] = match diag {
                Diag::NonUnit => f(i, i),
                Diag::Unit => 1.0,
            };
        }
        Self { order, diag, data }
    }

    /// Takes over the storage of a square dense matrix.
    ///
    /// Whatever the dense matrix holds above the diagonal stays in memory but
    /// becomes unreadable.
    ///
    /// # Errors
    ///
    /// Returns a dimension mismatch if `dense` is not square.
    pub fn from_dense(dense: Matrix, diag: Diag) -> Result<Self> {
        if dense.rows != dense.cols {
            return Err(dimension_mismatch(
                "A",
                (dense.rows, dense.rows),
                dense.shape(),
            ));
        }
        Ok(Self {
            order: dense.rows,
            diag,
            data: dense.data,
        })
    }

    /// Gives the padded storage back as a dense matrix, upper region included.
    pub fn into_dense(self) -> Matrix {
        Matrix {
            rows: self.order,
            cols: self.order,
            data: self.data,
        }
    }

    #[inline(always)]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline(always)]
    pub fn diag(&self) -> Diag {
        self.diag
    }

    /// `A[i, 0..=i]`. For a unit-diagonal matrix the last entry is the stored
    /// `1.0`, use [`strict_row`](Self::strict_row) to skip it.
    #[inline(always)]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.order;
        &self.data[start..start + i + 1]
    }

    /// `A[i, 0..i]`, the row without its diagonal entry.
    #[inline(always)]
    pub fn strict_row(&self, i: usize) -> &[f64] {
        let start = i * self.order;
        &self.data[start..start + i]
    }

    /// Diagonal entry `A[i, i]`; always `1.0` for [`Diag::Unit`].
    #[inline(always)]
    pub fn diagonal(&self, i: usize) -> f64 {
        match self.diag {
            Diag::NonUnit => self.data[at(i, i, self.order)],
            Diag::Unit => 1.0,
        }
    }

    /// Entry `A[i, j]` of the lower triangle.
    ///
    /// # Panics
    ///
    /// Panics if `j > i`.
    #[inline(always)]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        assert!(j <= i, "A[{i}, {j}] lies above the diagonal");
        if i == j {
            self.diagonal(i)
        } else {
            self.data[at(i, j, self.order)]
        }
    }

    /// Dense copy with the upper triangle zeroed, the triangular operator itself.
    pub fn to_lower_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.order, self.order), |(i, j)| {
            if j <= i {
                self.lower(i, j)
            } else {
                0.0
            }
        })
    }

    /// Dense copy with the upper triangle mirrored from the lower one.
    pub fn to_symmetric_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.order, self.order), |(i, j)| {
            if j <= i {
                self.lower(i, j)
            } else {
                self.lower(j, i)
            }
        })
    }
}
