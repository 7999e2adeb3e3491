//! Flat data-parallel fan-out over disjoint column panels of a matrix.
//!
//! SYMM and TRMM update every output column independently of the others, so
//! splitting the output by columns gives each rayon worker exclusive
//! ownership of its panel while the row loop inside a panel stays sequential.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut, Range};

use rayon::prelude::*;

use crate::matrix::Matrix;

/// A `rows x width` window of a row-major matrix covering columns
/// `start..start + width` of every row.
///
/// Panels produced by [`ColumnPanel::split`] never overlap, which is what
/// makes handing them to different threads sound.
pub struct ColumnPanel<'a> {
    ptr: *mut f64,
    ld: usize,
    rows: usize,
    start: usize,
    width: usize,
    _marker: PhantomData<&'a mut [f64]>,
}

// SAFETY: a panel only ever touches its own column range, disjoint from every
// other panel split from the same matrix, and the matrix stays mutably
// borrowed for the panel's lifetime.
unsafe impl Send for ColumnPanel<'_> {}

impl<'a> ColumnPanel<'a> {
    /// Splits `matrix` into panels of `panel_cols` columns (the last one may be
    /// narrower).
    ///
    /// # Panics
    ///
    /// Panics if `panel_cols` is zero.
    pub fn split(matrix: &'a mut Matrix, panel_cols: usize) -> Vec<ColumnPanel<'a>> {
        assert!(panel_cols > 0, "panel width must be positive");

        let (rows, cols) = matrix.shape();
        let ptr = matrix.as_mut_slice().as_mut_ptr();

        (0..cols)
            .step_by(panel_cols)
            .map(|start| ColumnPanel {
                ptr,
                ld: cols,
                rows,
                start,
                width: panel_cols.min(cols - start),
                _marker: PhantomData,
            })
            .collect()
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns of the parent matrix covered by this panel.
    #[inline(always)]
    pub fn columns(&self) -> Range<usize> {
        self.start..self.start + self.width
    }

    /// Row `i` restricted to the panel's columns.
    #[inline(always)]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row {i} out of bounds ({} rows)", self.rows);
        // SAFETY: `i < rows` and `start + width <= ld`, so the range lies inside
        // the parent buffer and inside this panel's columns.
        unsafe {
            std::slice::from_raw_parts(self.ptr.add(i * self.ld + self.start), self.width)
        }
    }

    #[inline(always)]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        assert!(i < self.rows, "row {i} out of bounds ({} rows)", self.rows);
        // SAFETY: as in `row`; `&mut self` keeps the returned slice unique.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.add(i * self.ld + self.start), self.width)
        }
    }
}

impl Index<(usize, usize)> for ColumnPanel<'_> {
    type Output = f64;

    /// `(row, panel-local column)`.
    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.row(i)[j]
    }
}

impl IndexMut<(usize, usize)> for ColumnPanel<'_> {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.row_mut(i)[j]
    }
}

/// Runs `kernel` once per column panel of `matrix`, panels in parallel.
pub fn par_column_panels<F>(matrix: &mut Matrix, panel_cols: usize, kernel: F)
where
    F: Fn(&mut ColumnPanel<'_>) + Sync + Send,
{
    let panels = ColumnPanel::split(matrix, panel_cols);
    log::debug!(
        "fanning out {} column panel(s) of width <= {}",
        panels.len(),
        panel_cols
    );
    panels
        .into_par_iter()
        .for_each(|mut panel| kernel(&mut panel));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_covers_all_columns() {
        let mut m = Matrix::zeros(3, 10);
        let panels = ColumnPanel::split(&mut m, 4);
        let ranges: Vec<_> = panels.iter().map(|p| p.columns()).collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert!(panels.iter().all(|p| p.rows() == 3));
    }

    #[test]
    fn test_split_empty_matrix() {
        let mut m = Matrix::zeros(3, 0);
        assert!(ColumnPanel::split(&mut m, 4).is_empty());
    }

    #[test]
    fn test_panel_rows_map_to_parent() {
        let mut m = Matrix::from_fn(2, 5, |i, j| (i * 5 + j) as f64);
        {
            let mut panels = ColumnPanel::split(&mut m, 3);
            assert_eq!(panels[1].row(1), &[8.0, 9.0]);
            panels[1][(0, 1)] = -1.0;
        }
        assert_eq!(m[(0, 4)], -1.0);
    }

    #[test]
    fn test_par_column_panels_touches_every_entry_once() {
        let mut m = Matrix::zeros(7, 150);
        par_column_panels(&mut m, 16, |panel| {
            let offset = panel.columns().start;
            for i in 0..panel.rows() {
                for (j, v) in panel.row_mut(i).iter_mut().enumerate() {
                    *v += (i * 1000 + offset + j) as f64;
                }
            }
        });
        for i in 0..7 {
            for j in 0..150 {
                assert_eq!(m[(i, j)], (i * 1000 + j) as f64);
            }
        }
    }
}
