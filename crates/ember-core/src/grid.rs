//! Bounds-checked 2D views over flat row-major grid buffers.
//!
//! [`GridView`] and [`GridViewMut`] borrow a contiguous `[f64]` of exactly
//! [`GridDims::cell_count`] values and address it by `(row, col)` with a
//! stride of `m + 1`. They never own memory: the backing slice may live in
//! a `Vec` or inside a memory-mapped file. [`Grid`] is the owned variant,
//! checked once at construction.

use std::ops::{Index, IndexMut};

use crate::dims::GridDims;

/// An owned grid buffer whose length matches its dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    data: Vec<f64>,
    dims: GridDims,
}

impl Grid {
    /// Take ownership of `data` as a grid of `dims`.
    ///
    /// Returns `None` if `data.len() != dims.cell_count()`.
    pub fn new(data: Vec<f64>, dims: GridDims) -> Option<Self> {
        (data.len() == dims.cell_count()).then_some(Self { data, dims })
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Borrow as a read-only view.
    pub fn view(&self) -> GridView<'_> {
        GridView {
            data: &self.data,
            dims: self.dims,
        }
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Give back the buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Read-only 2D view of one grid buffer.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    data: &'a [f64],
    dims: GridDims,
}

impl<'a> GridView<'a> {
    /// Wrap `data` as a grid of `dims`.
    ///
    /// Returns `None` if `data.len() != dims.cell_count()`.
    pub fn new(data: &'a [f64], dims: GridDims) -> Option<Self> {
        (data.len() == dims.cell_count()).then_some(Self { data, dims })
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Value at `(i, j)`, or `None` if out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.dims.index(i, j).map(|idx| self.data[idx])
    }

    /// Row `i` as a slice of `m + 1` values.
    ///
    /// # Panics
    ///
    /// Panics if `i > n`.
    pub fn row(&self, i: usize) -> &'a [f64] {
        let cols = self.dims.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

    /// The whole buffer in row-major order.
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}

impl Index<(usize, usize)> for GridView<'_> {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        match self.dims.index(i, j) {
            Some(idx) => &self.data[idx],
            None => panic!("grid index ({i}, {j}) out of range for {:?}", self.dims),
        }
    }
}

/// Mutable 2D view of one grid buffer.
#[derive(Debug)]
pub struct GridViewMut<'a> {
    data: &'a mut [f64],
    dims: GridDims,
}

impl<'a> GridViewMut<'a> {
    /// Wrap `data` as a grid of `dims`.
    ///
    /// Returns `None` if `data.len() != dims.cell_count()`.
    pub fn new(data: &'a mut [f64], dims: GridDims) -> Option<Self> {
        if data.len() == dims.cell_count() {
            Some(Self { data, dims })
        } else {
            None
        }
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Value at `(i, j)`, or `None` if out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.dims.index(i, j).map(|idx| self.data[idx])
    }

    /// Mutable reference to `(i, j)`, or `None` if out of range.
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut f64> {
        self.dims.index(i, j).map(move |idx| &mut self.data[idx])
    }

    /// Mutable row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i > n`.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let cols = self.dims.cols();
        &mut self.data[i * cols..(i + 1) * cols]
    }

    /// Set every value in row `i` to `value`.
    pub fn fill_row(&mut self, i: usize, value: f64) {
        self.row_mut(i).fill(value);
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> GridView<'_> {
        GridView {
            data: &*self.data,
            dims: self.dims,
        }
    }

    /// The whole buffer in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut *self.data
    }

    /// Interior rows `1..n` as one contiguous mutable slice.
    ///
    /// Each chunk of `m + 1` values is one lattice row, starting at row 1.
    /// Empty when `n < 2`.
    pub fn interior_rows_mut(&mut self) -> &mut [f64] {
        let cols = self.dims.cols();
        let n = self.dims.n();
        if n < 2 {
            return &mut [];
        }
        &mut self.data[cols..n * cols]
    }
}

impl Index<(usize, usize)> for GridViewMut<'_> {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        match self.dims.index(i, j) {
            Some(idx) => &self.data[idx],
            None => panic!("grid index ({i}, {j}) out of range for {:?}", self.dims),
        }
    }
}

impl IndexMut<(usize, usize)> for GridViewMut<'_> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        match self.dims.index(i, j) {
            Some(idx) => &mut self.data[idx],
            None => panic!("grid index ({i}, {j}) out of range for {:?}", self.dims),
        }
    }
}
