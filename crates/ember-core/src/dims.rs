//! Grid geometry.

use crate::error::ConfigError;

/// Size in bytes of one grid value.
pub const VALUE_SIZE: usize = std::mem::size_of::<f64>();

/// Dimensions of a simulation grid, given as interval counts.
///
/// A grid of `n × m` intervals has `(n + 1) × (m + 1)` lattice points,
/// including the boundary rows `0` and `n` and boundary columns `0` and
/// `m`. Points are stored row-major with a stride of `m + 1`.
///
/// Validated at construction; immutable for the lifetime of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    n: usize,
    m: usize,
}

impl GridDims {
    /// Create grid dimensions for `n` row intervals and `m` column intervals.
    ///
    /// Returns `Err(ConfigError::InvalidDimensions)` if either is zero, or
    /// `Err(ConfigError::SizeOverflow)` if the byte size of one grid does
    /// not fit in `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_core::GridDims;
    ///
    /// let dims = GridDims::new(4, 6).unwrap();
    /// assert_eq!(dims.rows(), 5);
    /// assert_eq!(dims.cols(), 7);
    /// assert_eq!(dims.cell_count(), 35);
    /// assert_eq!(dims.byte_len(), 35 * 8);
    /// ```
    pub fn new(n: usize, m: usize) -> Result<Self, ConfigError> {
        if n == 0 || m == 0 {
            return Err(ConfigError::InvalidDimensions { n, m });
        }
        n.checked_add(1)
            .zip(m.checked_add(1))
            .and_then(|(rows, cols)| rows.checked_mul(cols))
            .and_then(|cells| cells.checked_mul(VALUE_SIZE))
            .ok_or(ConfigError::SizeOverflow { n, m })?;
        Ok(Self { n, m })
    }

    /// Number of row intervals (`n`). The last row index is `n`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of column intervals (`m`). The last column index is `m`.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of lattice rows, `n + 1`.
    pub fn rows(&self) -> usize {
        self.n + 1
    }

    /// Number of lattice columns, `m + 1`. This is also the row stride.
    pub fn cols(&self) -> usize {
        self.m + 1
    }

    /// Total number of lattice points, `(n + 1) * (m + 1)`.
    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Size in bytes of one grid buffer.
    pub fn byte_len(&self) -> usize {
        self.cell_count() * VALUE_SIZE
    }

    /// Flat index of lattice point `(i, j)`, or `None` if out of range.
    pub fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i <= self.n && j <= self.m).then(|| i * self.cols() + j)
    }

    /// Whether `(i, j)` lies on the Dirichlet boundary.
    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.n || j == self.m
    }

    /// Whether the grid has at least one interior point.
    pub fn has_interior(&self) -> bool {
        self.n >= 2 && self.m >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_dimension_rejected() {
        assert_eq!(
            GridDims::new(0, 4),
            Err(ConfigError::InvalidDimensions { n: 0, m: 4 })
        );
        assert_eq!(
            GridDims::new(4, 0),
            Err(ConfigError::InvalidDimensions { n: 4, m: 0 })
        );
    }

    #[test]
    fn overflow_rejected() {
        let err = GridDims::new(usize::MAX / 2, 3).unwrap_err();
        assert!(matches!(err, ConfigError::SizeOverflow { .. }));
        assert!(GridDims::new(usize::MAX, 1).is_err());
    }

    #[test]
    fn index_is_row_major_with_stride_m_plus_one() {
        let dims = GridDims::new(2, 3).unwrap();
        assert_eq!(dims.index(0, 0), Some(0));
        assert_eq!(dims.index(0, 3), Some(3));
        assert_eq!(dims.index(1, 0), Some(4));
        assert_eq!(dims.index(2, 3), Some(11));
        assert_eq!(dims.index(3, 0), None);
        assert_eq!(dims.index(0, 4), None);
    }

    #[test]
    fn boundary_classification() {
        let dims = GridDims::new(4, 4).unwrap();
        assert!(dims.is_boundary(0, 2));
        assert!(dims.is_boundary(4, 2));
        assert!(dims.is_boundary(2, 0));
        assert!(dims.is_boundary(2, 4));
        assert!(!dims.is_boundary(2, 2));
    }

    #[test]
    fn thin_grids_have_no_interior() {
        assert!(!GridDims::new(1, 10).unwrap().has_interior());
        assert!(!GridDims::new(10, 1).unwrap().has_interior());
        assert!(GridDims::new(2, 2).unwrap().has_interior());
    }

    proptest! {
        #[test]
        fn index_covers_every_cell_once(n in 1usize..40, m in 1usize..40) {
            let dims = GridDims::new(n, m).unwrap();
            let mut seen = vec![false; dims.cell_count()];
            for i in 0..dims.rows() {
                for j in 0..dims.cols() {
                    let idx = dims.index(i, j).unwrap();
                    prop_assert!(!seen[idx]);
                    seen[idx] = true;
                }
            }
            prop_assert!(seen.iter().all(|&s| s));
            prop_assert_eq!(dims.byte_len(), dims.cell_count() * VALUE_SIZE);
        }

        #[test]
        fn interior_count(n in 1usize..40, m in 1usize..40) {
            let dims = GridDims::new(n, m).unwrap();
            let interior = (0..dims.rows())
                .flat_map(|i| (0..dims.cols()).map(move |j| (i, j)))
                .filter(|&(i, j)| !dims.is_boundary(i, j))
                .count();
            prop_assert_eq!(interior, (n - 1) * (m - 1));
            prop_assert_eq!(interior > 0, dims.has_interior());
        }
    }
}
