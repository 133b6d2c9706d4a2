//! Five-point explicit stencil kernel.
//!
//! For every interior point `(i, j)`, `1 <= i < n`, `1 <= j < m`:
//!
//! ```text
//! laplacian = u[i,j-1] + u[i,j+1] + u[i-1,j] + u[i+1,j] - 4·u[i,j]
//! delta     = laplacian · dt · hi2 · alpha
//! v[i,j]    = u[i,j] + delta
//! ```
//!
//! Boundary points of `v` are never written.

use ember_core::{Discretization, GridView, GridViewMut};
use rayon::prelude::*;

/// Compute one step from `current` into `next` and return the residual,
/// the largest `|delta|` over all interior points.
///
/// Rows of `next` are split across the rayon workers of the calling
/// context; each worker reads only `current` and writes only its own rows.
/// Per-row maxima are combined with `f64::max`, which is associative and
/// commutative, so the residual does not depend on scheduling.
///
/// Returns `0.0` for grids without interior points.
///
/// # Panics
///
/// Panics if the two views have different dimensions.
pub fn step(current: GridView<'_>, next: &mut GridViewMut<'_>, disc: &Discretization) -> f64 {
    let dims = current.dims();
    assert_eq!(dims, next.dims(), "stencil buffers must have equal dimensions");

    let w = dims.cols();
    let m = dims.m();
    let src = current.as_slice();

    next.interior_rows_mut()
        .par_chunks_mut(w)
        .enumerate()
        .map(|(r, dst)| {
            let i = r + 1;
            let row = i * w;
            let mut row_max = 0.0f64;
            for j in 1..m {
                let idx = row + j;
                let laplacian = src[idx - 1] + src[idx + 1] + src[idx - w] + src[idx + w]
                    - 4.0 * src[idx];
                let delta = disc.delta(laplacian);
                dst[j] = src[idx] + delta;
                row_max = row_max.max(delta.abs());
            }
            row_max
        })
        .reduce(|| 0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{GridDims, HeatConfig};
    use ember_test_utils::{random_profile, reference_step, seeded_profile};

    fn disc(dims: GridDims) -> Discretization {
        HeatConfig::default().discretize(dims).unwrap()
    }

    #[test]
    fn scenario_a_single_point() {
        let dims = GridDims::new(4, 4).unwrap();
        let config = HeatConfig::default();
        let u = seeded_profile(dims, &config);
        let mut v = u.clone();
        let d = disc(dims);

        let residual = step(
            GridView::new(&u, dims).unwrap(),
            &mut GridViewMut::new(&mut v, dims).unwrap(),
            &d,
        );

        let h = 2.0 / 4.0;
        let hi = 1.0 / h;
        let hi2 = hi * hi;
        let dt = h * h / (4.0 * 22.0);
        let delta = (100.0 + 10.0 + 10.0 + 10.0 - 4.0 * 10.0) * dt * hi2 * 22.0;
        assert_eq!(v[dims.index(1, 1).unwrap()], 10.0 + delta);
        // Only row 1 sees the hot row; rows 2 and 3 are uniform.
        assert_eq!(v[dims.index(2, 2).unwrap()], 10.0);
        assert_eq!(residual, delta.abs());
    }

    #[test]
    fn uniform_field_has_zero_residual() {
        let dims = GridDims::new(8, 5).unwrap();
        let u = vec![37.5; dims.cell_count()];
        let mut v = u.clone();
        let residual = step(
            GridView::new(&u, dims).unwrap(),
            &mut GridViewMut::new(&mut v, dims).unwrap(),
            &disc(dims),
        );
        assert_eq!(residual, 0.0);
        assert_eq!(u, v);
    }

    #[test]
    fn boundary_of_next_is_not_written() {
        let dims = GridDims::new(5, 6).unwrap();
        let u = random_profile(dims, 11, 0.0, 100.0);
        let mut v = vec![f64::NAN; dims.cell_count()];
        step(
            GridView::new(&u, dims).unwrap(),
            &mut GridViewMut::new(&mut v, dims).unwrap(),
            &disc(dims),
        );
        for i in 0..dims.rows() {
            for j in 0..dims.cols() {
                let value = v[dims.index(i, j).unwrap()];
                if dims.is_boundary(i, j) {
                    assert!(value.is_nan(), "boundary ({i}, {j}) was written");
                } else {
                    assert!(value.is_finite(), "interior ({i}, {j}) was skipped");
                }
            }
        }
    }

    #[test]
    fn matches_serial_reference_bitwise() {
        let dims = GridDims::new(17, 23).unwrap();
        let u = random_profile(dims, 5, 10.0, 100.0);
        let d = disc(dims);

        let mut parallel = u.clone();
        let r_par = step(
            GridView::new(&u, dims).unwrap(),
            &mut GridViewMut::new(&mut parallel, dims).unwrap(),
            &d,
        );
        let mut serial = u.clone();
        let r_ser = reference_step(&u, &mut serial, dims, &d);

        ember_test_utils::assert_bits_eq(&parallel, &serial);
        assert_eq!(r_par.to_bits(), r_ser.to_bits());
    }

    #[test]
    fn thin_grids_are_a_no_op() {
        for (n, m) in [(1, 5), (5, 1), (1, 1)] {
            let dims = GridDims::new(n, m).unwrap();
            let u = random_profile(dims, 2, 0.0, 1.0);
            let mut v = u.clone();
            let residual = step(
                GridView::new(&u, dims).unwrap(),
                &mut GridViewMut::new(&mut v, dims).unwrap(),
                &disc(dims),
            );
            assert_eq!(residual, 0.0);
            assert_eq!(u, v);
        }
    }
}
