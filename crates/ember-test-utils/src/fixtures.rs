//! Grid fixtures and a serial reference kernel.

use ember_core::{Discretization, GridDims, HeatConfig};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The profile the initializer must produce: rows `i < m / 3` at `u_max`,
/// all other rows at `u_min`.
pub fn seeded_profile(dims: GridDims, config: &HeatConfig) -> Vec<f64> {
    let hot = dims.m() / 3;
    let mut out = Vec::with_capacity(dims.cell_count());
    for i in 0..dims.rows() {
        let value = if i < hot { config.u_max } else { config.u_min };
        out.extend(std::iter::repeat_n(value, dims.cols()));
    }
    out
}

/// Deterministic pseudo-random profile with values in `[lo, hi)`.
pub fn random_profile(dims: GridDims, seed: u64, lo: f64, hi: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..dims.cell_count())
        .map(|_| {
            // 53 random mantissa bits mapped to [0, 1).
            let unit = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
            lo + unit * (hi - lo)
        })
        .collect()
}

/// One serial five-point stencil step over the interior of `current`.
///
/// Boundary points of `next` are left untouched. Returns the largest
/// absolute update.
pub fn reference_step(
    current: &[f64],
    next: &mut [f64],
    dims: GridDims,
    disc: &Discretization,
) -> f64 {
    let w = dims.cols();
    let mut residual = 0.0f64;
    for i in 1..dims.n() {
        for j in 1..dims.m() {
            let idx = i * w + j;
            let laplacian = current[idx - 1] + current[idx + 1] + current[idx - w]
                + current[idx + w]
                - 4.0 * current[idx];
            let delta = laplacian * disc.dt * disc.hi2 * disc.alpha;
            next[idx] = current[idx] + delta;
            residual = residual.max(delta.abs());
        }
    }
    residual
}

/// Run `steps` serial steps from `initial` in two plain vectors.
///
/// Returns `(a, b, residual)`; the latest state is in `a` for even `steps`
/// and in `b` for odd `steps`.
pub fn reference_run(
    initial: &[f64],
    dims: GridDims,
    disc: &Discretization,
    steps: u64,
) -> (Vec<f64>, Vec<f64>, f64) {
    let mut a = initial.to_vec();
    let mut b = initial.to_vec();
    let mut residual = 0.0;
    for step in 0..steps {
        residual = if step % 2 == 0 {
            reference_step(&a, &mut b, dims, disc)
        } else {
            reference_step(&b, &mut a, dims, disc)
        };
    }
    (a, b, residual)
}
