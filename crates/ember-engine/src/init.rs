//! Grid initializer.

use ember_core::HeatConfig;
use ember_store::GridArena;

/// Write the initial temperature profile into both buffers.
///
/// Every point of row `i` gets `u_max` if `i < m / 3`, `u_min` otherwise.
/// Boundary rows and columns are written here and never again: both
/// buffers therefore carry identical Dirichlet boundaries for the whole run.
pub fn seed(arena: &mut GridArena<'_>, config: &HeatConfig) {
    let dims = arena.dims();
    let (a, b) = arena.both_mut();
    for i in 0..dims.rows() {
        let value = config.initial_temperature(dims, i);
        a.fill_row(i, value);
        b.fill_row(i, value);
    }
}
