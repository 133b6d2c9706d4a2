//! Benchmark profiles for the Ember heat-diffusion engine.
//!
//! - [`reference_dims`]: 512x512 intervals (~263K points, ~4 MiB per buffer)
//! - [`stress_dims`]: 2048x2048 intervals (~4.2M points, ~32 MiB per buffer)
//! - [`bench_config`]: a [`RunConfig`] pinned to a worker count, using
//!   `msync` so results do not depend on the filesystem.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ember_core::GridDims;
use ember_engine::RunConfig;
use ember_store::DurabilityMode;

/// Reference grid for per-step timings.
pub fn reference_dims() -> GridDims {
    GridDims::new(512, 512).expect("reference dims are valid")
}

/// Large grid for scaling runs.
pub fn stress_dims() -> GridDims {
    GridDims::new(2048, 2048).expect("stress dims are valid")
}

/// Run configuration with `workers` stencil threads.
pub fn bench_config(workers: usize) -> RunConfig {
    RunConfig {
        workers: Some(workers),
        durability: DurabilityMode::ForceMsync,
        ..RunConfig::default()
    }
}

/// Worker counts to sweep: 1, 2, 4, ... up to the available parallelism.
pub fn worker_sweep() -> Vec<usize> {
    let max = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(RunConfig::MAX_WORKERS);
    let mut counts: Vec<usize> = std::iter::successors(Some(1usize), |&w| Some(w * 2))
        .take_while(|&w| w < max)
        .collect();
    counts.push(max);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_discretize() {
        let config = bench_config(2);
        config.heat.discretize(reference_dims()).unwrap();
        config.heat.discretize(stress_dims()).unwrap();
        assert_eq!(config.resolved_worker_count(), 2);
    }

    #[test]
    fn sweep_is_increasing_and_ends_at_max() {
        let sweep = worker_sweep();
        assert_eq!(sweep[0], 1);
        assert!(sweep.windows(2).all(|w| w[0] < w[1]));
    }
}
