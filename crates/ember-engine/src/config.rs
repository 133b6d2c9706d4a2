//! Run configuration.

use ember_core::{ConfigError, HeatConfig};
use ember_store::DurabilityMode;

/// Everything a run needs besides the grid size, step count and path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunConfig {
    /// Physics constants shared by the initializer and the kernel.
    pub heat: HeatConfig,
    /// Number of stencil worker threads. `None` = available parallelism.
    pub workers: Option<usize>,
    /// How the store picks its synchronization strategy.
    pub durability: DurabilityMode,
}

impl RunConfig {
    /// Upper bound on explicit worker counts.
    pub const MAX_WORKERS: usize = 256;

    /// Resolve the worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, MAX_WORKERS]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.clamp(1, Self::MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(Self::MAX_WORKERS),
        }
    }

    /// Check the physics constants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.heat.validate()
    }
}
