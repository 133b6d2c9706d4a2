//! One-call run driver.

use std::fmt;
use std::path::{Path, PathBuf};

use ember_core::GridDims;
use ember_store::{DurabilityKind, Store};

use crate::config::RunConfig;
use crate::controller::Controller;
use crate::error::RunError;

/// What a finished run reports.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: u64,
    /// Residual of the last step.
    pub residual: f64,
    /// Convergence threshold from the run configuration. Informational.
    pub eps: f64,
    /// Path of the written store.
    pub path: PathBuf,
    /// Synchronization strategy the store used.
    pub durability: DurabilityKind,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {:7} done, residual {:10.8} <= {:10.8}",
            self.steps, self.residual, self.eps
        )
    }
}

/// Create a store at `path`, seed it, run `steps_max` steps and release it.
///
/// The configuration is validated and the worker pool started before the
/// file is created, so invalid input never leaves a file behind.
///
/// # Errors
///
/// Any [`RunError`]. On a storage create error the path is left as it was
/// found. Errors after creation leave the file with whatever the last
/// completed synchronization made durable.
pub fn simulate(
    path: impl AsRef<Path>,
    dims: GridDims,
    steps_max: u64,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let controller = Controller::new(config, dims)?;
    let mut store = Store::create(path, dims, config.durability)?;
    let durability = store.durability();

    controller.prepare(&mut store)?;
    let outcome = controller.run(&mut store, steps_max)?;

    Ok(RunSummary {
        steps: outcome.steps,
        residual: outcome.residual,
        eps: config.heat.eps,
        path: store.release(),
        durability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_format() {
        let summary = RunSummary {
            steps: 42,
            residual: 0.5,
            eps: 1e-3,
            path: PathBuf::from("out.bin"),
            durability: DurabilityKind::Msync,
        };
        assert_eq!(
            summary.to_string(),
            "step      42 done, residual 0.50000000 <= 0.00100000"
        );
    }
}
