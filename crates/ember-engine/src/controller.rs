//! Iteration controller.
//!
//! Drives a fixed number of stencil steps over a [`Store`], swapping the
//! roles of the two buffers after every step, and performs the two
//! synchronizations that bound what survives a crash:
//!
//! 1. [`Controller::prepare`]: after both buffers are seeded.
//! 2. [`Controller::run`]: after the last step and the header update.
//!
//! No step is flushed individually. A crash mid-run leaves a file whose
//! durable content is the seeded state with `steps_completed = 0`.

use ember_core::{Discretization, GridDims, GridView, HeatConfig};
use ember_store::{GridArena, Store};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, trace};

use crate::config::RunConfig;
use crate::error::RunError;
use crate::{init, kernel};

/// Callback invoked after every completed step.
///
/// `step` counts from 1; `grid` is the buffer that just became current.
pub trait StepObserver {
    /// Observe the state after `step` steps.
    fn on_step(&mut self, step: u64, residual: f64, grid: GridView<'_>);
}

impl<F> StepObserver for F
where
    F: FnMut(u64, f64, GridView<'_>),
{
    fn on_step(&mut self, step: u64, residual: f64, grid: GridView<'_>) {
        self(step, residual, grid)
    }
}

/// Observer that ignores every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObserver;

impl StepObserver for NoObserver {
    fn on_step(&mut self, _step: u64, _residual: f64, _grid: GridView<'_>) {}
}

/// Result of a completed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOutcome {
    /// Steps executed; equals the requested count.
    pub steps: u64,
    /// Residual of the last step, or `0.0` if no step ran.
    pub residual: f64,
}

/// Owns the per-run coefficients and the stencil worker pool.
pub struct Controller {
    heat: HeatConfig,
    dims: GridDims,
    disc: Discretization,
    pool: ThreadPool,
}

impl Controller {
    /// Validate `config` for a grid of `dims` and start the worker pool.
    pub fn new(config: &RunConfig, dims: GridDims) -> Result<Self, RunError> {
        let disc = config.heat.discretize(dims)?;
        let workers = config.resolved_worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ember-stencil-{i}"))
            .build()
            .map_err(|e| RunError::ThreadPool {
                reason: e.to_string(),
            })?;
        debug!(workers, h = disc.h, dt = disc.dt, "controller ready");
        Ok(Self {
            heat: config.heat.clone(),
            dims,
            disc,
            pool,
        })
    }

    /// Number of stencil worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Step coefficients used by the kernel.
    pub fn discretization(&self) -> &Discretization {
        &self.disc
    }

    /// Seed both buffers and make the seeded state durable.
    ///
    /// This is the first of the two synchronization points.
    pub fn prepare(&self, store: &mut Store) -> Result<(), RunError> {
        self.check_dims(store)?;
        {
            let mut arena = store.arena()?;
            init::seed(&mut arena, &self.heat);
        }
        store.synchronize_all()?;
        info!(hot_rows = self.heat.hot_rows(self.dims), "seeded initial state");
        Ok(())
    }

    /// Compute one step into the next buffer and swap roles.
    ///
    /// Returns the residual of this step; the accumulator starts at zero
    /// on every call.
    pub fn step(&self, arena: &mut GridArena<'_>) -> f64 {
        let residual = {
            let (current, next) = arena.split();
            self.pool.install(|| kernel::step(current, next, &self.disc))
        };
        arena.swap();
        residual
    }

    /// Run exactly `steps_max` steps, then record the count in the header
    /// and make the store durable.
    pub fn run(&self, store: &mut Store, steps_max: u64) -> Result<RunOutcome, RunError> {
        self.run_observed(store, steps_max, &mut NoObserver)
    }

    /// As [`Controller::run`], calling `observer` after every step.
    ///
    /// The residual is reported but never compared against `eps`:
    /// termination depends only on `steps_max`.
    pub fn run_observed(
        &self,
        store: &mut Store,
        steps_max: u64,
        observer: &mut dyn StepObserver,
    ) -> Result<RunOutcome, RunError> {
        self.check_dims(store)?;
        info!(steps_max, workers = self.workers(), "starting run");

        let mut residual = 0.0;
        {
            let mut arena = store.arena()?;
            for step in 0..steps_max {
                residual = self.step(&mut arena);
                trace!(step = step + 1, residual, "step done");
                observer.on_step(step + 1, residual, arena.view(arena.current()));
            }
        }

        store.set_steps_completed(steps_max);
        store.synchronize_all()?;
        info!(steps = steps_max, residual, "run complete");

        Ok(RunOutcome {
            steps: steps_max,
            residual,
        })
    }

    fn check_dims(&self, store: &Store) -> Result<(), RunError> {
        if store.dims() != self.dims {
            return Err(RunError::DimensionMismatch {
                expected: self.dims,
                found: store.dims(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("heat", &self.heat)
            .field("dims", &self.dims)
            .field("disc", &self.disc)
            .field("workers", &self.workers())
            .finish()
    }
}
