//! Stencil computation and iteration control for Ember heat simulations.
//!
//! # Data flow
//!
//! ```text
//! Store::create ─▶ Controller::prepare (seed A and B, synchronize)
//!               ─▶ Controller::run     (steps_max × [stencil, swap],
//!                                       write steps_completed, synchronize)
//!               ─▶ Store::release
//! ```
//!
//! [`simulate`] runs the whole sequence. Each step forks rayon workers over
//! disjoint interior rows of the next buffer and joins before returning;
//! the residual is combined with an order-independent maximum, so results
//! are bit-identical for any worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod init;
pub mod kernel;
pub mod report;
pub mod simulate;

pub use config::RunConfig;
pub use controller::{Controller, NoObserver, RunOutcome, StepObserver};
pub use error::RunError;
pub use report::StatePrinter;
pub use simulate::{simulate, RunSummary};
