//! Core types for the Ember heat-diffusion simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the grid geometry, the immutable physics configuration shared by the
//! initializer and the stencil kernel, bounds-checked 2D views over flat
//! row-major buffers, and the configuration error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dims;
pub mod error;
pub mod grid;

pub use config::{Discretization, HeatConfig};
pub use dims::GridDims;
pub use error::ConfigError;
pub use grid::{Grid, GridView, GridViewMut};
