//! Ember: 2D heat diffusion on a persistent, memory-mapped grid.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Ember sub-crates, plus the pieces the `ember` binary is built from.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ember::prelude::*;
//!
//! let dims = GridDims::new(64, 64).unwrap();
//! let summary = simulate("heat.ember", dims, 100, &RunConfig::default()).unwrap();
//! println!("{summary}");
//!
//! let image = StoreImage::load("heat.ember").unwrap();
//! assert_eq!(image.header().steps_completed, 100);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ember-core` | Grid dimensions, physics constants, grid views |
//! | [`store`] | `ember-store` | Memory-mapped store, header layout, durability |
//! | [`engine`] | `ember-engine` | Stencil kernel, controller, run driver |
//! | [`cli`] | (this crate) | Argument and environment parsing for the binary |
//! | [`logging`] | (this crate) | `tracing` subscriber setup |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod logging;

/// Grid dimensions, physics constants and grid views (`ember-core`).
pub use ember_core as types;

/// Memory-mapped double-buffered store (`ember-store`).
///
/// [`store::Store`] owns a live file; [`store::StoreImage`] reads a
/// finished one.
pub use ember_store as store;

/// Stencil kernel and iteration control (`ember-engine`).
pub use ember_engine as engine;

/// Common imports for typical Ember usage.
///
/// ```rust
/// use ember::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use ember_core::{Discretization, GridDims, GridView, HeatConfig};

    // Storage
    pub use ember_store::{DurabilityKind, DurabilityMode, Slot, Store, StoreImage};

    // Engine
    pub use ember_engine::{
        simulate, Controller, RunConfig, RunError, RunSummary, StatePrinter, StepObserver,
    };
}
