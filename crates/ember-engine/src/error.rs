//! Run-level error type.

use std::error::Error;
use std::fmt;

use ember_core::{ConfigError, GridDims};
use ember_store::StoreError;

/// Errors that abort a simulation run.
///
/// There is no retry path: any error unwinds the run immediately, and the
/// file keeps whatever the last completed synchronization made durable.
#[derive(Debug)]
pub enum RunError {
    /// Grid dimensions or physics constants are invalid.
    Config(ConfigError),
    /// Creating, mapping or synchronizing the store failed.
    Store(StoreError),
    /// A controller was handed a store of a different grid size.
    DimensionMismatch {
        /// Dimensions the controller was built for.
        expected: GridDims,
        /// Dimensions recorded in the store.
        found: GridDims,
    },
    /// The stencil worker pool could not be started.
    ThreadPool {
        /// Description from the pool builder.
        reason: String,
    },
}

impl RunError {
    /// Whether the run failed while creating its store.
    pub fn is_storage_create_error(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_create_error())
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "store holds a {}x{} grid, expected {}x{}",
                found.n(),
                found.m(),
                expected.n(),
                expected.m()
            ),
            Self::ThreadPool { reason } => write!(f, "worker pool: {reason}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::DimensionMismatch { .. } | Self::ThreadPool { .. } => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StoreError> for RunError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
