//! Store-specific error types.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use ember_core::ConfigError;

/// Errors that can occur while creating, synchronizing or reading a store.
#[derive(Debug)]
pub enum StoreError {
    /// The target path already exists. Stores are always created fresh.
    AlreadyExists {
        /// The path that was requested.
        path: PathBuf,
    },
    /// The backing file could not be created or sized.
    Create {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying platform error.
        source: io::Error,
    },
    /// The backing file could not be mapped into memory.
    Map {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying platform error.
        source: io::Error,
    },
    /// Persistent memory was required but the file could not be mapped
    /// with `MAP_SYNC`. The partially created file is removed.
    NotPersistentMemory {
        /// The path that was requested.
        path: PathBuf,
    },
    /// The requested grid does not produce a valid file layout.
    Layout(ConfigError),
    /// A grid buffer in the mapping is not aligned for `f64` access.
    Misaligned {
        /// Byte offset of the buffer within the mapping.
        offset: usize,
    },
    /// Flushing a range to stable storage failed.
    Sync {
        /// The underlying platform error.
        source: io::Error,
    },
    /// A store file could not be read back.
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying platform error.
        source: io::Error,
    },
    /// A store file has an inconsistent header or size.
    Image {
        /// The file being read.
        path: PathBuf,
        /// What is inconsistent.
        reason: HeaderError,
    },
}

impl StoreError {
    /// Whether this error belongs to the storage-creation category.
    ///
    /// Creation errors leave no store file behind other than one that
    /// already existed before the call.
    pub fn is_create_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. }
                | Self::Create { .. }
                | Self::Map { .. }
                | Self::NotPersistentMemory { .. }
                | Self::Layout(_)
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists { path } => {
                write!(f, "cannot create store at {}: file exists", path.display())
            }
            Self::Create { path, .. } => {
                write!(f, "cannot create store at {}", path.display())
            }
            Self::Map { path, .. } => write!(f, "cannot map store at {}", path.display()),
            Self::NotPersistentMemory { path } => write!(
                f,
                "cannot create store at {}: not on persistent memory",
                path.display()
            ),
            Self::Layout(e) => write!(f, "invalid store layout: {e}"),
            Self::Misaligned { offset } => {
                write!(f, "grid buffer at byte offset {offset} is not f64-aligned")
            }
            Self::Sync { .. } => write!(f, "failed to synchronize store to stable storage"),
            Self::Io { path, .. } => write!(f, "cannot read store at {}", path.display()),
            Self::Image { path, .. } => write!(f, "malformed store at {}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Create { source, .. }
            | Self::Map { source, .. }
            | Self::Sync { source }
            | Self::Io { source, .. } => Some(source),
            Self::Layout(e) => Some(e),
            Self::Image { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Why a header does not describe the file it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// The file is shorter than a header.
    Truncated {
        /// File length in bytes.
        len: u64,
    },
    /// The recorded dimensions do not form a valid grid.
    Dimensions {
        /// Recorded `rows` field.
        rows: u64,
        /// Recorded `cols` field.
        cols: u64,
    },
    /// The recorded buffer offsets differ from the ones the grid implies.
    Offsets {
        /// Offsets `(a, b)` the grid implies.
        expected: (u64, u64),
        /// Offsets `(a, b)` found in the header.
        found: (u64, u64),
    },
    /// The file length differs from the one the grid implies.
    Size {
        /// Length the grid implies.
        expected: u64,
        /// Actual file length.
        found: u64,
    },
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { len } => write!(f, "{len} bytes is shorter than a header"),
            Self::Dimensions { rows, cols } => {
                write!(f, "header records an invalid {rows}x{cols} grid")
            }
            Self::Offsets { expected, found } => write!(
                f,
                "buffer offsets {found:?} do not match expected {expected:?}"
            ),
            Self::Size { expected, found } => {
                write!(f, "file is {found} bytes, header implies {expected}")
            }
        }
    }
}

impl Error for HeaderError {}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        Self::Layout(e)
    }
}
