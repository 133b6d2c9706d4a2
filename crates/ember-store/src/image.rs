//! Read-only loading of finished store files.
//!
//! [`StoreImage`] copies a store file into memory and validates its header.
//! It is meant for inspecting the artifact a run leaves behind; it does not
//! reopen a store for further stepping.

use std::fs;
use std::path::{Path, PathBuf};

use ember_core::{Grid, GridDims, GridView};

use crate::arena::Slot;
use crate::error::{HeaderError, StoreError};
use crate::layout::{Header, Layout};

/// In-memory copy of a store file.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreImage {
    path: PathBuf,
    header: Header,
    layout: Layout,
    a: Grid,
    b: Grid,
}

impl StoreImage {
    /// Read and validate the store file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let malformed = |reason: HeaderError| StoreError::Image {
            path: path.clone(),
            reason,
        };
        let len = bytes.len() as u64;

        let header =
            Header::read_from(&bytes).ok_or_else(|| malformed(HeaderError::Truncated { len }))?;
        let layout = Layout::from_header(&header, len).map_err(malformed)?;

        let decode = |offset: usize| -> Result<Grid, StoreError> {
            let values = bytes[offset..offset + layout.grid_size()]
                .chunks_exact(8)
                .map(|word| {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(word);
                    f64::from_ne_bytes(raw)
                })
                .collect();
            Grid::new(values, layout.dims()).ok_or_else(|| {
                malformed(HeaderError::Size {
                    expected: layout.file_size() as u64,
                    found: len,
                })
            })
        };
        let a = decode(layout.offset_a())?;
        let b = decode(layout.offset_b())?;

        Ok(Self {
            path,
            header,
            layout,
            a,
            b,
        })
    }

    /// Path the image was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoded header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Grid dimensions recorded in the header.
    pub fn dims(&self) -> GridDims {
        self.layout.dims()
    }

    /// Raw values of one buffer.
    pub fn values(&self, slot: Slot) -> &[f64] {
        self.buffer(slot).as_slice()
    }

    /// View of one buffer.
    pub fn grid(&self, slot: Slot) -> GridView<'_> {
        self.buffer(slot).view()
    }

    /// The buffer holding the state after `steps_completed` steps.
    pub fn latest(&self) -> GridView<'_> {
        self.grid(Slot::holding_step(self.header.steps_completed))
    }

    fn buffer(&self, slot: Slot) -> &Grid {
        match slot {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }
}
