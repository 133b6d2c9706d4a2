//! On-disk header and byte layout of a store file.

use bytemuck::{Pod, Zeroable};
use ember_core::{ConfigError, GridDims};

use crate::error::HeaderError;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<Header>();

/// Fixed-size record at the start of every store file.
///
/// Five native-endian machine words. The offsets are written once at
/// creation and never change. `steps_completed` stays 0 during a run and is
/// set to the total step count only after the final step.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Header {
    /// Row intervals (`n`).
    pub rows: u64,
    /// Column intervals (`m`).
    pub cols: u64,
    /// Steps completed by the run that produced this file.
    pub steps_completed: u64,
    /// Byte offset of buffer A.
    pub offset_buffer_a: u64,
    /// Byte offset of buffer B.
    pub offset_buffer_b: u64,
}

impl Header {
    /// Byte offset of the `steps_completed` word within the header.
    pub const STEPS_COMPLETED_OFFSET: usize = 16;

    /// Decode a header from the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// Returns `None` if `bytes` is shorter than a header.
    pub fn read_from(bytes: &[u8]) -> Option<Self> {
        bytes
            .get(..HEADER_SIZE)
            .map(bytemuck::pod_read_unaligned::<Header>)
    }

    /// Encode into the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// Returns `false` (writing nothing) if `bytes` is too short.
    pub fn write_to(&self, bytes: &mut [u8]) -> bool {
        match bytes.get_mut(..HEADER_SIZE) {
            Some(dst) => {
                dst.copy_from_slice(bytemuck::bytes_of(self));
                true
            }
            None => false,
        }
    }
}

/// Byte layout of a store for one grid size.
///
/// ```text
/// [0, HEADER_SIZE)                          header
/// [offset_a, offset_a + grid_size)          buffer A
/// [offset_b, offset_b + grid_size)          buffer B    (= file_size)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    dims: GridDims,
    grid_size: usize,
    file_size: usize,
}

impl Layout {
    /// Compute the layout for `dims`.
    ///
    /// `grid_size = (n+1)(m+1) × 8`, `file_size = HEADER_SIZE + 2 × grid_size`.
    pub fn new(dims: GridDims) -> Result<Self, ConfigError> {
        let grid_size = dims.byte_len();
        let overflow = ConfigError::SizeOverflow {
            n: dims.n(),
            m: dims.m(),
        };
        let file_size = grid_size
            .checked_mul(2)
            .and_then(|both| both.checked_add(HEADER_SIZE))
            .ok_or(overflow)?;
        Ok(Self {
            dims,
            grid_size,
            file_size,
        })
    }

    /// Validate `header` against a file of `file_len` bytes and return the
    /// layout it describes.
    pub fn from_header(header: &Header, file_len: u64) -> Result<Self, HeaderError> {
        let bad_dims = || HeaderError::Dimensions {
            rows: header.rows,
            cols: header.cols,
        };
        let n = usize::try_from(header.rows).map_err(|_| bad_dims())?;
        let m = usize::try_from(header.cols).map_err(|_| bad_dims())?;
        let layout = GridDims::new(n, m)
            .and_then(Self::new)
            .map_err(|_| bad_dims())?;
        let expected = (layout.offset_a() as u64, layout.offset_b() as u64);
        let found = (header.offset_buffer_a, header.offset_buffer_b);
        if found != expected {
            return Err(HeaderError::Offsets { expected, found });
        }
        if file_len != layout.file_size() as u64 {
            return Err(HeaderError::Size {
                expected: layout.file_size() as u64,
                found: file_len,
            });
        }
        Ok(layout)
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Size of one grid buffer in bytes.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> usize {
        self.file_size
    }

    /// Byte offset of buffer A.
    pub fn offset_a(&self) -> usize {
        HEADER_SIZE
    }

    /// Byte offset of buffer B.
    pub fn offset_b(&self) -> usize {
        HEADER_SIZE + self.grid_size
    }

    /// Header describing this layout with the given step count.
    pub fn header(&self, steps_completed: u64) -> Header {
        Header {
            rows: self.dims.n() as u64,
            cols: self.dims.m() as u64,
            steps_completed,
            offset_buffer_a: self.offset_a() as u64,
            offset_buffer_b: self.offset_b() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn header_is_five_words() {
        assert_eq!(HEADER_SIZE, 40);
        assert_eq!(
            std::mem::offset_of!(Header, steps_completed),
            Header::STEPS_COMPLETED_OFFSET
        );
    }

    #[test]
    fn layout_for_four_by_four() {
        let layout = Layout::new(GridDims::new(4, 4).unwrap()).unwrap();
        assert_eq!(layout.grid_size(), 25 * 8);
        assert_eq!(layout.file_size(), 40 + 2 * 200);
        assert_eq!(layout.offset_a(), 40);
        assert_eq!(layout.offset_b(), 240);
        assert_eq!(layout.offset_a() % 8, 0);
    }

    #[test]
    fn header_words_in_declared_order() {
        let layout = Layout::new(GridDims::new(3, 5).unwrap()).unwrap();
        let mut bytes = [0u8; HEADER_SIZE];
        assert!(layout.header(7).write_to(&mut bytes));
        let word = |k: usize| u64::from_ne_bytes(bytes[k * 8..k * 8 + 8].try_into().unwrap());
        assert_eq!(word(0), 3);
        assert_eq!(word(1), 5);
        assert_eq!(word(2), 7);
        assert_eq!(word(3), 40);
        assert_eq!(word(4), 40 + 24 * 8);
    }

    #[test]
    fn short_buffers_rejected() {
        assert!(Header::read_from(&[0u8; 39]).is_none());
        let header = Header::zeroed();
        assert!(!header.write_to(&mut [0u8; 10]));
    }

    #[test]
    fn from_header_rejects_mismatched_size() {
        let layout = Layout::new(GridDims::new(2, 2).unwrap()).unwrap();
        let header = layout.header(0);
        let ok = Layout::from_header(&header, layout.file_size() as u64).unwrap();
        assert_eq!(ok, layout);
        assert_eq!(
            Layout::from_header(&header, layout.file_size() as u64 - 8),
            Err(HeaderError::Size {
                expected: layout.file_size() as u64,
                found: layout.file_size() as u64 - 8,
            })
        );

        let moved = Header {
            offset_buffer_b: header.offset_buffer_b + 8,
            ..header
        };
        assert_eq!(
            Layout::from_header(&moved, layout.file_size() as u64),
            Err(HeaderError::Offsets {
                expected: (40, header.offset_buffer_b),
                found: (40, header.offset_buffer_b + 8),
            })
        );
    }

    #[test]
    fn from_header_rejects_empty_grid() {
        let header = Header {
            rows: 0,
            cols: 4,
            ..Header::zeroed()
        };
        assert_eq!(
            Layout::from_header(&header, 1024),
            Err(HeaderError::Dimensions { rows: 0, cols: 4 })
        );
    }

    proptest! {
        #[test]
        fn header_decodes_what_it_encodes(n in 1usize..5000, m in 1usize..5000, steps in any::<u64>()) {
            let layout = Layout::new(GridDims::new(n, m).unwrap()).unwrap();
            let mut bytes = vec![0u8; HEADER_SIZE + 3];
            prop_assert!(layout.header(steps).write_to(&mut bytes));
            let back = Header::read_from(&bytes).unwrap();
            prop_assert_eq!(back.rows, n as u64);
            prop_assert_eq!(back.cols, m as u64);
            prop_assert_eq!(back.steps_completed, steps);
            prop_assert_eq!(Layout::from_header(&back, layout.file_size() as u64), Ok(layout));
        }
    }
}
