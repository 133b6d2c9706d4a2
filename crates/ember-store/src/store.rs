//! Store creation, header access and synchronization.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use ember_core::{GridDims, GridView, GridViewMut};
use tracing::{debug, info, warn};

use crate::arena::{GridArena, Slot};
use crate::durability::{self, Durability, DurabilityKind, DurabilityMode};
use crate::error::StoreError;
use crate::layout::{Header, Layout, HEADER_SIZE};
use crate::region::Region;

/// An exclusively owned, memory-mapped store file.
///
/// Created with [`Store::create`]; the file at `path` must not exist. The
/// header is written immediately with `steps_completed = 0`. Both grid
/// buffers start zero-filled.
///
/// Dropping the store (or calling [`Store::release`]) unmaps the region but
/// leaves the file in place. Nothing is flushed on drop: only data covered
/// by a completed [`Store::synchronize`] call is guaranteed durable.
#[derive(Debug)]
pub struct Store {
    region: Region,
    layout: Layout,
    durability: Box<dyn Durability>,
    current: Slot,
    path: PathBuf,
    syncs: AtomicU64,
}

impl Store {
    /// Create a fresh store for `dims` at `path`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if `path` exists; the existing file
    ///   is not modified.
    /// - [`StoreError::Create`] / [`StoreError::Map`] if the platform cannot
    ///   allocate or map the file. The partially created file is removed.
    /// - [`StoreError::NotPersistentMemory`] if `mode` is
    ///   [`DurabilityMode::RequirePersistent`] and the mapping is not
    ///   persistent memory. The partially created file is removed.
    /// - [`StoreError::Layout`] if the file size overflows.
    pub fn create(
        path: impl AsRef<Path>,
        dims: GridDims,
        mode: DurabilityMode,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let layout = Layout::new(dims)?;

        let file = open_exclusive(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                StoreError::AlreadyExists { path: path.clone() }
            } else {
                StoreError::Create {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        if let Err(source) = preallocate(&file, layout.file_size()) {
            discard(&path);
            return Err(StoreError::Create { path, source });
        }

        let mut region = match Region::map(&file, layout.file_size(), mode.probes_persistent_memory()) {
            Ok(region) => region,
            Err(source) => {
                discard(&path);
                return Err(StoreError::Map { path, source });
            }
        };
        drop(file);

        let Some(kind) = mode.resolve(region.is_persistent_memory()) else {
            drop(region);
            discard(&path);
            return Err(StoreError::NotPersistentMemory { path });
        };
        layout.header(0).write_to(region.as_bytes_mut());

        info!(
            path = %path.display(),
            n = dims.n(),
            m = dims.m(),
            bytes = layout.file_size(),
            durability = %kind,
            "created store"
        );

        Ok(Self {
            region,
            layout,
            durability: durability::for_kind(kind),
            current: Slot::A,
            path,
            syncs: AtomicU64::new(0),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte layout of the file.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.layout.dims()
    }

    /// Total mapped length in bytes.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    /// Always `false`: a store holds at least a header.
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Whether the mapping is byte-addressable persistent memory.
    pub fn is_persistent_memory(&self) -> bool {
        self.region.is_persistent_memory()
    }

    /// The synchronization strategy chosen at creation.
    pub fn durability(&self) -> DurabilityKind {
        self.durability.kind()
    }

    /// Decode the header from the mapping.
    pub fn header(&self) -> Header {
        Header::read_from(self.region.as_bytes()).unwrap_or_else(|| self.layout.header(0))
    }

    /// Overwrite `steps_completed` in the header.
    ///
    /// Not durable until the next [`Store::synchronize`].
    pub fn set_steps_completed(&mut self, steps: u64) {
        let header = Header {
            steps_completed: steps,
            ..self.header()
        };
        header.write_to(self.region.as_bytes_mut());
    }

    /// The slot currently acting as the read source.
    pub fn current(&self) -> Slot {
        self.current
    }

    /// Read-only view of one grid buffer.
    pub fn view(&self, slot: Slot) -> Result<GridView<'_>, StoreError> {
        let offset = self.offset(slot);
        let bytes = &self.region.as_bytes()[offset..offset + self.layout.grid_size()];
        let values = bytemuck::try_cast_slice::<u8, f64>(bytes)
            .map_err(|_| StoreError::Misaligned { offset })?;
        GridView::new(values, self.dims()).ok_or(StoreError::Misaligned { offset })
    }

    /// Mutable access to both grid buffers and the active index.
    pub fn arena(&mut self) -> Result<GridArena<'_>, StoreError> {
        let dims = self.layout.dims();
        let grid_size = self.layout.grid_size();
        let (offset_a, offset_b) = (self.layout.offset_a(), self.layout.offset_b());

        let bytes = self.region.as_bytes_mut();
        let (_, grids) = bytes.split_at_mut(HEADER_SIZE);
        let (a, rest) = grids.split_at_mut(grid_size);
        let b = &mut rest[..grid_size];

        let a = bytemuck::try_cast_slice_mut::<u8, f64>(a)
            .map_err(|_| StoreError::Misaligned { offset: offset_a })?;
        let b = bytemuck::try_cast_slice_mut::<u8, f64>(b)
            .map_err(|_| StoreError::Misaligned { offset: offset_b })?;
        let a = GridViewMut::new(a, dims).ok_or(StoreError::Misaligned { offset: offset_a })?;
        let b = GridViewMut::new(b, dims).ok_or(StoreError::Misaligned { offset: offset_b })?;

        Ok(GridArena::new(a, b, &mut self.current))
    }

    /// Make `range` of the mapping durable with the store's strategy.
    ///
    /// Blocks until the flush completes.
    pub fn synchronize(&self, range: Range<usize>) -> Result<(), StoreError> {
        debug!(
            start = range.start,
            end = range.end,
            durability = %self.durability.kind(),
            "synchronize"
        );
        self.durability
            .synchronize(&self.region, range)
            .map_err(|source| StoreError::Sync { source })?;
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Make the whole mapping durable.
    pub fn synchronize_all(&self) -> Result<(), StoreError> {
        self.synchronize(0..self.region.len())
    }

    /// Number of completed [`Store::synchronize`] calls.
    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }

    /// Unmap the region, keeping the file. Returns the file's path.
    pub fn release(self) -> PathBuf {
        let Self { region, path, .. } = self;
        drop(region);
        info!(path = %path.display(), "released store");
        path
    }

    fn offset(&self, slot: Slot) -> usize {
        match slot {
            Slot::A => self.layout.offset_a(),
            Slot::B => self.layout.offset_b(),
        }
    }
}

fn open_exclusive(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    options.open(path)
}

/// Size the file and, where supported, reserve its blocks up front so that
/// running out of space fails here instead of faulting mid-run.
fn preallocate(file: &File, len: usize) -> io::Result<()> {
    file.set_len(len as u64)?;
    #[cfg(target_os = "linux")]
    {
        use std::os::fd::AsRawFd;

        let len = libc::off_t::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file too large"))?;
        // SAFETY: plain syscall on an owned descriptor.
        let rc = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) };
        match rc {
            0 | libc::EOPNOTSUPP | libc::EINVAL => {}
            errno => return Err(io::Error::from_raw_os_error(errno)),
        }
    }
    Ok(())
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "could not remove partially created store");
    }
}
