//! The mapped memory region backing a store.
//!
//! Two mapping flavours exist. On Linux the store first asks for a
//! `MAP_SHARED_VALIDATE | MAP_SYNC` mapping: the kernel only grants it for
//! files on a DAX filesystem, where loads and stores reach persistent memory
//! directly and file metadata is kept in sync at page-fault time. Any other
//! file gets an ordinary shared mapping through `memmap2`.

use std::fs::File;
use std::io;
use std::ops::Range;

use memmap2::{MmapMut, MmapOptions};

/// A writable shared mapping of an entire store file.
#[derive(Debug)]
pub struct Region {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Shared(MmapMut),
    #[cfg(target_os = "linux")]
    Dax(dax::DaxMapping),
}

impl Region {
    /// Map the first `len` bytes of `file`.
    ///
    /// When `probe_dax` is set, a synchronous DAX mapping is attempted
    /// first. Falls back to a regular shared mapping if the kernel or the
    /// filesystem refuses it.
    pub fn map(file: &File, len: usize, probe_dax: bool) -> io::Result<Self> {
        if probe_dax {
            if let Some(region) = Self::map_dax(file, len) {
                return Ok(region);
            }
        }

        // SAFETY: the file was created exclusively by this process and is
        // not truncated while the mapping is alive.
        let mmap = unsafe { MmapOptions::new().len(len).map_mut(file)? };
        Ok(Self {
            inner: Inner::Shared(mmap),
        })
    }

    #[cfg(target_os = "linux")]
    fn map_dax(file: &File, len: usize) -> Option<Self> {
        match dax::DaxMapping::map(file, len) {
            Ok(mapping) => Some(Self {
                inner: Inner::Dax(mapping),
            }),
            Err(e) => {
                tracing::debug!(error = %e, "MAP_SYNC refused, using shared mapping");
                None
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn map_dax(_file: &File, _len: usize) -> Option<Self> {
        None
    }

    /// Whether the region is a synchronous DAX mapping of persistent memory.
    pub fn is_persistent_memory(&self) -> bool {
        match &self.inner {
            Inner::Shared(_) => false,
            #[cfg(target_os = "linux")]
            Inner::Dax(_) => true,
        }
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the mapping is empty. Store mappings never are.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mapped bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.inner {
            Inner::Shared(mmap) => &mmap[..],
            #[cfg(target_os = "linux")]
            Inner::Dax(mapping) => mapping.as_bytes(),
        }
    }

    /// The mapped bytes, writable.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.inner {
            Inner::Shared(mmap) => &mut mmap[..],
            #[cfg(target_os = "linux")]
            Inner::Dax(mapping) => mapping.as_bytes_mut(),
        }
    }

    /// Synchronously write `range` back to the backing file with `msync`.
    pub fn msync(&self, range: Range<usize>) -> io::Result<()> {
        check_range(&range, self.len())?;
        match &self.inner {
            Inner::Shared(mmap) => mmap.flush_range(range.start, range.len()),
            #[cfg(target_os = "linux")]
            Inner::Dax(mapping) => mapping.msync(range),
        }
    }
}

/// Reject ranges that fall outside a mapping of `len` bytes.
pub(crate) fn check_range(range: &Range<usize>, len: usize) -> io::Result<()> {
    if range.start > range.end || range.end > len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("range {range:?} outside mapping of {len} bytes"),
        ));
    }
    Ok(())
}

#[cfg(target_os = "linux")]
mod dax {
    use std::fs::File;
    use std::io;
    use std::ops::Range;
    use std::os::fd::AsRawFd;
    use std::ptr::{self, NonNull};

    /// A `MAP_SYNC` mapping, unmapped on drop.
    #[derive(Debug)]
    pub(super) struct DaxMapping {
        ptr: NonNull<u8>,
        len: usize,
    }

    // SAFETY: the mapping is plain memory owned by this value; access goes
    // through `&self`/`&mut self` like any owned buffer.
    unsafe impl Send for DaxMapping {}
    unsafe impl Sync for DaxMapping {}

    impl DaxMapping {
        pub(super) fn map(file: &File, len: usize) -> io::Result<Self> {
            if len == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "cannot map an empty range",
                ));
            }
            // SAFETY: a fresh mapping chosen by the kernel; no existing
            // memory is aliased.
            let addr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    len,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_SHARED_VALIDATE | libc::MAP_SYNC,
                    file.as_raw_fd(),
                    0,
                )
            };
            if addr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }
            let ptr = NonNull::new(addr.cast::<u8>())
                .ok_or_else(|| io::Error::other("mmap returned a null mapping"))?;
            Ok(Self { ptr, len })
        }

        pub(super) fn as_bytes(&self) -> &[u8] {
            // SAFETY: `ptr` is valid for `len` bytes until drop.
            unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
        }

        pub(super) fn as_bytes_mut(&mut self) -> &mut [u8] {
            // SAFETY: as above, and `&mut self` guarantees exclusivity.
            unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
        }

        pub(super) fn msync(&self, range: Range<usize>) -> io::Result<()> {
            let page = page_size();
            let start = range.start - range.start % page;
            let len = range.end - start;
            if len == 0 {
                return Ok(());
            }
            // SAFETY: `start..start + len` lies inside the mapping, which
            // begins on a page boundary.
            let rc = unsafe {
                libc::msync(
                    self.ptr.as_ptr().add(start).cast::<libc::c_void>(),
                    len,
                    libc::MS_SYNC,
                )
            };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }

    impl Drop for DaxMapping {
        fn drop(&mut self) {
            // SAFETY: unmapping exactly the range returned by mmap.
            let rc = unsafe { libc::munmap(self.ptr.as_ptr().cast::<libc::c_void>(), self.len) };
            if rc != 0 {
                tracing::warn!(error = %io::Error::last_os_error(), "munmap failed");
            }
        }
    }

    fn page_size() -> usize {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        usize::try_from(size).ok().filter(|&s| s > 0).unwrap_or(4096)
    }
}
