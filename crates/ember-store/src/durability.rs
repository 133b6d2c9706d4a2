//! Durability synchronization strategies.
//!
//! A store picks exactly one [`Durability`] implementation when it is
//! created and uses it for every [`Store::synchronize`](crate::Store::synchronize)
//! call afterwards. Both implementations block until the range is durable.

use std::fmt;
use std::io;
use std::ops::Range;

use crate::region::{check_range, Region};

/// Which synchronization strategy a store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DurabilityKind {
    /// CPU cache-line flush and fence; the region is persistent memory.
    Persistent,
    /// Operating-system `msync` to the backing medium.
    Msync,
}

impl fmt::Display for DurabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => write!(f, "persistent-memory flush"),
            Self::Msync => write!(f, "msync"),
        }
    }
}

/// How a store chooses its [`DurabilityKind`] at creation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DurabilityMode {
    /// Use cache-line flushes if the mapping is persistent memory,
    /// `msync` otherwise.
    #[default]
    Auto,
    /// Require a persistent-memory mapping and use cache-line flushes.
    ///
    /// Store creation fails with
    /// [`StoreError::NotPersistentMemory`](crate::StoreError::NotPersistentMemory)
    /// when the file cannot be mapped with `MAP_SYNC`.
    RequirePersistent,
    /// Always use `msync`, and skip the persistent-memory probe.
    ForceMsync,
}

impl DurabilityMode {
    /// Whether a `MAP_SYNC` mapping should be attempted.
    pub fn probes_persistent_memory(self) -> bool {
        !matches!(self, Self::ForceMsync)
    }

    /// Resolve the strategy for a region.
    ///
    /// Returns `None` when the mode requires persistent memory and the
    /// region is not.
    pub fn resolve(self, region_is_pmem: bool) -> Option<DurabilityKind> {
        match self {
            Self::Auto | Self::RequirePersistent if region_is_pmem => {
                Some(DurabilityKind::Persistent)
            }
            Self::Auto => Some(DurabilityKind::Msync),
            Self::RequirePersistent => None,
            Self::ForceMsync => Some(DurabilityKind::Msync),
        }
    }
}

impl std::str::FromStr for DurabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "persistent" | "pmem" => Ok(Self::RequirePersistent),
            "msync" => Ok(Self::ForceMsync),
            other => Err(format!(
                "unknown durability mode '{other}' (expected auto, persistent or msync)"
            )),
        }
    }
}

/// A strategy for making a byte range of a [`Region`] durable.
pub trait Durability: Send + Sync + fmt::Debug {
    /// The strategy this implementation provides.
    fn kind(&self) -> DurabilityKind;

    /// Make `range` of `region` durable. Returns once the data is on
    /// stable storage.
    fn synchronize(&self, region: &Region, range: Range<usize>) -> io::Result<()>;
}

/// Instantiate the implementation for `kind`.
pub fn for_kind(kind: DurabilityKind) -> Box<dyn Durability> {
    match kind {
        DurabilityKind::Persistent => Box::new(CacheLineFlush),
        DurabilityKind::Msync => Box::new(MsyncFlush),
    }
}

/// `msync(MS_SYNC)` over the page-aligned range.
#[derive(Clone, Copy, Debug, Default)]
pub struct MsyncFlush;

impl Durability for MsyncFlush {
    fn kind(&self) -> DurabilityKind {
        DurabilityKind::Msync
    }

    fn synchronize(&self, region: &Region, range: Range<usize>) -> io::Result<()> {
        region.msync(range)
    }
}

/// Cache-line write-back of every line in the range followed by a fence.
///
/// Uses `clflush` + `sfence` on x86_64 and `dc cvac` + `dsb` on aarch64.
/// Cache flushes only reach the medium through a `MAP_SYNC` mapping, so a
/// region that is not persistent memory is synchronized with `msync`
/// instead. Targets without a user-space flush instruction always use
/// `msync`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheLineFlush;

/// Flush granularity. Both supported architectures use 64-byte lines.
pub const CACHE_LINE: usize = 64;

impl Durability for CacheLineFlush {
    fn kind(&self) -> DurabilityKind {
        DurabilityKind::Persistent
    }

    fn synchronize(&self, region: &Region, range: Range<usize>) -> io::Result<()> {
        let bytes = region.as_bytes();
        check_range(&range, bytes.len())?;
        if range.is_empty() {
            return Ok(());
        }
        if !region.is_persistent_memory() {
            return region.msync(range);
        }
        #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
        {
            flush_lines(&bytes[range]);
            Ok(())
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            region.msync(range)
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn flush_lines(bytes: &[u8]) {
    use std::arch::x86_64::{_mm_clflush, _mm_sfence};

    let start = bytes.as_ptr() as usize;
    let end = start + bytes.len();
    let mut line = start - start % CACHE_LINE;
    while line < end {
        // SAFETY: `line` lies within the cache line containing a byte of
        // `bytes`; clflush only needs the address to be mapped.
        unsafe { _mm_clflush(line as *const u8) };
        line += CACHE_LINE;
    }
    // SAFETY: sfence has no preconditions on x86_64.
    unsafe { _mm_sfence() };
}

#[cfg(target_arch = "aarch64")]
fn flush_lines(bytes: &[u8]) {
    use std::arch::asm;

    let start = bytes.as_ptr() as usize;
    let end = start + bytes.len();
    let mut line = start - start % CACHE_LINE;
    while line < end {
        // SAFETY: cleaning a mapped cache line to the point of coherency
        // has no effect on program state.
        unsafe { asm!("dc cvac, {0}", in(reg) line, options(nostack, preserves_flags)) };
        line += CACHE_LINE;
    }
    // SAFETY: a full-system data barrier has no preconditions.
    unsafe { asm!("dsb sy", options(nostack, preserves_flags)) };
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::OpenOptions;

    #[test]
    fn auto_follows_region() {
        assert_eq!(DurabilityMode::Auto.resolve(true), Some(DurabilityKind::Persistent));
        assert_eq!(DurabilityMode::Auto.resolve(false), Some(DurabilityKind::Msync));
    }

    #[test]
    fn required_persistence_has_no_fallback() {
        assert_eq!(
            DurabilityMode::RequirePersistent.resolve(true),
            Some(DurabilityKind::Persistent)
        );
        assert_eq!(DurabilityMode::RequirePersistent.resolve(false), None);
        assert!(DurabilityMode::RequirePersistent.probes_persistent_memory());
    }

    #[test]
    fn forced_msync_ignores_region() {
        assert_eq!(DurabilityMode::ForceMsync.resolve(true), Some(DurabilityKind::Msync));
        assert!(!DurabilityMode::ForceMsync.probes_persistent_memory());
        assert!(DurabilityMode::Auto.probes_persistent_memory());
    }

    #[test]
    fn cache_line_flush_on_ordinary_mapping_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flush.bin");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .unwrap();
        file.set_len(4096).unwrap();

        let mut region = Region::map(&file, 4096, false).unwrap();
        assert!(!region.is_persistent_memory());
        region.as_bytes_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        CacheLineFlush.synchronize(&region, 0..4096).unwrap();
        CacheLineFlush.synchronize(&region, 10..10).unwrap();
        assert!(CacheLineFlush.synchronize(&region, 0..4097).is_err());
        drop(region);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn parse_modes() {
        assert_eq!("auto".parse::<DurabilityMode>(), Ok(DurabilityMode::Auto));
        assert_eq!("PMEM".parse::<DurabilityMode>(), Ok(DurabilityMode::RequirePersistent));
        assert_eq!("msync".parse::<DurabilityMode>(), Ok(DurabilityMode::ForceMsync));
        assert!("fsync".parse::<DurabilityMode>().is_err());
    }

    #[test]
    fn implementations_report_their_kind() {
        assert_eq!(for_kind(DurabilityKind::Persistent).kind(), DurabilityKind::Persistent);
        assert_eq!(for_kind(DurabilityKind::Msync).kind(), DurabilityKind::Msync);
    }
}
