//! Test utilities and fixtures for Ember development.
//!
//! - [`ScratchDir`]: a temporary directory that hands out store paths
//!   which do not exist yet.
//! - [`fixtures`]: initial profiles, a seeded random profile, and a
//!   serial reference stencil to check the parallel kernel against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::path::{Path, PathBuf};

pub use fixtures::{random_profile, reference_run, reference_step, seeded_profile};

/// Temporary directory for store files, removed on drop.
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create scratch directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a store named `name`. The file is not created.
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Bitwise equality of two grids, reporting the first mismatch.
pub fn assert_bits_eq(left: &[f64], right: &[f64]) {
    assert_eq!(left.len(), right.len(), "grid lengths differ");
    for (idx, (l, r)) in left.iter().zip(right).enumerate() {
        assert_eq!(
            l.to_bits(),
            r.to_bits(),
            "mismatch at flat index {idx}: {l} vs {r}"
        );
    }
}
