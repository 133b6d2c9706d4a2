//! Persistent, memory-mapped grid storage for Ember simulations.
//!
//! A [`Store`] is one exclusively created file, mapped into memory, that
//! holds a fixed header followed by two grid buffers. The simulation writes
//! straight into the mapping; no separate serialization step exists.
//! This is the only crate in the workspace that contains `unsafe` code.
//!
//! # Layout
//!
//! ```text
//! offset 0                 Header (5 × u64, native endian)
//!                          rows, cols, steps_completed,
//!                          offset_buffer_a, offset_buffer_b
//! offset_buffer_a = 40     buffer A: (n+1)(m+1) f64, row-major
//! offset_buffer_b          buffer B: (n+1)(m+1) f64, row-major
//! ```
//!
//! # Durability
//!
//! At creation the store detects whether the mapping is backed by
//! byte-addressable persistent memory (a DAX mapping accepted with
//! `MAP_SYNC`) or by conventional storage. That choice fixes the
//! [`Durability`] implementation used by [`Store::synchronize`] for the
//! lifetime of the store:
//!
//! - [`CacheLineFlush`]: CPU cache-line write-back plus a store fence.
//! - [`MsyncFlush`]: `msync(MS_SYNC)` over the page-aligned range.
//!
//! Nothing is flushed implicitly. Data is only guaranteed durable up to
//! the last completed [`Store::synchronize`] call.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod arena;
pub mod durability;
pub mod error;
pub mod image;
pub mod layout;
pub mod region;
pub mod store;

pub use arena::{GridArena, Slot};
pub use durability::{CacheLineFlush, Durability, DurabilityKind, DurabilityMode, MsyncFlush};
pub use error::{HeaderError, StoreError};
pub use image::StoreImage;
pub use layout::{Header, Layout, HEADER_SIZE};
pub use region::Region;
pub use store::Store;
