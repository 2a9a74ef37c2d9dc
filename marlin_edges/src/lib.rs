// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-edge storage for the Marlin scanline rasterizer.
//!
//! During scan conversion every polygon edge that crosses the current scanline
//! lives in the active-edge table as a small fixed record of six 32-bit
//! integers (see [`EdgeRecord`]). This crate stores those records in one of two
//! interchangeable ways:
//!
//! - [`StorageMode::Heap`]: a plain `Vec` of records, managed by the allocator
//!   like any other Rust value.
//! - [`StorageMode::OffHeap`]: one contiguous block carved out of an explicit
//!   [`EdgeArena`], with a manual allocate / fill / resize / free lifecycle
//!   and a byte layout that native consumers can read directly.
//!
//! Both are exposed through the [`Edge`] trait and the [`EdgeArray`]
//! container, so call sites don't change with the storage mode.
//!
//! # Ownership
//!
//! There is no process-wide arena. A [`RasterContext`] owns its arena and edge
//! table for as long as it lives; it is reused across frames with
//! [`RasterContext::begin_frame`] and torn down with
//! [`RasterContext::dispose`] (or by being dropped).
//!
//! # Threading
//!
//! Nothing in this crate takes a lock on the hot path. A given [`EdgeArray`]
//! or [`OffHeapArray`] is meant to be driven by the single thread doing scan
//! conversion for one target; the borrow checker enforces that no reads race
//! a resize or fill.
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod arena;
mod bestfit;
mod context;
mod edge;
mod edge_array;
mod off_heap;
mod record;

pub use arena::EdgeArena;
pub use context::{RasterContext, RasterOptions};
pub use edge::{Edge, EdgeRef, OffHeapEdge};
pub use edge_array::{Chain, EdgeArray, EdgeId, StorageMode};
pub use off_heap::OffHeapArray;
pub use record::{EdgeField, EdgeRecord, Orientation, EDGE_SIZE, FIELD_COUNT, NO_EDGE};

use thiserror::Error;

/// Errors that can occur while allocating or growing edge storage.
///
/// All of these are fatal for the frame being rasterized and are meant to
/// unwind to whoever started it. Out-of-bounds record access is not an error
/// value: it is a programming error and panics.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The arena could not satisfy an allocation.
    ///
    /// `available` is the largest contiguous free range at the time of the
    /// request, which may be smaller than the total free space.
    #[error("out of edge memory: requested {requested} bytes, largest free range is {available} bytes")]
    OutOfMemory {
        /// Bytes requested.
        requested: usize,
        /// Largest contiguous free range.
        available: usize,
    },
    /// The system allocator refused the arena block itself.
    #[error("system allocator could not provide a {0} byte arena block")]
    ArenaAllocation(usize),
    /// A record count whose byte size can't be represented.
    #[error("{0} edge records exceed the addressable arena size")]
    LayoutOverflow(usize),
    /// [`OffHeapArray::push`] was called with the write cursor at capacity.
    #[error("off-heap edge array is full ({count} records)")]
    CapacityExceeded {
        /// Allocated record count.
        count: usize,
    },
}

/// A specialized `Result` type for edge storage operations.
pub type Result<T> = core::result::Result<T, Error>;
