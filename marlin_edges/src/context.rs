// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-renderer owner of edge storage.

use crate::arena::EdgeArena;
use crate::edge_array::{EdgeArray, StorageMode};
use crate::Result;

/// Options for creating a [`RasterContext`].
#[derive(Clone, Debug)]
pub struct RasterOptions {
    /// Storage for the active-edge table.
    pub storage: StorageMode,
    /// Edges the table can hold before it first grows.
    pub initial_edges: usize,
    /// Size of the arena block in bytes. Only used with
    /// [`StorageMode::OffHeap`]; it bounds how far the table can grow.
    pub arena_bytes: usize,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            storage: StorageMode::OffHeap,
            initial_edges: 4096,
            arena_bytes: 4 << 20,
        }
    }
}

/// Edge storage for one rasterizer instance, reused from frame to frame.
///
/// The context owns its arena, so nothing is shared with other contexts.
/// [`begin_frame`](Self::begin_frame) recycles the table without returning
/// memory, [`dispose`](Self::dispose) releases it deterministically, and
/// dropping the context releases anything `dispose` didn't.
pub struct RasterContext {
    options: RasterOptions,
    arena: EdgeArena,
    edges: EdgeArray,
    frames: u64,
    disposed: bool,
}

impl RasterContext {
    pub fn new(options: RasterOptions) -> Result<Self> {
        let arena_bytes = match options.storage {
            StorageMode::Heap => 0,
            StorageMode::OffHeap => options.arena_bytes,
        };
        let arena = EdgeArena::new(arena_bytes)?;
        let edges = EdgeArray::allocate(options.storage, &arena, options.initial_edges)?;
        log::debug!(
            "raster context: {:?} storage, {} initial edges",
            options.storage,
            options.initial_edges
        );
        Ok(Self {
            options,
            arena,
            edges,
            frames: 0,
            disposed: false,
        })
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    pub fn arena(&self) -> &EdgeArena {
        &self.arena
    }

    pub fn edges(&self) -> &EdgeArray {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut EdgeArray {
        &mut self.edges
    }

    /// Frames started so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Empty the edge table for a new frame, keeping its memory.
    ///
    /// # Panics
    ///
    /// After [`dispose`](Self::dispose).
    pub fn begin_frame(&mut self) -> &mut EdgeArray {
        assert!(!self.disposed, "raster context used after dispose");
        self.edges.clear();
        self.frames += 1;
        &mut self.edges
    }

    /// Release the edge storage now. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.edges.release();
        self.disposed = true;
        log::debug!("raster context: disposed after {} frames", self.frames);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for RasterContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EdgeRecord;

    #[test]
    fn frames_reuse_storage() {
        let mut ctx = RasterContext::new(RasterOptions {
            initial_edges: 8,
            arena_bytes: 4096,
            ..RasterOptions::default()
        })
        .unwrap();
        let used = ctx.arena().used_bytes();
        for frame in 0..3 {
            let edges = ctx.begin_frame();
            assert!(edges.is_empty());
            for i in 0..8 {
                edges
                    .add(EdgeRecord {
                        y_max: frame * 10 + i,
                        ..EdgeRecord::default()
                    })
                    .unwrap();
            }
        }
        assert_eq!(ctx.frames(), 3);
        assert_eq!(ctx.arena().used_bytes(), used);
        assert_eq!(ctx.arena().live_allocations(), 1);
    }

    #[test]
    fn dispose_releases_once() {
        let mut ctx = RasterContext::new(RasterOptions::default()).unwrap();
        let arena = ctx.arena().clone();
        assert_eq!(arena.live_allocations(), 1);
        ctx.dispose();
        assert_eq!(arena.live_allocations(), 0);
        ctx.dispose();
        drop(ctx);
        assert_eq!(arena.used_bytes(), 0);
    }

    #[test]
    fn heap_mode_has_empty_arena() {
        let ctx = RasterContext::new(RasterOptions {
            storage: StorageMode::Heap,
            ..RasterOptions::default()
        })
        .unwrap();
        assert_eq!(ctx.arena().capacity_bytes(), 0);
        assert!(ctx.edges().off_heap().is_none());
    }

    #[test]
    #[should_panic(expected = "after dispose")]
    fn begin_frame_after_dispose_panics() {
        let mut ctx = RasterContext::new(RasterOptions::default()).unwrap();
        ctx.dispose();
        ctx.begin_frame();
    }
}
