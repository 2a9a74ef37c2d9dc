// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raw memory block that off-heap edge arrays are carved from.

use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bestfit::BestFit;
use crate::{Error, Result};

/// Alignment of the arena block. Generous enough for any record layout and
/// keeps the first record on a cache line boundary.
const BLOCK_ALIGN: usize = 64;

/// Every range is a multiple of this many bytes, so every range offset keeps
/// the alignment of the record fields.
const GRANULE: usize = 8;

/// An explicitly owned arena of memory for off-heap edge storage.
///
/// The arena is one zero-initialized block from the system allocator, split
/// into ranges on demand. Cloning an `EdgeArena` is cheap and shares the same
/// block; the block is returned to the system allocator once the last clone
/// and the last [`OffHeapArray`](crate::OffHeapArray) allocated from it are
/// gone.
///
/// Ranges handed back to the arena are zeroed first, so a fresh range always
/// reads as zero.
#[derive(Clone)]
pub struct EdgeArena(Arc<ArenaInner>);

struct ArenaInner {
    block: NonNull<u8>,
    size: usize,
    ranges: Mutex<ArenaState>,
}

struct ArenaState {
    free: BestFit,
    live: usize,
}

/// A range owned by exactly one off-heap array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ArenaRange {
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

// SAFETY: the block is only ever accessed through disjoint `ArenaRange`s, each
// owned by a single array, and the free-range bookkeeping is behind a mutex.
unsafe impl Send for ArenaInner {}
// SAFETY: see above.
unsafe impl Sync for ArenaInner {}

static_assertions::assert_impl_all!(EdgeArena: Send, Sync);

impl EdgeArena {
    /// Reserve a block of `capacity` bytes from the system allocator.
    ///
    /// The capacity is rounded down to a whole number of granules. A zero
    /// capacity arena is valid and can only serve empty arrays.
    pub fn new(capacity: usize) -> Result<Self> {
        let size = capacity - capacity % GRANULE;
        let free_size = u32::try_from(size).map_err(|_| Error::LayoutOverflow(size))?;
        let block = if size == 0 {
            NonNull::dangling()
        } else {
            let layout = Self::layout(size)?;
            // SAFETY: `layout` has a non-zero size.
            let ptr = unsafe { alloc::alloc_zeroed(layout) };
            NonNull::new(ptr).ok_or(Error::ArenaAllocation(size))?
        };
        log::debug!("edge arena: reserved {size} bytes");
        Ok(Self(Arc::new(ArenaInner {
            block,
            size,
            ranges: Mutex::new(ArenaState {
                free: BestFit::new(free_size),
                live: 0,
            }),
        })))
    }

    /// Total size of the block in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.0.size
    }

    /// Bytes currently handed out to arrays.
    pub fn used_bytes(&self) -> usize {
        let state = self.0.state();
        self.0.size - state.free.free_bytes() as usize
    }

    /// Length of the largest allocation that could currently succeed.
    pub fn largest_free(&self) -> usize {
        self.0.state().free.largest_free() as usize
    }

    /// Number of ranges currently handed out.
    pub fn live_allocations(&self) -> usize {
        self.0.state().live
    }

    /// Whether two handles share the same block.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn layout(size: usize) -> Result<Layout> {
        Layout::from_size_align(size, BLOCK_ALIGN).map_err(|_| Error::LayoutOverflow(size))
    }

    /// Carve out a zeroed range of at least `len` bytes.
    pub(crate) fn alloc(&self, len: usize) -> Result<ArenaRange> {
        let rounded = len
            .checked_next_multiple_of(GRANULE)
            .ok_or(Error::LayoutOverflow(len))?;
        let mut state = self.0.state();
        let offset = u32::try_from(rounded)
            .ok()
            .and_then(|rounded| state.free.alloc(rounded))
            .ok_or_else(|| Error::OutOfMemory {
                requested: rounded,
                available: state.free.largest_free() as usize,
            })?;
        state.live += 1;
        Ok(ArenaRange {
            offset: offset as usize,
            len: rounded,
        })
    }

    /// Give back the tail of `range` past `keep` bytes, returning the
    /// shortened range.
    pub(crate) fn shrink(&self, range: ArenaRange, keep: usize) -> ArenaRange {
        let keep = keep.next_multiple_of(GRANULE);
        debug_assert!(keep > 0 && keep <= range.len);
        if keep < range.len {
            let tail = ArenaRange {
                offset: range.offset + keep,
                len: range.len - keep,
            };
            self.zero(tail);
            self.0
                .state()
                .free
                .free(tail.offset as u32, tail.len as u32);
        }
        ArenaRange {
            offset: range.offset,
            len: keep,
        }
    }

    /// Zero `range` and return it to the free set.
    pub(crate) fn release(&self, range: ArenaRange) {
        self.zero(range);
        let mut state = self.0.state();
        state.free.free(range.offset as u32, range.len as u32);
        state.live -= 1;
    }

    fn zero(&self, range: ArenaRange) {
        // SAFETY: the caller owns `range` exclusively.
        unsafe { self.bytes_mut(range) }.fill(0);
    }

    /// View the bytes of a range.
    ///
    /// # Safety
    ///
    /// `range` must have been returned by [`alloc`](Self::alloc) on this
    /// arena and not yet released, and no mutable view of it may be alive.
    pub(crate) unsafe fn bytes(&self, range: ArenaRange) -> &[u8] {
        debug_assert!(range.offset + range.len <= self.0.size);
        std::slice::from_raw_parts(self.0.block.as_ptr().add(range.offset), range.len)
    }

    /// Mutable view of the bytes of a range.
    ///
    /// # Safety
    ///
    /// `range` must have been returned by [`alloc`](Self::alloc) on this
    /// arena and not yet released, and the caller must hold the only view
    /// of it.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn bytes_mut(&self, range: ArenaRange) -> &mut [u8] {
        debug_assert!(range.offset + range.len <= self.0.size);
        std::slice::from_raw_parts_mut(self.0.block.as_ptr().add(range.offset), range.len)
    }

    /// Copy `len` bytes between two distinct ranges.
    pub(crate) fn copy(&self, src: ArenaRange, dst: ArenaRange, len: usize) {
        assert!(len <= src.len && len <= dst.len);
        assert!(
            src.offset + src.len <= dst.offset || dst.offset + dst.len <= src.offset,
            "arena ranges overlap"
        );
        // SAFETY: both ranges are live, owned by the caller, and disjoint.
        unsafe {
            std::ptr::copy_nonoverlapping(
                self.0.block.as_ptr().add(src.offset),
                self.0.block.as_ptr().add(dst.offset),
                len,
            );
        }
    }
}

impl ArenaInner {
    fn state(&self) -> std::sync::MutexGuard<'_, ArenaState> {
        self.ranges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ArenaInner {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        let live = self.state().live;
        debug_assert_eq!(live, 0, "arena dropped with live ranges");
        if let Ok(layout) = EdgeArena::layout(self.size) {
            // SAFETY: `block` was allocated in `EdgeArena::new` with this layout.
            unsafe { alloc::dealloc(self.block.as_ptr(), layout) };
        }
        log::debug!("edge arena: released {} bytes", self.size);
    }
}

impl core::fmt::Debug for EdgeArena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EdgeArena")
            .field("capacity_bytes", &self.capacity_bytes())
            .field("used_bytes", &self.used_bytes())
            .field("live_allocations", &self.live_allocations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_zeroed_and_recycled() {
        let arena = EdgeArena::new(256).unwrap();
        let a = arena.alloc(24).unwrap();
        assert_eq!(a.len, 24);
        unsafe { arena.bytes_mut(a) }.fill(0xAB);
        arena.release(a);
        assert_eq!(arena.live_allocations(), 0);
        assert_eq!(arena.used_bytes(), 0);

        let b = arena.alloc(24).unwrap();
        assert_eq!(b.offset, a.offset);
        assert!(unsafe { arena.bytes(b) }.iter().all(|&byte| byte == 0));
        arena.release(b);
    }

    #[test]
    fn lengths_round_to_granule() {
        let arena = EdgeArena::new(100).unwrap();
        assert_eq!(arena.capacity_bytes(), 96);
        let r = arena.alloc(20).unwrap();
        assert_eq!(r.len, 24);
        let r = arena.shrink(r, 9);
        assert_eq!(r.len, 16);
        assert_eq!(arena.used_bytes(), 16);
        arena.release(r);
    }

    #[test]
    fn exhaustion_reports_largest_range() {
        let arena = EdgeArena::new(64).unwrap();
        let a = arena.alloc(48).unwrap();
        let err = arena.alloc(24).unwrap_err();
        assert_eq!(
            err,
            Error::OutOfMemory {
                requested: 24,
                available: 16
            }
        );
        arena.release(a);
    }

    #[test]
    fn zero_capacity() {
        let arena = EdgeArena::new(0).unwrap();
        assert!(matches!(arena.alloc(8), Err(Error::OutOfMemory { .. })));
    }
}
