// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manually managed edge records living in an [`EdgeArena`].

use crate::arena::{ArenaRange, EdgeArena};
use crate::edge::OffHeapEdge;
use crate::record::{EdgeField, EdgeRecord, EDGE_SIZE, FIELD_COUNT};
use crate::{Error, Result};

/// A contiguous run of [`EdgeRecord`]s outside of any `Vec`.
///
/// The lifecycle is `allocate → (fill | resize)* → free`:
///
/// - [`allocate`](Self::allocate) reserves `count × 24` zeroed bytes.
/// - [`fill`](Self::fill) overwrites every byte and rewinds the write cursor,
///   recycling the memory between frames without returning it.
/// - [`resize`](Self::resize) changes the record count, keeping the records
///   below the smaller of the two counts. The records may move within the
///   arena, so only indices stay meaningful across a resize.
/// - [`free`](Self::free) zeroes the memory and gives it back. Calling it
///   again does nothing, and dropping the array calls it for you.
///
/// Any access to the records after `free` panics.
pub struct OffHeapArray {
    arena: EdgeArena,
    range: Option<ArenaRange>,
    /// Allocated record count.
    count: usize,
    /// Next write position for [`push`](Self::push).
    index: usize,
    freed: bool,
}

static_assertions::assert_impl_all!(OffHeapArray: Send);

impl OffHeapArray {
    /// Reserve room for `count` records from `arena`.
    ///
    /// Fails with [`Error::OutOfMemory`] if the arena has no free range large
    /// enough.
    pub fn allocate(arena: &EdgeArena, count: usize) -> Result<Self> {
        let range = Self::alloc_range(arena, count)?;
        log::trace!("off-heap edges: allocated {count} records");
        Ok(Self {
            arena: arena.clone(),
            range,
            count,
            index: 0,
            freed: false,
        })
    }

    fn alloc_range(arena: &EdgeArena, count: usize) -> Result<Option<ArenaRange>> {
        let bytes = Self::byte_len(count)?;
        if bytes == 0 {
            Ok(None)
        } else {
            arena.alloc(bytes).map(Some)
        }
    }

    fn byte_len(count: usize) -> Result<usize> {
        count
            .checked_mul(EDGE_SIZE)
            .ok_or(Error::LayoutOverflow(count))
    }

    /// The arena this array was allocated from.
    pub fn arena(&self) -> &EdgeArena {
        &self.arena
    }

    /// Allocated capacity, in records.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Position of the next [`push`](Self::push).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether [`free`](Self::free) has run.
    pub fn is_freed(&self) -> bool {
        self.freed
    }

    /// Change the allocated record count.
    ///
    /// Records in `[0, min(count, new_count))` are preserved and the write
    /// cursor is clamped to the new count. Shrinking happens in place;
    /// growing allocates a new range, copies, then releases the old one. If
    /// the new range can't be allocated the array is left exactly as it was.
    pub fn resize(&mut self, new_count: usize) -> Result<()> {
        self.assert_live();
        if new_count == self.count {
            return Ok(());
        }
        let new_bytes = Self::byte_len(new_count)?;
        let old = self.range;
        self.range = match old {
            None => Self::alloc_range(&self.arena, new_count)?,
            Some(old) if new_bytes == 0 => {
                self.arena.release(old);
                None
            }
            Some(old) if new_count < self.count => Some(self.arena.shrink(old, new_bytes)),
            Some(old) => {
                let new = self.arena.alloc(new_bytes)?;
                self.arena.copy(old, new, self.count * EDGE_SIZE);
                self.arena.release(old);
                Some(new)
            }
        };
        log::trace!(
            "off-heap edges: resized {} -> {new_count} records",
            self.count
        );
        self.count = new_count;
        self.index = self.index.min(new_count);
        Ok(())
    }

    /// Overwrite every byte with `value` and rewind the write cursor.
    pub fn fill(&mut self, value: u8) {
        self.bytes_mut().fill(value);
        self.index = 0;
    }

    /// Zero the records, rewind the cursor and return the memory to the
    /// arena.
    ///
    /// Only the first call does anything.
    pub fn free(&mut self) {
        if self.freed {
            return;
        }
        if let Some(range) = self.range.take() {
            self.arena.release(range);
        }
        log::trace!("off-heap edges: freed {} records", self.count);
        self.count = 0;
        self.index = 0;
        self.freed = true;
    }

    /// Write `record` at the cursor and advance it, returning the index
    /// written.
    ///
    /// The cursor never passes [`count`](Self::count); resize first.
    pub fn push(&mut self, record: EdgeRecord) -> Result<usize> {
        self.assert_live();
        if self.index >= self.count {
            return Err(Error::CapacityExceeded { count: self.count });
        }
        let index = self.index;
        self.set_record(index, record);
        self.index += 1;
        Ok(index)
    }

    /// Read the whole record at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`count`](Self::count), or after `free`.
    #[inline]
    pub fn record(&self, index: usize) -> EdgeRecord {
        self.check_index(index);
        self.as_records()[index]
    }

    /// Overwrite the whole record at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`count`](Self::count), or after `free`.
    #[inline]
    pub fn set_record(&mut self, index: usize, record: EdgeRecord) {
        self.check_index(index);
        self.as_records_mut()[index] = record;
    }

    /// Typed read of one field at `index * 24 + field.offset()`.
    #[inline]
    pub fn get(&self, index: usize, field: EdgeField) -> i32 {
        self.check_index(index);
        self.words()[index * FIELD_COUNT + field.index()]
    }

    /// Typed write of one field at `index * 24 + field.offset()`.
    #[inline]
    pub fn set(&mut self, index: usize, field: EdgeField, value: i32) {
        self.check_index(index);
        self.words_mut()[index * FIELD_COUNT + field.index()] = value;
    }

    /// A view of the record at `index` implementing [`Edge`](crate::Edge).
    pub fn edge(&mut self, index: usize) -> OffHeapEdge<'_> {
        self.check_index(index);
        OffHeapEdge::new(self, index)
    }

    /// All allocated records.
    pub fn as_records(&self) -> &[EdgeRecord] {
        match self.as_bytes() {
            [] => &[],
            bytes => bytemuck::cast_slice(bytes),
        }
    }

    /// All allocated records, mutably.
    pub fn as_records_mut(&mut self) -> &mut [EdgeRecord] {
        match self.bytes_mut() {
            [] => &mut [],
            bytes => bytemuck::cast_slice_mut(bytes),
        }
    }

    /// The raw layout: `count` records of six native-endian `i32`s each.
    pub fn as_bytes(&self) -> &[u8] {
        self.assert_live();
        match self.range {
            // SAFETY: the range is owned by this array until `free`, and the
            // shared borrow of `self` rules out a concurrent mutable view.
            Some(range) => {
                let bytes = unsafe { self.arena.bytes(range) };
                &bytes[..self.count * EDGE_SIZE]
            }
            None => &[],
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.assert_live();
        match self.range {
            // SAFETY: the range is owned by this array until `free`, and the
            // exclusive borrow of `self` makes this the only view.
            Some(range) => {
                let bytes = unsafe { self.arena.bytes_mut(range) };
                &mut bytes[..self.count * EDGE_SIZE]
            }
            None => &mut [],
        }
    }

    fn words(&self) -> &[i32] {
        bytemuck::cast_slice(self.as_records())
    }

    fn words_mut(&mut self) -> &mut [i32] {
        bytemuck::cast_slice_mut(self.as_records_mut())
    }

    #[inline]
    fn assert_live(&self) {
        assert!(!self.freed, "off-heap edge array used after free");
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.count,
            "edge record {index} out of bounds for off-heap array of {} records",
            self.count
        );
    }
}

impl Drop for OffHeapArray {
    fn drop(&mut self) {
        self.free();
    }
}

impl core::fmt::Debug for OffHeapArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OffHeapArray")
            .field("count", &self.count)
            .field("index", &self.index)
            .field("freed", &self.freed)
            .finish_non_exhaustive()
    }
}
