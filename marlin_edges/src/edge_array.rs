// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A growable table of active edges over either storage mode.

use crate::arena::EdgeArena;
use crate::edge::{Edge, EdgeRef};
use crate::off_heap::OffHeapArray;
use crate::record::{EdgeRecord, NO_EDGE};
use crate::{Error, Result};

/// Smallest off-heap growth step, in records.
const MIN_OFF_HEAP_GROWTH: usize = 16;

/// Where an [`EdgeArray`] keeps its records.
///
/// This is chosen once, when the array is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// A `Vec` of records on the Rust heap.
    Heap,
    /// One contiguous [`OffHeapArray`] carved from an [`EdgeArena`].
    OffHeap,
}

/// Identifies a live edge in an [`EdgeArray`].
///
/// The slot index is what goes into [`EdgeRecord::next`] links. The
/// generation lets the array tell a removed edge apart from a later edge that
/// reused its slot: an id whose edge was removed (or cleared) never resolves
/// again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId {
    index: u32,
    generation: u32,
}

impl EdgeId {
    /// Slot index of the edge.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// The value to store in another edge's `next` field to link to this one.
    #[inline]
    pub fn link(self) -> i32 {
        self.index as i32
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    generation: u32,
    live: bool,
}

enum Storage {
    Heap(Vec<EdgeRecord>),
    OffHeap(OffHeapArray),
}

/// The active-edge table.
///
/// Edges are addressed by [`EdgeId`], never by iteration order; removing an
/// edge frees its slot for a later [`add`](Self::add) and says nothing about
/// where the remaining edges sit. Removed slots are zeroed so nothing of a
/// removed edge stays observable.
pub struct EdgeArray {
    storage: Storage,
    slots: Vec<Slot>,
    /// Number of leading slots backed by storage.
    used: usize,
    free: Vec<u32>,
    len: usize,
}

impl EdgeArray {
    /// Create an array with room for `initial_count` edges.
    ///
    /// `arena` is only used in [`StorageMode::OffHeap`]. Room beyond
    /// `initial_count` is found by growing the storage.
    pub fn allocate(mode: StorageMode, arena: &EdgeArena, initial_count: usize) -> Result<Self> {
        let storage = match mode {
            StorageMode::Heap => Storage::Heap(Vec::with_capacity(initial_count)),
            StorageMode::OffHeap => {
                Storage::OffHeap(OffHeapArray::allocate(arena, initial_count)?)
            }
        };
        Ok(Self {
            storage,
            slots: Vec::with_capacity(initial_count),
            used: 0,
            free: Vec::new(),
            len: 0,
        })
    }

    pub fn mode(&self) -> StorageMode {
        match self.storage {
            Storage::Heap(_) => StorageMode::Heap,
            Storage::OffHeap(_) => StorageMode::OffHeap,
        }
    }

    /// Number of live edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of edges the storage holds without growing.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Heap(records) => records.capacity(),
            Storage::OffHeap(array) => array.count(),
        }
    }

    /// The off-heap storage, when the array uses it.
    pub fn off_heap(&self) -> Option<&OffHeapArray> {
        match &self.storage {
            Storage::Heap(_) => None,
            Storage::OffHeap(array) => Some(array),
        }
    }

    /// Insert an edge, reusing a removed slot if there is one.
    ///
    /// Growing off-heap storage can fail with [`Error::OutOfMemory`].
    pub fn add(&mut self, record: EdgeRecord) -> Result<EdgeId> {
        let index = match self.free.pop() {
            Some(index) => {
                let index = index as usize;
                self.write(index, record);
                index
            }
            None => {
                let index = self.used;
                // Slot indices must fit a `next` link.
                if i32::try_from(index).is_err() {
                    return Err(Error::LayoutOverflow(index));
                }
                self.push_storage(record)?;
                if index == self.slots.len() {
                    self.slots.push(Slot::default());
                }
                self.used += 1;
                index
            }
        };
        let slot = &mut self.slots[index];
        slot.live = true;
        self.len += 1;
        Ok(EdgeId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    fn push_storage(&mut self, record: EdgeRecord) -> Result<()> {
        match &mut self.storage {
            Storage::Heap(records) => records.push(record),
            Storage::OffHeap(array) => {
                if array.index() == array.count() {
                    let grown = (array.count() * 2).max(MIN_OFF_HEAP_GROWTH);
                    log::debug!("edge array: growing off-heap storage to {grown} records");
                    array.resize(grown)?;
                }
                array.push(record)?;
            }
        }
        Ok(())
    }

    /// Remove an edge, returning its last contents.
    ///
    /// Returns `None` if `id` does not name a live edge.
    pub fn remove(&mut self, id: EdgeId) -> Option<EdgeRecord> {
        let index = self.resolve(id)?;
        Some(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> EdgeRecord {
        let record = self.read(index);
        self.write(index, EdgeRecord::default());
        let slot = &mut self.slots[index];
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        self.len -= 1;
        record
    }

    /// Make sure `size` edges fit without growing. The edge count is
    /// unchanged and capacity never shrinks.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Heap(records) => records.reserve(size.saturating_sub(records.len())),
            Storage::OffHeap(array) => {
                if size > array.count() {
                    array.resize(size)?;
                }
            }
        }
        Ok(())
    }

    /// Remove every edge, keeping the storage for reuse.
    ///
    /// All outstanding [`EdgeId`]s are invalidated. Off-heap storage is
    /// zero-filled rather than released.
    pub fn clear(&mut self) {
        self.invalidate_slots();
        match &mut self.storage {
            Storage::Heap(records) => records.clear(),
            Storage::OffHeap(array) => array.fill(0),
        }
    }

    /// Return all storage. For off-heap arrays this frees the underlying
    /// [`OffHeapArray`]; using the array afterwards panics.
    ///
    /// Calling this more than once is harmless.
    pub fn release(&mut self) {
        self.invalidate_slots();
        match &mut self.storage {
            Storage::Heap(records) => *records = Vec::new(),
            Storage::OffHeap(array) => array.free(),
        }
    }

    /// Kill every slot in use so no earlier [`EdgeId`] resolves again.
    fn invalidate_slots(&mut self) {
        for slot in &mut self.slots[..self.used] {
            slot.live = false;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.free.clear();
        self.used = 0;
        self.len = 0;
    }

    /// Contents of a live edge.
    pub fn get(&self, id: EdgeId) -> Option<EdgeRecord> {
        self.resolve(id).map(|index| self.read(index))
    }

    /// Mutable access to a live edge.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<EdgeRef<'_>> {
        let index = self.resolve(id)?;
        Some(self.edge_at(index))
    }

    /// The id of the live edge in slot `index`, for following `next` links.
    pub fn id_at(&self, index: usize) -> Option<EdgeId> {
        if index >= self.used {
            return None;
        }
        let slot = self.slots.get(index).filter(|slot| slot.live)?;
        Some(EdgeId {
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// All live edges, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, EdgeRecord)> + '_ {
        (0..self.used).filter_map(|index| {
            let id = self.id_at(index)?;
            Some((id, self.read(index)))
        })
    }

    /// Walk an active-edge list starting at slot `head`.
    ///
    /// # Panics
    ///
    /// The iterator panics if a link names a slot without a live edge, or if
    /// the list is longer than the number of slots (a cycle).
    pub fn chain(&self, head: i32) -> Chain<'_> {
        Chain {
            array: self,
            next: head,
            remaining: self.used,
        }
    }

    /// Move the active-edge list starting at `head` on to scanline `next_y`.
    ///
    /// Edges that are not active on `next_y` are unlinked and removed; the
    /// others advance by one scanline. Returns the new head of the list.
    pub fn advance_chain(&mut self, head: i32, next_y: i32) -> i32 {
        let mut head = head;
        let mut prev = None;
        let mut cursor = head;
        let mut remaining = self.used;
        while cursor != NO_EDGE {
            assert!(remaining > 0, "active edge list contains a cycle");
            remaining -= 1;
            let index = self.link_index(cursor);
            let (next, expired) = {
                let mut edge = self.edge_at(index);
                let expired = edge.is_expired(next_y);
                if !expired {
                    edge.advance();
                }
                (edge.next(), expired)
            };
            if expired {
                match prev {
                    None => head = next,
                    Some(prev) => self.edge_at(prev).set_next(next),
                }
                self.remove_at(index);
            } else {
                prev = Some(index);
            }
            cursor = next;
        }
        head
    }

    fn resolve(&self, id: EdgeId) -> Option<usize> {
        let index = id.index();
        let slot = self.slots.get(index)?;
        (index < self.used && slot.live && slot.generation == id.generation).then_some(index)
    }

    fn link_index(&self, link: i32) -> usize {
        match usize::try_from(link) {
            Ok(index)
                if index < self.used && self.slots.get(index).is_some_and(|slot| slot.live) =>
            {
                index
            }
            _ => panic!("active edge list links to slot {link}, which holds no live edge"),
        }
    }

    fn edge_at(&mut self, index: usize) -> EdgeRef<'_> {
        match &mut self.storage {
            Storage::Heap(records) => EdgeRef::Heap(&mut records[index]),
            Storage::OffHeap(array) => EdgeRef::OffHeap(array.edge(index)),
        }
    }

    fn read(&self, index: usize) -> EdgeRecord {
        match &self.storage {
            Storage::Heap(records) => records[index],
            Storage::OffHeap(array) => array.record(index),
        }
    }

    fn write(&mut self, index: usize, record: EdgeRecord) {
        match &mut self.storage {
            Storage::Heap(records) => records[index] = record,
            Storage::OffHeap(array) => array.set_record(index, record),
        }
    }
}

impl core::fmt::Debug for EdgeArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EdgeArray")
            .field("mode", &self.mode())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

/// Iterator over an active-edge list, yielding `(slot, record)` pairs in
/// `next` order. See [`EdgeArray::chain`].
pub struct Chain<'a> {
    array: &'a EdgeArray,
    next: i32,
    remaining: usize,
}

impl Iterator for Chain<'_> {
    type Item = (usize, EdgeRecord);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NO_EDGE {
            return None;
        }
        assert!(self.remaining > 0, "active edge list contains a cycle");
        self.remaining -= 1;
        let index = self.array.link_index(self.next);
        let record = self.array.read(index);
        self.next = record.next;
        Some((index, record))
    }
}
