// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Edge`] capability set and its two storage variants.

use crate::off_heap::OffHeapArray;
use crate::record::{EdgeField, EdgeRecord, Orientation};

/// Read and write access to the six fields of one active edge.
///
/// Implemented by [`EdgeRecord`] for managed storage, by [`OffHeapEdge`] for
/// records inside an [`OffHeapArray`], and by [`EdgeRef`], which dispatches to
/// either. Code that advances or inspects edges should be written against
/// this trait so it works with both storage modes.
pub trait Edge {
    fn get(&self, field: EdgeField) -> i32;
    fn set(&mut self, field: EdgeField, value: i32);

    #[inline]
    fn curx_or(&self) -> i32 {
        self.get(EdgeField::CurxOr)
    }
    #[inline]
    fn set_curx_or(&mut self, value: i32) {
        self.set(EdgeField::CurxOr, value);
    }
    #[inline]
    fn error(&self) -> i32 {
        self.get(EdgeField::Error)
    }
    #[inline]
    fn set_error(&mut self, value: i32) {
        self.set(EdgeField::Error, value);
    }
    #[inline]
    fn bump_x(&self) -> i32 {
        self.get(EdgeField::BumpX)
    }
    #[inline]
    fn set_bump_x(&mut self, value: i32) {
        self.set(EdgeField::BumpX, value);
    }
    #[inline]
    fn bump_err(&self) -> i32 {
        self.get(EdgeField::BumpErr)
    }
    #[inline]
    fn set_bump_err(&mut self, value: i32) {
        self.set(EdgeField::BumpErr, value);
    }
    #[inline]
    fn next(&self) -> i32 {
        self.get(EdgeField::Next)
    }
    #[inline]
    fn set_next(&mut self, value: i32) {
        self.set(EdgeField::Next, value);
    }
    #[inline]
    fn y_max(&self) -> i32 {
        self.get(EdgeField::YMax)
    }
    #[inline]
    fn set_y_max(&mut self, value: i32) {
        self.set(EdgeField::YMax, value);
    }

    /// Copy all six fields out.
    fn record(&self) -> EdgeRecord {
        let mut record = EdgeRecord::default();
        for field in EdgeField::ALL {
            record.set_field(field, self.get(field));
        }
        record
    }

    /// Overwrite all six fields.
    fn set_record(&mut self, record: &EdgeRecord) {
        for field in EdgeField::ALL {
            self.set(field, record.field(field));
        }
    }

    /// The pixel column of the current crossing.
    #[inline]
    fn x(&self) -> i32 {
        self.curx_or() >> 1
    }

    #[inline]
    fn orientation(&self) -> Orientation {
        if self.curx_or() & 1 == 0 {
            Orientation::Decreasing
        } else {
            Orientation::Increasing
        }
    }

    /// Whether the edge no longer crosses scanline `y`.
    ///
    /// `y_max` is exclusive: an edge is active on scanlines below it.
    #[inline]
    fn is_expired(&self, y: i32) -> bool {
        y >= self.y_max()
    }

    /// Move the crossing to the next scanline.
    fn advance(&mut self) {
        let (curx_or, error) =
            EdgeRecord::stepped(self.curx_or(), self.error(), self.bump_x(), self.bump_err());
        self.set_curx_or(curx_or);
        self.set_error(error);
    }
}

impl Edge for EdgeRecord {
    #[inline]
    fn get(&self, field: EdgeField) -> i32 {
        self.field(field)
    }

    #[inline]
    fn set(&mut self, field: EdgeField, value: i32) {
        self.set_field(field, value);
    }

    fn record(&self) -> EdgeRecord {
        *self
    }

    fn set_record(&mut self, record: &EdgeRecord) {
        *self = *record;
    }
}

/// An edge stored in an [`OffHeapArray`].
///
/// This is only a position: every access is a typed read or write at the
/// record's field offset in the array's own allocation. Obtain one with
/// [`OffHeapArray::edge`].
pub struct OffHeapEdge<'a> {
    array: &'a mut OffHeapArray,
    index: usize,
}

impl<'a> OffHeapEdge<'a> {
    pub(crate) fn new(array: &'a mut OffHeapArray, index: usize) -> Self {
        Self { array, index }
    }

    /// Record index within the array.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Edge for OffHeapEdge<'_> {
    #[inline]
    fn get(&self, field: EdgeField) -> i32 {
        self.array.get(self.index, field)
    }

    #[inline]
    fn set(&mut self, field: EdgeField, value: i32) {
        self.array.set(self.index, field, value);
    }

    fn record(&self) -> EdgeRecord {
        self.array.record(self.index)
    }

    fn set_record(&mut self, record: &EdgeRecord) {
        self.array.set_record(self.index, *record);
    }
}

/// A live edge inside an [`EdgeArray`](crate::EdgeArray), whichever storage
/// mode the array was built with.
pub enum EdgeRef<'a> {
    Heap(&'a mut EdgeRecord),
    OffHeap(OffHeapEdge<'a>),
}

impl Edge for EdgeRef<'_> {
    #[inline]
    fn get(&self, field: EdgeField) -> i32 {
        match self {
            Self::Heap(record) => record.get(field),
            Self::OffHeap(edge) => edge.get(field),
        }
    }

    #[inline]
    fn set(&mut self, field: EdgeField, value: i32) {
        match self {
            Self::Heap(record) => record.set(field, value),
            Self::OffHeap(edge) => edge.set(field, value),
        }
    }

    fn record(&self) -> EdgeRecord {
        match self {
            Self::Heap(record) => **record,
            Self::OffHeap(edge) => edge.record(),
        }
    }

    fn set_record(&mut self, record: &EdgeRecord) {
        match self {
            Self::Heap(slot) => **slot = *record,
            Self::OffHeap(edge) => edge.set_record(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::EdgeArena;
    use crate::record::NO_EDGE;

    /// Drives an edge through the accessor surface only.
    fn exercise(edge: &mut impl Edge) {
        edge.set_curx_or((7 << 1) | 1);
        edge.set_error(0x4000_0000);
        edge.set_bump_x(2);
        edge.set_bump_err(0x4000_0000);
        edge.set_next(NO_EDGE);
        edge.set_y_max(3);

        assert_eq!(edge.x(), 7);
        assert_eq!(edge.orientation(), Orientation::Increasing);
        edge.advance();
        // 7 + 1, then the error reaches 2^31 and carries one more pixel.
        assert_eq!(edge.x(), 9);
        assert_eq!(edge.error(), 0);
        assert_eq!(edge.orientation(), Orientation::Increasing);
        assert!(!edge.is_expired(2));
        assert!(edge.is_expired(3));
    }

    #[test]
    fn heap_variant() {
        let mut record = EdgeRecord::default();
        exercise(&mut record);
        assert_eq!(record.next, NO_EDGE);
    }

    #[test]
    fn off_heap_variant_matches_heap_variant() {
        let arena = EdgeArena::new(1024).unwrap();
        let mut array = OffHeapArray::allocate(&arena, 3).unwrap();
        exercise(&mut array.edge(1));

        let mut expected = EdgeRecord::default();
        exercise(&mut expected);
        assert_eq!(array.record(1), expected);
        // Neighbours untouched.
        assert_eq!(array.record(0), EdgeRecord::default());
        assert_eq!(array.record(2), EdgeRecord::default());
    }

    #[test]
    fn off_heap_edges_do_not_share_storage() {
        let arena = EdgeArena::new(1024).unwrap();
        let mut a = OffHeapArray::allocate(&arena, 1).unwrap();
        let mut b = OffHeapArray::allocate(&arena, 1).unwrap();
        a.edge(0).set_y_max(11);
        b.edge(0).set_y_max(22);
        assert_eq!(a.edge(0).y_max(), 11);
        assert_eq!(b.edge(0).y_max(), 22);
    }
}
