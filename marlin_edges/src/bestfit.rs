// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Best-fit bookkeeping of free byte ranges inside an arena block.

use std::collections::{BTreeMap, BTreeSet};

/// Tracks the free ranges of a block and hands out the smallest one that
/// fits. Adjacent free ranges are merged on release.
pub(crate) struct BestFit {
    /// Offset to length of every free range.
    by_offset: BTreeMap<u32, u32>,
    /// The same ranges ordered by `(length, offset)`.
    by_len: BTreeSet<(u32, u32)>,
    free_bytes: u32,
}

impl BestFit {
    pub(crate) fn new(size: u32) -> Self {
        let mut free = Self {
            by_offset: BTreeMap::new(),
            by_len: BTreeSet::new(),
            free_bytes: 0,
        };
        if size > 0 {
            free.insert(0, size);
        }
        free
    }

    /// Total free bytes, possibly fragmented.
    pub(crate) fn free_bytes(&self) -> u32 {
        self.free_bytes
    }

    /// Length of the largest contiguous free range.
    pub(crate) fn largest_free(&self) -> u32 {
        self.by_len.last().map_or(0, |&(len, _)| len)
    }

    /// Reserve `len` bytes, returning the offset of the range.
    pub(crate) fn alloc(&mut self, len: u32) -> Option<u32> {
        debug_assert!(len > 0, "zero-length ranges are never handed out");
        let (block_len, offset) = *self.by_len.range((len, 0)..).next()?;
        self.remove(offset, block_len);
        if block_len > len {
            self.insert(offset + len, block_len - len);
        }
        Some(offset)
    }

    /// Return `[offset, offset + len)` to the free set.
    pub(crate) fn free(&mut self, offset: u32, len: u32) {
        let mut start = offset;
        let mut end = offset + len;
        let before = self
            .by_offset
            .range(..offset)
            .next_back()
            .map(|(&o, &l)| (o, l));
        if let Some((prev, prev_len)) = before {
            debug_assert!(prev + prev_len <= offset, "range freed twice");
            if prev + prev_len == offset {
                self.remove(prev, prev_len);
                start = prev;
            }
        }
        if let Some(next_len) = self.by_offset.get(&end).copied() {
            self.remove(end, next_len);
            end += next_len;
        }
        self.insert(start, end - start);
    }

    fn insert(&mut self, offset: u32, len: u32) {
        self.by_offset.insert(offset, len);
        self.by_len.insert((len, offset));
        self.free_bytes += len;
    }

    fn remove(&mut self, offset: u32, len: u32) {
        self.by_offset.remove(&offset);
        self.by_len.remove(&(len, offset));
        self.free_bytes -= len;
    }
}

#[cfg(test)]
mod tests {
    use super::BestFit;

    #[test]
    fn picks_smallest_fitting_range() {
        let mut fit = BestFit::new(100);
        let a = fit.alloc(10).unwrap();
        let b = fit.alloc(30).unwrap();
        let c = fit.alloc(20).unwrap();
        assert_eq!((a, b, c), (0, 10, 40));
        fit.free(b, 30);
        // Free ranges are now [10, 40) and [60, 100); 25 fits the first.
        assert_eq!(fit.alloc(25), Some(10));
        assert_eq!(fit.free_bytes(), 100 - 10 - 25 - 20);
    }

    #[test]
    fn coalesces_neighbours() {
        let mut fit = BestFit::new(64);
        let a = fit.alloc(16).unwrap();
        let b = fit.alloc(16).unwrap();
        let c = fit.alloc(16).unwrap();
        assert_eq!(fit.largest_free(), 16);
        fit.free(a, 16);
        fit.free(c, 16);
        assert_eq!(fit.largest_free(), 32);
        fit.free(b, 16);
        assert_eq!(fit.largest_free(), 64);
        assert_eq!(fit.alloc(64), Some(0));
    }

    #[test]
    fn exhaustion() {
        let mut fit = BestFit::new(8);
        assert_eq!(fit.alloc(8), Some(0));
        assert_eq!(fit.alloc(1), None);
        assert_eq!(fit.largest_free(), 0);
        assert_eq!(BestFit::new(0).alloc(1), None);
    }
}
