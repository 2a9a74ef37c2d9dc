// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fixed binary layout of one active edge.

use core::ops::Range;

use bytemuck::{Pod, Zeroable};

/// Sentinel stored in [`EdgeRecord::next`] when no further edge follows.
pub const NO_EDGE: i32 = -1;

/// Number of 32-bit fields in an edge record.
pub const FIELD_COUNT: usize = 6;

/// Size in bytes of one edge record, with no padding between records.
pub const EDGE_SIZE: usize = FIELD_COUNT * core::mem::size_of::<i32>();

const POWER_2_TO_32: f64 = 4_294_967_296.0;
/// Clears the orientation bit of `curx_or`.
const ALL_BUT_LSB: i32 = !1;
const ERR_STEP_MAX: i32 = 0x7fff_ffff;
/// Largest pixel offset `curx_or` and `bump_x` can hold next to the
/// orientation bit.
const MAX_PIXEL: f64 = ((1 << 30) - 1) as f64;

/// One active edge in the layout shared with native consumers.
///
/// The six fields are native-endian `i32`s in exactly this order. Arrays of
/// records are contiguous, 24 bytes apart.
///
/// `curx_or` holds the crossing x coordinate shifted left by one, with the
/// edge [`Orientation`] in the low bit. `error` is a 31-bit fraction of a
/// pixel, and `bump_x`/`bump_err` are the per-scanline increments in the same
/// encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Zeroable, Pod)]
#[repr(C)]
pub struct EdgeRecord {
    /// Current x (shifted left by one) or'ed with the orientation bit.
    pub curx_or: i32,
    /// Fractional x accumulator.
    pub error: i32,
    /// Whole-pixel x step per scanline, shifted left by one.
    pub bump_x: i32,
    /// Fractional x step per scanline.
    pub bump_err: i32,
    /// Slot index of the next edge in the active list, or [`NO_EDGE`].
    pub next: i32,
    /// First scanline on which this edge is no longer active.
    pub y_max: i32,
}

static_assertions::assert_eq_size!(EdgeRecord, [u8; EDGE_SIZE]);
static_assertions::const_assert_eq!(core::mem::align_of::<EdgeRecord>(), 4);

/// Direction of the source segment in y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// The segment was given with y decreasing.
    Decreasing = 0,
    /// The segment was given with y increasing.
    Increasing = 1,
}

impl Orientation {
    /// Winding contribution of an edge with this orientation.
    pub fn winding(self) -> i32 {
        match self {
            Self::Decreasing => -1,
            Self::Increasing => 1,
        }
    }
}

/// Names one field of an [`EdgeRecord`] together with its byte offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeField {
    CurxOr,
    Error,
    BumpX,
    BumpErr,
    Next,
    YMax,
}

impl EdgeField {
    /// All fields in layout order.
    pub const ALL: [Self; FIELD_COUNT] = [
        Self::CurxOr,
        Self::Error,
        Self::BumpX,
        Self::BumpErr,
        Self::Next,
        Self::YMax,
    ];

    /// Position of the field in units of `i32`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Byte offset of the field from the start of its record.
    #[inline]
    pub const fn offset(self) -> usize {
        self.index() * core::mem::size_of::<i32>()
    }
}

impl EdgeRecord {
    /// Build the record for a line segment given in subpixel coordinates.
    ///
    /// Scanlines are sampled at their centres, so the edge covers scanlines
    /// `ceil(y_top - 0.5)` up to (not including) `ceil(y_bottom - 0.5)`,
    /// further limited to `clip_y`. Returns `None` for horizontal segments
    /// and for segments that cross no sampled scanline inside `clip_y`.
    ///
    /// Crossings and slopes beyond the 31-bit pixel range are clamped to it.
    /// Segments with a non-finite coordinate produce no edge.
    ///
    /// The returned record is unlinked (`next` is [`NO_EDGE`]); its first
    /// active scanline is returned alongside it.
    pub fn from_segment(
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        clip_y: Range<i32>,
    ) -> Option<(i32, Self)> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (orientation, xa, ya, xb, yb) = if y1 < y0 {
            (Orientation::Decreasing, x1, y1, x0, y0)
        } else {
            (Orientation::Increasing, x0, y0, x1, y1)
        };
        if ya == yb {
            return None;
        }
        let slope = (xb - xa) / (yb - ya);
        let first = ((ya - 0.5).ceil() as i32).max(clip_y.start);
        let last = ((yb - 0.5).ceil() as i32).min(clip_y.end);
        if first >= last {
            return None;
        }
        let x_intercept =
            (xa + (f64::from(first) + 0.5 - ya) * slope).clamp(-MAX_PIXEL, MAX_PIXEL);
        let slope = slope.clamp(-MAX_PIXEL, MAX_PIXEL);
        // Bias by just under half a pixel so the shift rounds to the pixel
        // whose centre is at or right of the crossing.
        let x_biased = ((POWER_2_TO_32 * x_intercept) as i64).saturating_add(0x7fff_ffff);
        let slope_fixed = (POWER_2_TO_32 * slope) as i64;
        let record = Self {
            curx_or: ((x_biased >> 31) as i32 & ALL_BUT_LSB) | orientation as i32,
            error: ((x_biased as i32 as u32) >> 1) as i32,
            bump_x: (slope_fixed >> 31) as i32 & ALL_BUT_LSB,
            bump_err: ((slope_fixed as i32 as u32) >> 1) as i32,
            next: NO_EDGE,
            y_max: last,
        };
        Some((first, record))
    }

    /// Read a field by name.
    #[inline]
    pub fn field(&self, field: EdgeField) -> i32 {
        bytemuck::cast_ref::<Self, [i32; FIELD_COUNT]>(self)[field.index()]
    }

    /// Write a field by name.
    #[inline]
    pub fn set_field(&mut self, field: EdgeField, value: i32) {
        bytemuck::cast_mut::<Self, [i32; FIELD_COUNT]>(self)[field.index()] = value;
    }

    /// Step `curx_or`/`error` by one scanline.
    ///
    /// A carry out of the 31-bit error accumulator moves x one more pixel to
    /// the right. Orientation is preserved because `bump_x` never has the low
    /// bit set.
    #[inline]
    pub(crate) fn stepped(curx_or: i32, error: i32, bump_x: i32, bump_err: i32) -> (i32, i32) {
        let err = error.wrapping_add(bump_err);
        // `err` is negative exactly when the addition carried into bit 31.
        let carry = (err >> 30) & ALL_BUT_LSB;
        let curx_or = curx_or.wrapping_add(bump_x).wrapping_sub(carry);
        (curx_or, err & ERR_STEP_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(mut record: EdgeRecord, steps: usize) -> Vec<i32> {
        let mut xs = Vec::with_capacity(steps);
        for _ in 0..steps {
            xs.push(record.curx_or >> 1);
            let (curx_or, error) = EdgeRecord::stepped(
                record.curx_or,
                record.error,
                record.bump_x,
                record.bump_err,
            );
            record.curx_or = curx_or;
            record.error = error;
        }
        xs
    }

    #[test]
    fn field_offsets_match_layout() {
        let offsets: Vec<usize> = EdgeField::ALL.iter().map(|f| f.offset()).collect();
        assert_eq!(offsets, [0, 4, 8, 12, 16, 20]);
        assert_eq!(EDGE_SIZE, 24);
    }

    #[test]
    fn named_fields_alias_layout() {
        let mut record = EdgeRecord::zeroed();
        for (i, field) in EdgeField::ALL.into_iter().enumerate() {
            record.set_field(field, i as i32 + 10);
        }
        assert_eq!(
            record,
            EdgeRecord {
                curx_or: 10,
                error: 11,
                bump_x: 12,
                bump_err: 13,
                next: 14,
                y_max: 15,
            }
        );
        let bytes = bytemuck::bytes_of(&record);
        assert_eq!(&bytes[16..20], &14_i32.to_ne_bytes());
    }

    #[test]
    fn vertical_segment() {
        let (first, record) = EdgeRecord::from_segment(10.0, 0.0, 10.0, 5.0, 0..100).unwrap();
        assert_eq!(first, 0);
        assert_eq!(record.y_max, 5);
        assert_eq!(record.curx_or & 1, Orientation::Increasing as i32);
        assert_eq!(walk(record, 5), [10, 10, 10, 10, 10]);
    }

    #[test]
    fn diagonal_segments_follow_pixel_centres() {
        // x = y: crossings at y + 0.5 round to the pixel at or right of them.
        let (_, record) = EdgeRecord::from_segment(0.0, 0.0, 10.0, 10.0, 0..100).unwrap();
        assert_eq!(walk(record, 4), [0, 1, 2, 3]);

        // x = y / 2: 0.25, 0.75, 1.25, 1.75, 2.25 -> ceil(x - 0.5)
        let (_, record) = EdgeRecord::from_segment(0.0, 0.0, 10.0, 20.0, 0..100).unwrap();
        assert_eq!(walk(record, 5), [0, 1, 1, 2, 2]);

        // x = 10 - y / 2, going left.
        let (_, record) = EdgeRecord::from_segment(10.0, 0.0, 0.0, 20.0, 0..100).unwrap();
        assert_eq!(walk(record, 4), [10, 9, 9, 8]);
    }

    #[test]
    fn upward_segment_is_reoriented() {
        let (first, record) = EdgeRecord::from_segment(3.0, 8.0, 3.0, 2.0, 0..100).unwrap();
        assert_eq!(first, 2);
        assert_eq!(record.y_max, 8);
        assert_eq!(record.curx_or & 1, Orientation::Decreasing as i32);
        assert_eq!(record.curx_or >> 1, 3);
    }

    #[test]
    fn degenerate_and_clipped_segments() {
        assert!(EdgeRecord::from_segment(0.0, 4.0, 9.0, 4.0, 0..100).is_none());
        // Between two scanline centres.
        assert!(EdgeRecord::from_segment(0.0, 4.6, 1.0, 5.4, 0..100).is_none());
        assert!(EdgeRecord::from_segment(0.0, 0.0, 0.0, 10.0, 20..30).is_none());

        let (first, record) = EdgeRecord::from_segment(0.0, 0.0, 0.0, 10.0, 3..6).unwrap();
        assert_eq!((first, record.y_max), (3, 6));
    }

    #[test]
    fn far_off_screen_crossings_are_clamped() {
        let (_, record) = EdgeRecord::from_segment(3.0e9, 0.0, 3.0e9, 4.0, 0..10).unwrap();
        assert_eq!(record.curx_or >> 1, MAX_PIXEL as i32);
        assert_eq!(record.bump_x, 0);

        let (_, record) = EdgeRecord::from_segment(-3.0e9, 0.0, -3.0e9, 4.0, 0..10).unwrap();
        assert_eq!(record.curx_or >> 1, -(MAX_PIXEL as i32));

        assert!(EdgeRecord::from_segment(f64::INFINITY, 0.0, 0.0, 4.0, 0..10).is_none());
        assert!(EdgeRecord::from_segment(0.0, f64::NAN, 0.0, 4.0, 0..10).is_none());

        // A nearly horizontal segment has a slope past the pixel range.
        let (_, record) = EdgeRecord::from_segment(0.0, 0.0, 4.0e9, 0.501, 0..10).unwrap();
        assert_eq!(record.bump_x >> 1, MAX_PIXEL as i32);
        assert_eq!(walk(record, 1), [MAX_PIXEL as i32]);
    }
}
