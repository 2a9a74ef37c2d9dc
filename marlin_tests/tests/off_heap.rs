// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use marlin_edges::{
    Edge, EdgeArena, EdgeField, EdgeRecord, Error, OffHeapArray, EDGE_SIZE, NO_EDGE,
};

fn arena() -> EdgeArena {
    marlin_tests::init_logging();
    EdgeArena::new(1 << 20).unwrap()
}

/// A record whose fields can be told apart per index and per field.
fn marked(index: usize) -> EdgeRecord {
    let base = index as i32 * 8;
    EdgeRecord {
        curx_or: base,
        error: base + 1,
        bump_x: -(base + 2),
        bump_err: base + 3,
        next: base + 4,
        y_max: base + 5,
    }
}

#[test]
fn fill_then_zero() {
    let arena = arena();
    let mut buffer = OffHeapArray::allocate(&arena, 4).unwrap();
    let edge = EdgeRecord {
        curx_or: 100,
        error: 0,
        bump_x: 1,
        bump_err: 0,
        next: NO_EDGE,
        y_max: 50,
    };
    buffer.set_record(0, edge);
    {
        let view = buffer.edge(0);
        assert_eq!(view.curx_or(), 100);
        assert_eq!(view.error(), 0);
        assert_eq!(view.bump_x(), 1);
        assert_eq!(view.bump_err(), 0);
        assert_eq!(view.next(), -1);
        assert_eq!(view.y_max(), 50);
    }
    buffer.fill(0);
    for field in EdgeField::ALL {
        assert_eq!(buffer.get(0, field), 0, "{field:?}");
    }
}

#[test]
fn every_field_round_trips() {
    let arena = arena();
    for count in [1, 2, 7, 64, 301] {
        let mut buffer = OffHeapArray::allocate(&arena, count).unwrap();
        for index in 0..count {
            for field in EdgeField::ALL {
                buffer.set(index, field, marked(index).field(field));
            }
        }
        for index in 0..count {
            assert_eq!(buffer.record(index), marked(index), "count {count}");
        }
        assert_eq!(buffer.as_bytes().len(), count * EDGE_SIZE);
    }
    assert_eq!(arena.live_allocations(), 0);
}

#[test]
fn lifecycle_sequences_end_in_idempotent_free() {
    let arena = arena();
    for (first, second) in [(4, 16), (16, 4), (8, 8), (0, 5), (5, 0)] {
        let mut buffer = OffHeapArray::allocate(&arena, first).unwrap();
        buffer.fill(0x5a);
        buffer.resize(second).unwrap();
        buffer.fill(0);
        buffer.free();
        buffer.free();
        assert!(buffer.is_freed());
        drop(buffer);
    }
    assert_eq!(arena.used_bytes(), 0);
    assert_eq!(arena.live_allocations(), 0);
}

#[test]
fn growth_preserves_prefix() {
    let arena = arena();
    let mut buffer = OffHeapArray::allocate(&arena, 10).unwrap();
    for index in 0..10 {
        buffer.set_record(index, marked(index));
    }
    // Keep a neighbour allocated so growth can't happen in place.
    let _neighbour = OffHeapArray::allocate(&arena, 1).unwrap();
    buffer.resize(100).unwrap();
    for index in 0..10 {
        assert_eq!(buffer.record(index), marked(index));
    }
    for index in 10..100 {
        assert_eq!(buffer.record(index), EdgeRecord::default());
    }
}

#[test]
fn shrink_truncates() {
    let arena = arena();
    let mut buffer = OffHeapArray::allocate(&arena, 10).unwrap();
    for index in 0..10 {
        buffer.set_record(index, marked(index));
    }
    buffer.resize(3).unwrap();
    assert_eq!(buffer.count(), 3);
    buffer.set_record(2, marked(7));
    assert_eq!(buffer.record(2), marked(7));
    assert_eq!(buffer.record(1), marked(1));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn writes_past_a_shrink_fail_loudly() {
    let arena = arena();
    let mut buffer = OffHeapArray::allocate(&arena, 10).unwrap();
    buffer.resize(3).unwrap();
    buffer.set(3, EdgeField::YMax, 1);
}

#[test]
fn arrays_own_their_memory() {
    let arena = arena();
    let mut a = OffHeapArray::allocate(&arena, 2).unwrap();
    let mut b = OffHeapArray::allocate(&arena, 2).unwrap();
    a.edge(1).set_record(&marked(1));
    b.edge(1).set_record(&marked(2));
    a.fill(0);
    assert_eq!(a.record(1), EdgeRecord::default());
    assert_eq!(b.record(1), marked(2));
}

#[test]
fn exhaustion_is_reported() {
    marlin_tests::init_logging();
    let arena = EdgeArena::new(10 * EDGE_SIZE).unwrap();
    let mut buffer = OffHeapArray::allocate(&arena, 8).unwrap();
    buffer.set_record(0, marked(3));
    let err = buffer.resize(20).unwrap_err();
    assert!(matches!(err, Error::OutOfMemory { .. }), "{err}");
    assert_eq!(buffer.count(), 8);
    assert_eq!(buffer.record(0), marked(3));
}
