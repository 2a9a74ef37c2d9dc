// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use marlin_edges::{Edge, EdgeRecord, StorageMode, NO_EDGE};
use marlin_tests::{context, scan_polygon, spans, Crossing};

const MODES: [StorageMode; 2] = [StorageMode::Heap, StorageMode::OffHeap];

#[test]
fn clear_then_add_shows_only_new_edges() {
    for mode in MODES {
        let mut ctx = context(mode, 4).unwrap();
        let edges = ctx.begin_frame();
        let stale: Vec<_> = (0..10)
            .map(|i| {
                edges
                    .add(EdgeRecord {
                        y_max: 1000 + i,
                        ..EdgeRecord::default()
                    })
                    .unwrap()
            })
            .collect();
        edges.clear();
        for i in 0..6 {
            edges
                .add(EdgeRecord {
                    y_max: i,
                    next: NO_EDGE,
                    ..EdgeRecord::default()
                })
                .unwrap();
        }
        assert_eq!(edges.len(), 6, "{mode:?}");
        let mut y_maxes: Vec<i32> = edges.iter().map(|(_, record)| record.y_max).collect();
        y_maxes.sort_unstable();
        assert_eq!(y_maxes, [0, 1, 2, 3, 4, 5]);
        assert!(stale.iter().all(|id| edges.get(*id).is_none()));
    }
}

#[test]
fn triangle_spans() {
    for mode in MODES {
        let mut ctx = context(mode, 2).unwrap();
        let rows = scan_polygon(
            ctx.begin_frame(),
            &[(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)],
            0..10,
        )
        .unwrap();
        for (y, row) in rows.iter().enumerate() {
            let y = y as i32;
            if y < 7 {
                assert_eq!(spans(row), [0..7 - y], "{mode:?} row {y}");
            } else {
                assert!(spans(row).is_empty(), "{mode:?} row {y}");
            }
        }
        assert_eq!(
            rows[2],
            [
                Crossing { x: 0, winding: -1 },
                Crossing { x: 5, winding: 1 }
            ]
        );
        assert!(ctx.edges().is_empty(), "all edges retire by the last row");
    }
}

#[test]
fn clipping_limits_rows() {
    let mut ctx = context(StorageMode::OffHeap, 8).unwrap();
    let rows = scan_polygon(
        ctx.begin_frame(),
        &[(1.0, -5.0), (9.0, -5.0), (9.0, 50.0), (1.0, 50.0)],
        0..4,
    )
    .unwrap();
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(spans(row), [1..9]);
    }
}

#[test]
fn storage_modes_agree_on_a_star() {
    // A five-pointed star drawn as one self-intersecting path.
    let points: Vec<(f64, f64)> = (0..5)
        .map(|i| {
            let angle = f64::from(i * 2) * core::f64::consts::TAU / 5.0;
            (50.0 + 40.0 * angle.sin(), 50.0 - 40.0 * angle.cos())
        })
        .collect();
    let mut results = Vec::new();
    for mode in MODES {
        // Start small so the off-heap table has to grow mid-frame.
        let mut ctx = context(mode, 1).unwrap();
        results.push(scan_polygon(ctx.begin_frame(), &points, 0..100).unwrap());
    }
    assert_eq!(results[0], results[1]);
    // Under the non-zero rule the centre of the star is filled.
    let centre = &results[0][50];
    assert!(spans(centre).iter().any(|span| span.contains(&50)));
}

#[test]
fn frames_reuse_one_allocation() {
    let mut ctx = context(StorageMode::OffHeap, 16).unwrap();
    let square = [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)];
    let first = scan_polygon(ctx.begin_frame(), &square, 0..8).unwrap();
    let used = ctx.arena().used_bytes();
    for _ in 0..5 {
        let rows = scan_polygon(ctx.begin_frame(), &square, 0..8).unwrap();
        assert_eq!(rows, first);
    }
    assert_eq!(ctx.frames(), 6);
    assert_eq!(ctx.arena().used_bytes(), used);
    ctx.dispose();
    assert_eq!(ctx.arena().used_bytes(), 0);
}

#[test]
fn edges_advance_in_place() {
    for mode in MODES {
        let mut ctx = context(mode, 4).unwrap();
        let edges = ctx.begin_frame();
        let (first, record) = EdgeRecord::from_segment(0.0, 0.0, 4.0, 8.0, 0..8).unwrap();
        assert_eq!(first, 0);
        let id = edges.add(record).unwrap();
        let mut xs = Vec::new();
        for _ in 0..4 {
            let mut edge = edges.edge_mut(id).unwrap();
            xs.push(edge.x());
            edge.advance();
        }
        // Crossings at y = 0.5, 1.5, ... are x = 0.25, 0.75, 1.25, 1.75.
        assert_eq!(xs, [0, 1, 1, 2], "{mode:?}");
    }
}
