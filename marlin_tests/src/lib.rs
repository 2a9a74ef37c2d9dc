// Copyright 2026 the Marlin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers shared by the Marlin integration tests.

use std::ops::Range;
use std::sync::Arc;

use marlin_edges::{Edge, EdgeArray, EdgeRecord, RasterContext, RasterOptions, StorageMode, NO_EDGE};
use marlin_hal::{Device, SimBackend};

/// Install a test logger once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A raster context with room for `initial_edges` in the given mode.
pub fn context(storage: StorageMode, initial_edges: usize) -> anyhow::Result<RasterContext> {
    init_logging();
    Ok(RasterContext::new(RasterOptions {
        storage,
        initial_edges,
        arena_bytes: 1 << 20,
    })?)
}

/// A simulated backend and a device opened on it.
pub fn sim_device() -> anyhow::Result<(Arc<SimBackend>, Device)> {
    init_logging();
    let sim = Arc::new(SimBackend::new());
    let device = Device::create(sim.clone(), 0)?;
    Ok((sim, device))
}

/// One crossing of the active-edge list with a scanline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Crossing {
    pub x: i32,
    pub winding: i32,
}

/// Scan-convert a closed polygon through `edges` and return the crossings of
/// every scanline in `clip_y`, sorted by x.
///
/// This drives the active-edge list the way a scanline filler does: edges
/// join the list on their first scanline, are read in `next` order, and are
/// advanced (or retired) with [`EdgeArray::advance_chain`].
pub fn scan_polygon(
    edges: &mut EdgeArray,
    points: &[(f64, f64)],
    clip_y: Range<i32>,
) -> anyhow::Result<Vec<Vec<Crossing>>> {
    let mut pending: Vec<(i32, EdgeRecord)> = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .filter_map(|(&(x0, y0), &(x1, y1))| {
            EdgeRecord::from_segment(x0, y0, x1, y1, clip_y.clone())
        })
        .collect();
    // Latest first scanline at the front, so edges can be popped off the end.
    pending.sort_by_key(|(first, _)| std::cmp::Reverse(*first));

    let mut head = NO_EDGE;
    let mut rows = Vec::new();
    for y in clip_y {
        while let Some(&(first, record)) = pending.last() {
            if first > y {
                break;
            }
            pending.pop();
            let id = edges.add(EdgeRecord { next: head, ..record })?;
            head = id.link();
        }
        let mut row: Vec<Crossing> = edges
            .chain(head)
            .map(|(_, record)| Crossing {
                x: record.x(),
                winding: record.orientation().winding(),
            })
            .collect();
        row.sort();
        rows.push(row);
        head = edges.advance_chain(head, y + 1);
    }
    Ok(rows)
}

/// Covered pixel ranges of one scanline under the non-zero rule.
pub fn spans(row: &[Crossing]) -> Vec<Range<i32>> {
    let mut spans = Vec::new();
    let mut winding = 0;
    let mut start = 0;
    for crossing in row {
        let was_inside = winding != 0;
        winding += crossing.winding;
        match (was_inside, winding != 0) {
            (false, true) => start = crossing.x,
            (true, false) if crossing.x > start => spans.push(start..crossing.x),
            _ => {}
        }
    }
    spans
}
