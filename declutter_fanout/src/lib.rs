// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declutter Fanout: turn overlap graphs into per-marker shift ranks.
//!
//! A check pass reports *which* markers pile up; this crate decides *how*
//! they spread. Every connected component of the overlap graph is walked
//! breadth-first and its members receive sequential offsets 0, 1, 2, and so
//! on; the rendering layer multiplies the offset by its shift unit to fan
//! the icons out. Markers that ended up alone get their offset cleared
//! instead, so a dissolving cluster snaps back into place.
//!
//! The walk is deterministic: roots are chosen in key order and neighbor
//! order follows the graph's edge-insertion order, so a given pass always
//! produces the same assignment.
//!
//! # Example
//!
//! ```
//! use declutter_fanout::assign_marker_offsets;
//! use declutter_index::{Aabb2D, IntersectIndex, MarkerKey};
//!
//! let mut idx: IntersectIndex<f64, u32> = IntersectIndex::new();
//! let a = idx.insert(0.0, 0.0, 1);
//! let b = idx.insert(5.0, 5.0, 2);
//! let c = idx.insert(100.0, 100.0, 3);
//!
//! let rects = |key: MarkerKey| {
//!     idx.position(key)
//!         .map(|(x, y)| Aabb2D::<f64>::from_xywh(x - 5.0, y - 5.0, 10.0, 10.0))
//! };
//! let result = idx.check_all(&rects);
//! let changes = assign_marker_offsets(&result);
//!
//! // A and B fan out; C stands alone and clears.
//! let offset = |k| changes.iter().find(|c| c.key == k).unwrap().offset;
//! assert_eq!(offset(a), Some(0));
//! assert_eq!(offset(b), Some(1));
//! assert_eq!(offset(c), None);
//! ```

#![no_std]

extern crate alloc;

pub mod offsets;

pub use offsets::{OffsetChange, assign_marker_offsets, assign_offsets};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use declutter_index::{Aabb2D, IntersectIndex, MarkerKey};
    use hashbrown::HashMap;

    fn icon(x: f64, y: f64) -> Aabb2D<f64> {
        Aabb2D::<f64>::from_xywh(x - 5.0, y - 5.0, 10.0, 10.0)
    }

    fn offsets_by_key(changes: &[OffsetChange<MarkerKey>]) -> HashMap<MarkerKey, Option<u32>> {
        changes.iter().map(|c| (c.key, c.offset)).collect()
    }

    fn centered(idx: &IntersectIndex<f64, u32>) -> impl declutter_index::RectSource<f64> + '_ {
        |key: MarkerKey| idx.position(key).map(|(x, y)| icon(x, y))
    }

    // The canonical scenario: two clustered markers fan out, the straggler
    // stays put; then the straggler moves in and the cluster becomes a
    // triangle.
    #[test]
    fn cluster_grows_when_a_marker_moves_in() {
        let mut idx: IntersectIndex<f64, u32> = IntersectIndex::new();
        let a = idx.insert(0.0, 0.0, 1);
        let b = idx.insert(5.0, 5.0, 2);
        let c = idx.insert(100.0, 100.0, 3);

        let changes = assign_marker_offsets(&idx.check_all(&centered(&idx)));
        let by_key = offsets_by_key(&changes);
        assert_eq!(by_key[&a], Some(0));
        assert_eq!(by_key[&b], Some(1));
        assert_eq!(by_key[&c], None);

        idx.update(c, 2.0, 2.0);
        let result = idx.check_all(&centered(&idx));
        assert!(result.graph.contains_edge(a, b));
        assert!(result.graph.contains_edge(a, c));
        assert!(result.graph.contains_edge(b, c));

        let changes = assign_marker_offsets(&result);
        let mut assigned: Vec<u32> = changes.iter().filter_map(|ch| ch.offset).collect();
        assigned.sort_unstable();
        assert_eq!(assigned, alloc::vec![0, 1, 2]);
    }

    #[test]
    fn previously_offset_marker_clears_once_alone() {
        let mut idx: IntersectIndex<f64, u32> = IntersectIndex::new();
        let a = idx.insert(0.0, 0.0, 1);
        let b = idx.insert(5.0, 5.0, 2);

        let changes = assign_marker_offsets(&idx.check_all(&centered(&idx)));
        assert!(offsets_by_key(&changes)[&b].is_some());

        // B sails away; the pass that covers both must clear both.
        idx.update(b, 200.0, 200.0);
        let changes = assign_marker_offsets(&idx.check([a, b], &centered(&idx)));
        let by_key = offsets_by_key(&changes);
        assert_eq!(by_key[&a], None);
        assert_eq!(by_key[&b], None);
    }

    #[test]
    fn empty_pass_yields_no_changes() {
        let idx: IntersectIndex<f64, u32> = IntersectIndex::new();
        let result = idx.check_all(&|_key: MarkerKey| None::<Aabb2D<f64>>);
        assert!(assign_marker_offsets(&result).is_empty());
    }
}
