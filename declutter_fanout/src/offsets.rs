// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breadth-first offset assignment over overlap components.

use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

use declutter_index::{Intersections, MarkerKey, OverlapGraph};

/// One marker's fan-out outcome.
///
/// `offset: None` means the marker stands alone and any leftover visual
/// shift must be cleared; `Some(i)` ranks it within its overlap component.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OffsetChange<K> {
    /// The marker the outcome applies to.
    pub key: K,
    /// Rank within the overlap component, or `None` to clear.
    pub offset: Option<u32>,
}

/// Assign fan-out offsets for every component touched by a check pass.
///
/// Components are walked breadth-first so offset magnitude roughly tracks
/// graph distance from the traversal root and the cluster fans out instead
/// of leapfrogging. Each walk starts at the lowest remaining affected key,
/// which makes the assigned values reproducible for a given graph. Members
/// reached through edges but absent from `affected` are part of the pile-up
/// and receive offsets too.
///
/// A component of size one yields `None` for its sole marker: a lone marker
/// must not shift.
///
/// # Example
///
/// ```
/// use declutter_fanout::{assign_offsets, OffsetChange};
/// use declutter_index::OverlapGraph;
///
/// let mut graph: OverlapGraph<u32> = OverlapGraph::new();
/// graph.add_edge(1, 2);
/// graph.add_vertex(9);
///
/// let changes = assign_offsets([1, 2, 9], &graph);
/// assert_eq!(
///     changes,
///     vec![
///         OffsetChange { key: 1, offset: Some(0) },
///         OffsetChange { key: 2, offset: Some(1) },
///         OffsetChange { key: 9, offset: None },
///     ],
/// );
/// ```
pub fn assign_offsets<K, I>(affected: I, graph: &OverlapGraph<K>) -> Vec<OffsetChange<K>>
where
    K: Copy + Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    let mut remaining: BTreeSet<K> = affected.into_iter().collect();
    let mut out: Vec<OffsetChange<K>> = Vec::new();
    let mut queue: VecDeque<K> = VecDeque::new();
    let mut visited: HashSet<K> = HashSet::new();

    while let Some(root) = remaining.first().copied() {
        visited.clear();
        queue.clear();
        queue.push_back(root);
        visited.insert(root);

        let component_start = out.len();
        let mut index: u32 = 0;
        while let Some(key) = queue.pop_front() {
            remaining.remove(&key);
            out.push(OffsetChange {
                key,
                offset: Some(index),
            });
            index += 1;
            for &next in graph.neighbors(key) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        if index <= 1 {
            out[component_start].offset = None;
        }
    }
    out
}

/// Assign offsets straight from a check-pass result.
pub fn assign_marker_offsets<P>(result: &Intersections<P>) -> Vec<OffsetChange<MarkerKey>> {
    assign_offsets(result.affected_keys(), &result.graph)
}
