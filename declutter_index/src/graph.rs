// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undirected overlap graph emitted by a check pass.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Undirected graph of pairwise marker overlaps.
///
/// Built fresh by every check pass and never persisted: an edge only exists
/// between markers whose rendered boxes intersected during that pass, and a
/// marker that was queried but overlapped nothing is kept as an edgeless
/// vertex so callers can clear its fan-out offset.
///
/// Vertices iterate in first-insertion order and each adjacency list keeps
/// edge-insertion order, so traversals over a given graph are deterministic.
/// Self-loops are rejected and duplicate edges are ignored.
///
/// # Example
///
/// ```
/// use declutter_index::OverlapGraph;
///
/// let mut g: OverlapGraph<u32> = OverlapGraph::new();
/// g.add_vertex(1);
/// assert!(g.add_edge(1, 2));
/// assert!(!g.add_edge(2, 1), "duplicate edge is ignored");
/// assert!(!g.add_edge(1, 1), "self-loop is rejected");
/// assert_eq!(g.neighbors(1), &[2]);
/// assert_eq!(g.edge_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct OverlapGraph<K>
where
    K: Copy + Eq + Hash,
{
    /// Vertices in first-insertion order.
    vertices: Vec<K>,
    /// Adjacency lists in edge-insertion order. Markers rarely overlap more
    /// than a handful of neighbors, hence the inline capacity.
    adjacency: HashMap<K, SmallVec<[K; 4]>>,
    edges: usize,
}

impl<K> Default for OverlapGraph<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> OverlapGraph<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            adjacency: HashMap::new(),
            edges: 0,
        }
    }

    /// Adds a vertex. Re-adding an existing vertex is a no-op.
    pub fn add_vertex(&mut self, vertex: K) {
        if !self.adjacency.contains_key(&vertex) {
            self.vertices.push(vertex);
            self.adjacency.insert(vertex, SmallVec::new());
        }
    }

    /// Adds an undirected edge, inserting missing vertices.
    ///
    /// Returns `false` (and changes nothing) for self-loops and edges that
    /// already exist.
    pub fn add_edge(&mut self, a: K, b: K) -> bool {
        if a == b {
            return false;
        }
        self.add_vertex(a);
        self.add_vertex(b);
        if self.adjacency[&a].contains(&b) {
            return false;
        }
        if let Some(list) = self.adjacency.get_mut(&a) {
            list.push(b);
        }
        if let Some(list) = self.adjacency.get_mut(&b) {
            list.push(a);
        }
        self.edges += 1;
        true
    }

    /// The neighbors of `vertex` in edge-insertion order.
    ///
    /// Unknown vertices have no neighbors.
    pub fn neighbors(&self, vertex: K) -> &[K] {
        self.adjacency
            .get(&vertex)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the graph contains `vertex`.
    #[must_use]
    pub fn contains_vertex(&self, vertex: K) -> bool {
        self.adjacency.contains_key(&vertex)
    }

    /// Whether an edge connects `a` and `b`.
    #[must_use]
    pub fn contains_edge(&self, a: K, b: K) -> bool {
        self.adjacency
            .get(&a)
            .is_some_and(|list| list.contains(&b))
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// True if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate over vertices in first-insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = K> + '_ {
        self.vertices.iter().copied()
    }
}

impl<K> OverlapGraph<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// The edge set as sorted, normalized `(low, high)` pairs.
    ///
    /// Independent of insertion order, which makes it the right shape for
    /// comparing the outcome of two passes.
    #[must_use]
    pub fn edge_set(&self) -> Vec<(K, K)> {
        let mut out = Vec::with_capacity(self.edges);
        for (&v, list) in &self.adjacency {
            for &n in list {
                if v < n {
                    out.push((v, n));
                }
            }
        }
        out.sort_unstable();
        out
    }
}
