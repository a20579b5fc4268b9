// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `IntersectIndex` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::{HashMap, HashSet};

use crate::backend::Backend;
use crate::graph::OverlapGraph;
use crate::types::{Aabb2D, MarkerFlags};

/// Generational handle for markers.
///
/// Slot indices are reused after removal, so a key is only valid while its
/// generation matches. The derived ordering (slot first, then generation)
/// doubles as the canonical marker order used to pick traversal roots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey(u32, u32);

impl MarkerKey {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Marker keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    pub(crate) const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Source of the current on-screen bounding box per marker.
///
/// Icon extents change with every animation frame and every zoom, so the
/// index never stores them; it asks this source during a check pass and
/// caches each answer for the duration of that pass. Return `None` for a
/// marker whose icon has not been laid out yet: it takes part in the pass
/// as an edgeless vertex but never overlaps anything.
///
/// Any `Fn(MarkerKey) -> Option<Aabb2D<T>>` closure is a `RectSource`.
pub trait RectSource<T> {
    /// The marker's current icon bounding box, if rendered.
    fn rect(&self, key: MarkerKey) -> Option<Aabb2D<T>>;
}

impl<T, F> RectSource<T> for F
where
    F: Fn(MarkerKey) -> Option<Aabb2D<T>>,
{
    fn rect(&self, key: MarkerKey) -> Option<Aabb2D<T>> {
        self(key)
    }
}

/// Outcome of a check pass: the queried markers and their overlap graph.
#[derive(Clone, Debug)]
pub struct Intersections<P> {
    /// The live, visible markers the pass was asked about, with payloads.
    /// Each appears in the graph, possibly without edges.
    pub affected: Vec<(MarkerKey, P)>,
    /// Pairwise overlaps discovered by the pass. May contain partners that
    /// were not queried themselves.
    pub graph: OverlapGraph<MarkerKey>,
}

impl<P> Intersections<P> {
    /// True if the pass touched no live markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }

    /// The affected keys, in query order.
    pub fn affected_keys(&self) -> impl Iterator<Item = MarkerKey> + '_ {
        self.affected.iter().map(|&(key, _)| key)
    }
}

#[derive(Clone, Debug)]
struct Entry<T, P> {
    x: T,
    y: T,
    payload: P,
    flags: MarkerFlags,
}

/// A marker overlap index parameterized by a spatial backend.
///
/// Markers are keyed by the center coordinates captured at insert/update
/// time; [`update`](Self::update) must be called whenever a marker moves so
/// both axis orderings see the new snapshot.
#[derive(Debug)]
pub struct IntersectIndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T>> {
    entries: Vec<Option<Entry<T, P>>>,
    /// Per-slot generation, bumped on every reuse. Never reset while the
    /// slot lives so stale keys cannot alias a later occupant.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    backend: B,
}

impl<T, P, B> IntersectIndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            backend: B::default(),
        }
    }
}

impl<T, P, B> Default for IntersectIndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IntersectIndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Reserve space for at least `n` markers.
    pub fn reserve(&mut self, n: usize) {
        self.entries.reserve(n);
    }

    /// Insert a marker at the given center with default flags.
    pub fn insert(&mut self, x: T, y: T, payload: P) -> MarkerKey {
        self.insert_with_flags(x, y, payload, MarkerFlags::default())
    }

    /// Insert a marker at the given center. Returns a stable handle.
    pub fn insert_with_flags(
        &mut self,
        x: T,
        y: T,
        payload: P,
        flags: MarkerFlags,
    ) -> MarkerKey {
        let slot = if let Some(slot) = self.free_list.pop() {
            slot
        } else {
            self.entries.push(None);
            self.generations.push(0);
            self.entries.len() - 1
        };
        let generation = self.generations[slot] + 1;
        self.generations[slot] = generation;
        self.entries[slot] = Some(Entry {
            x,
            y,
            payload,
            flags,
        });
        self.backend.insert(slot, x, y);
        MarkerKey::new(slot, generation)
    }

    /// Re-key a marker with new center coordinates.
    ///
    /// Required whenever a marker moves: the axis orderings are built from
    /// the snapshot taken here, not from a live reference. Stale keys are
    /// ignored.
    pub fn update(&mut self, key: MarkerKey, x: T, y: T) {
        let Some(e) = self.entry_mut(key) else {
            return;
        };
        e.x = x;
        e.y = y;
        self.backend.update(key.idx(), x, y);
    }

    /// Remove a marker. Stale keys are ignored.
    pub fn remove(&mut self, key: MarkerKey) {
        if self.live_entry(key).is_none() {
            return;
        }
        let slot = key.idx();
        self.entries[slot] = None;
        self.free_list.push(slot);
        self.backend.remove(slot);
    }

    /// Remove every marker. Outstanding keys become invalid.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Replace a marker's flags. Stale keys are ignored.
    pub fn set_flags(&mut self, key: MarkerKey, flags: MarkerFlags) {
        if let Some(e) = self.entry_mut(key) {
            e.flags = flags;
        }
    }

    /// The marker's flags, if the key is live.
    pub fn flags(&self, key: MarkerKey) -> Option<MarkerFlags> {
        self.live_entry(key).map(|e| e.flags)
    }

    /// The marker's payload, if the key is live.
    pub fn payload(&self, key: MarkerKey) -> Option<P> {
        self.live_entry(key).map(|e| e.payload)
    }

    /// The marker's snapshot center, if the key is live.
    pub fn position(&self, key: MarkerKey) -> Option<(T, T)> {
        self.live_entry(key).map(|e| (e.x, e.y))
    }

    /// Whether the key refers to a live marker.
    #[must_use]
    pub fn contains(&self, key: MarkerKey) -> bool {
        self.live_entry(key).is_some()
    }

    /// Number of live markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// True if the index holds no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the keys of all live markers, in slot order.
    pub fn keys(&self) -> impl Iterator<Item = MarkerKey> + '_ {
        self.entries.iter().enumerate().filter_map(|(slot, e)| {
            e.as_ref()
                .map(|_| MarkerKey::new(slot, self.generations[slot]))
        })
    }

    /// Run an overlap check seeded from the given markers.
    ///
    /// For each queried marker the backend narrows candidates along x, then
    /// along y restricted to the x survivors, so an edge appears exactly
    /// when two rendered boxes intersect on both axes. Markers already
    /// handled earlier in the same pass are excluded, which reports each
    /// pair once; the resulting graph is the same edge set no matter how
    /// the input is ordered.
    ///
    /// Stale keys, hidden markers, and duplicate input keys are skipped.
    /// Each queried live marker lands in [`Intersections::affected`] and in
    /// the graph even when it overlaps nothing, so callers can clear its
    /// fan-out offset.
    pub fn check<I>(&self, keys: I, rects: &impl RectSource<T>) -> Intersections<P>
    where
        I: IntoIterator<Item = MarkerKey>,
    {
        let mut traversed: HashSet<usize> = HashSet::new();
        let mut cache: HashMap<usize, Option<Aabb2D<T>>> = HashMap::new();
        let mut found: Vec<usize> = Vec::new();
        let mut affected: Vec<(MarkerKey, P)> = Vec::new();
        let mut graph: OverlapGraph<MarkerKey> = OverlapGraph::new();

        for key in keys {
            let Some(entry) = self.live_entry(key) else {
                continue;
            };
            if !entry.flags.contains(MarkerFlags::VISIBLE) {
                continue;
            }
            let slot = key.idx();
            if !traversed.insert(slot) {
                continue;
            }
            affected.push((key, entry.payload));
            graph.add_vertex(key);

            let entries = &self.entries;
            let generations = &self.generations;
            let mut rect_of = |s: usize| -> Option<Aabb2D<T>> {
                *cache.entry(s).or_insert_with(|| match entries.get(s) {
                    Some(Some(e)) if e.flags.contains(MarkerFlags::VISIBLE) => {
                        rects.rect(MarkerKey::new(s, generations[s]))
                    }
                    _ => None,
                })
            };
            let Some(rect) = rect_of(slot) else {
                // Not rendered yet: stays an edgeless vertex.
                continue;
            };
            found.clear();
            self.backend
                .query_overlaps(slot, rect, &mut rect_of, &traversed, &mut found);
            for &s in &found {
                graph.add_edge(key, MarkerKey::new(s, self.generations[s]));
            }
        }

        Intersections { affected, graph }
    }

    /// Run an overlap check seeded from every live marker.
    ///
    /// Used after a zoom change, when every icon extent is suspect.
    pub fn check_all(&self, rects: &impl RectSource<T>) -> Intersections<P> {
        let mut keys: Vec<MarkerKey> = Vec::new();
        let generations = &self.generations;
        self.backend
            .each_slot(&mut |slot| keys.push(MarkerKey::new(slot, generations[slot])));
        self.check(keys, rects)
    }

    fn live_entry(&self, key: MarkerKey) -> Option<&Entry<T, P>> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        if self.generations[key.idx()] != key.1 {
            return None;
        }
        Some(e)
    }

    fn entry_mut(&mut self, key: MarkerKey) -> Option<&mut Entry<T, P>> {
        if self.generations.get(key.idx()) != Some(&key.1) {
            return None;
        }
        self.entries.get_mut(key.idx())?.as_mut()
    }
}

/// Default index using the dual ordered-tree backend.
pub type IntersectIndex<T, P> =
    IntersectIndexGeneric<T, P, crate::backends::dual_tree::DualTree<T>>;

/// Index variant using the linear-scan backend.
pub type FlatIndex<T, P> = IntersectIndexGeneric<T, P, crate::backends::flatvec::FlatVec<T>>;
