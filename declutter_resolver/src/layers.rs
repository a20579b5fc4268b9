// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer registry keyed by an explicit enum.
//!
//! Each marker family lives on its own layer with its own resolver, so
//! overlaps are only resolved within a family. The enum makes layer dispatch
//! exhaustive at compile time; there is no string-keyed lookup to typo.

use core::fmt::Debug;

use declutter_index::{Aabb2D, Backend, DualTree, MarkerKey};

use crate::resolver::Resolver;

/// The marker families a map renders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Moving ships, animated along their cruise tracks.
    Ships,
    /// Cruise stops.
    Stops,
    /// Sights near the route.
    Sights,
    /// Port gateways.
    Gateways,
}

impl LayerKind {
    /// Number of layers.
    pub const COUNT: usize = 4;

    /// All layers, in rendering order.
    pub const ALL: [Self; Self::COUNT] = [Self::Ships, Self::Stops, Self::Sights, Self::Gateways];

    const fn index(self) -> usize {
        self as usize
    }
}

/// One resolver per [`LayerKind`], addressed through the enum.
#[derive(Debug)]
pub struct LayerSet<T, P, B = DualTree<T>>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Debug,
{
    layers: [Resolver<T, P, B>; LayerKind::COUNT],
}

impl<T, P, B> Default for LayerSet<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Debug + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> LayerSet<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Debug + Default,
{
    /// Create a set of empty layers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: core::array::from_fn(|_| Resolver::new()),
        }
    }
}

impl<T, P, B> LayerSet<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Debug,
{
    /// The resolver for a layer.
    pub fn layer(&self, kind: LayerKind) -> &Resolver<T, P, B> {
        &self.layers[kind.index()]
    }

    /// The resolver for a layer, mutably.
    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Resolver<T, P, B> {
        &mut self.layers[kind.index()]
    }

    /// React to a zoom change: every layer schedules a full pass.
    pub fn zoom_changed(&mut self) {
        for layer in &mut self.layers {
            layer.zoom_changed();
        }
    }

    /// True when any layer has a pass scheduled.
    #[must_use]
    pub fn needs_commit(&self) -> bool {
        self.layers.iter().any(Resolver::needs_commit)
    }

    /// Commit every layer.
    ///
    /// Marker keys are only unique within a layer, so the rect lookup is
    /// keyed by layer and marker.
    pub fn commit<F>(&mut self, rects: &F)
    where
        F: Fn(LayerKind, MarkerKey) -> Option<Aabb2D<T>>,
    {
        for (kind, layer) in LayerKind::ALL.into_iter().zip(self.layers.iter_mut()) {
            let source = |key: MarkerKey| rects(kind, key);
            layer.commit(&source);
        }
    }

    /// Iterate over layers in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &Resolver<T, P, B>)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter())
    }

    /// Iterate over layers in rendering order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LayerKind, &mut Resolver<T, P, B>)> {
        LayerKind::ALL.into_iter().zip(self.layers.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declutter_index::{Aabb2D, MarkerKey};

    #[test]
    fn every_kind_maps_to_a_distinct_slot() {
        for (i, kind) in LayerKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn layers_are_independent() {
        let mut set: LayerSet<f64, u32> = LayerSet::new();
        let ship = set.layer_mut(LayerKind::Ships).add(0.0, 0.0, 1);
        // A stop at the same screen position lives on another layer and
        // never overlaps the ship.
        let stop = set.layer_mut(LayerKind::Stops).add(0.0, 0.0, 2);

        let rects =
            |_key: MarkerKey| Some(Aabb2D::<f64>::from_xywh(-5.0, -5.0, 10.0, 10.0));
        let ships = set.layer(LayerKind::Ships).index().check_all(&rects);
        assert_eq!(ships.affected.len(), 1);
        assert!(ships.graph.neighbors(ship).is_empty());
        let _ = stop;
    }

    #[test]
    fn zoom_marks_every_layer() {
        let mut set: LayerSet<f64, u32> = LayerSet::new();
        assert!(!set.needs_commit());
        set.zoom_changed();
        for (_kind, layer) in set.iter() {
            assert!(layer.needs_commit());
        }
        set.commit(&|_kind: LayerKind, _key: MarkerKey| None::<Aabb2D<f64>>);
        assert!(!set.needs_commit());
    }
}
