// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial overlap-search implementations.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashSet;

use crate::types::Aabb2D;

/// Spatial backend abstraction used by `IntersectIndexGeneric`.
///
/// A backend tracks the snapshot center coordinates of each occupied slot and
/// answers "which other slots' rendered boxes overlap this box". Rects are
/// looked up lazily through `rect_of` because icon extents change every frame;
/// only the center coordinates are keyed into the backend's structure.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Insert a new slot keyed by its snapshot center.
    fn insert(&mut self, slot: usize, x: T, y: T);

    /// Re-key an existing slot with a new snapshot center.
    fn update(&mut self, slot: usize, x: T, y: T);

    /// Remove a slot.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Collect slots whose current rect overlaps `rect` into `out`.
    ///
    /// `slot` itself and members of `exclude` never match. `rect_of` returns
    /// the current rect for a slot, or `None` for markers that have no
    /// rendered extent yet; such markers never match either.
    fn query_overlaps(
        &self,
        slot: usize,
        rect: Aabb2D<T>,
        rect_of: &mut dyn FnMut(usize) -> Option<Aabb2D<T>>,
        exclude: &HashSet<usize>,
        out: &mut Vec<usize>,
    );

    /// Visit every occupied slot, in the backend's traversal order.
    fn each_slot(&self, f: &mut dyn FnMut(usize));
}
