// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::HashSet;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Flat vector backend with linear scans.
///
/// Every query visits every marker, which is fine for a handful of markers
/// and makes this backend the oracle the tree backend is tested against.
#[derive(Clone)]
pub struct FlatVec<T: Copy + PartialOrd + Debug> {
    centers: Vec<Option<(T, T)>>,
}

impl<T: Copy + PartialOrd + Debug> Default for FlatVec<T> {
    fn default() -> Self {
        Self {
            centers: Vec::new(),
        }
    }
}

impl<T: Copy + PartialOrd + Debug> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.centers.len();
        let alive = self.centers.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, x: T, y: T) {
        if self.centers.len() <= slot {
            self.centers.resize_with(slot + 1, || None);
        }
        self.centers[slot] = Some((x, y));
    }

    fn update(&mut self, slot: usize, x: T, y: T) {
        if let Some(e) = self.centers.get_mut(slot) {
            *e = Some((x, y));
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.centers.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.centers.clear();
    }

    fn query_overlaps(
        &self,
        slot: usize,
        rect: Aabb2D<T>,
        rect_of: &mut dyn FnMut(usize) -> Option<Aabb2D<T>>,
        exclude: &HashSet<usize>,
        out: &mut Vec<usize>,
    ) {
        for (i, center) in self.centers.iter().enumerate() {
            if center.is_none() || i == slot || exclude.contains(&i) {
                continue;
            }
            if let Some(r) = rect_of(i)
                && rect.overlaps(&r)
            {
                out.push(i);
            }
        }
    }

    fn each_slot(&self, f: &mut dyn FnMut(usize)) {
        for (i, center) in self.centers.iter().enumerate() {
            if center.is_some() {
                f(i);
            }
        }
    }
}
