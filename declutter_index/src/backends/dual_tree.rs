// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dual ordered-tree backend: the primary overlap-search strategy.
//!
//! Two balanced trees order the markers by snapshot center coordinate, one
//! per axis. An overlap query walks the x tree collecting markers whose
//! x-interval touches the query interval, then walks the y tree accepting
//! only the x survivors, which yields true rectangle intersection as the
//! conjunction of two interval-overlap tests.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use hashbrown::HashSet;

use crate::backend::Backend;
use crate::types::{Aabb2D, le};

/// Total order over `(coordinate, slot)` keys.
///
/// Markers may share an exact coordinate (ships docked at the same pier);
/// the slot tie-break keeps the tree ordering total and deterministic.
/// Incomparable coordinates (NaN) are not expected and fall back to the
/// slot order.
fn key_cmp<T: Copy + PartialOrd>(a_coord: T, a_slot: usize, b_coord: T, b_slot: usize) -> Ordering {
    match a_coord.partial_cmp(&b_coord) {
        Some(Ordering::Less) => Ordering::Less,
        Some(Ordering::Greater) => Ordering::Greater,
        _ => a_slot.cmp(&b_slot),
    }
}

#[derive(Clone, Debug)]
struct AxisNode<T> {
    coord: T,
    slot: usize,
    left: Option<u32>,
    right: Option<u32>,
    height: u8,
}

/// AVL tree over `(coordinate, slot)` keys, stored in an index arena.
#[derive(Clone, Debug)]
struct AxisTree<T> {
    nodes: Vec<AxisNode<T>>,
    free: Vec<u32>,
    root: Option<u32>,
    len: usize,
}

impl<T> Default for AxisTree<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }
}

impl<T: Copy + PartialOrd + Debug> AxisTree<T> {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Tree arenas are intentionally 32-bit indexed."
    )]
    fn alloc(&mut self, coord: T, slot: usize) -> u32 {
        self.len += 1;
        let node = AxisNode {
            coord,
            slot,
            left: None,
            right: None,
            height: 1,
        };
        if let Some(i) = self.free.pop() {
            self.nodes[i as usize] = node;
            i
        } else {
            self.nodes.push(node);
            (self.nodes.len() - 1) as u32
        }
    }

    fn height(&self, node: Option<u32>) -> u8 {
        node.map_or(0, |i| self.nodes[i as usize].height)
    }

    fn update_height(&mut self, node: u32) {
        let i = node as usize;
        let h = 1 + self
            .height(self.nodes[i].left)
            .max(self.height(self.nodes[i].right));
        self.nodes[i].height = h;
    }

    fn balance_factor(&self, node: u32) -> i16 {
        let i = node as usize;
        i16::from(self.height(self.nodes[i].left)) - i16::from(self.height(self.nodes[i].right))
    }

    fn rotate_right(&mut self, node: u32) -> u32 {
        let i = node as usize;
        let Some(l) = self.nodes[i].left else {
            return node;
        };
        self.nodes[i].left = self.nodes[l as usize].right;
        self.nodes[l as usize].right = Some(node);
        self.update_height(node);
        self.update_height(l);
        l
    }

    fn rotate_left(&mut self, node: u32) -> u32 {
        let i = node as usize;
        let Some(r) = self.nodes[i].right else {
            return node;
        };
        self.nodes[i].right = self.nodes[r as usize].left;
        self.nodes[r as usize].left = Some(node);
        self.update_height(node);
        self.update_height(r);
        r
    }

    fn rebalance(&mut self, node: u32) -> u32 {
        self.update_height(node);
        let bf = self.balance_factor(node);
        if bf > 1 {
            let Some(l) = self.nodes[node as usize].left else {
                return node;
            };
            if self.balance_factor(l) < 0 {
                let new_left = self.rotate_left(l);
                self.nodes[node as usize].left = Some(new_left);
            }
            self.rotate_right(node)
        } else if bf < -1 {
            let Some(r) = self.nodes[node as usize].right else {
                return node;
            };
            if self.balance_factor(r) > 0 {
                let new_right = self.rotate_right(r);
                self.nodes[node as usize].right = Some(new_right);
            }
            self.rotate_left(node)
        } else {
            node
        }
    }

    fn insert(&mut self, coord: T, slot: usize) {
        let root = self.root;
        let new_root = self.insert_at(root, coord, slot);
        self.root = Some(new_root);
    }

    fn insert_at(&mut self, node: Option<u32>, coord: T, slot: usize) -> u32 {
        let Some(n) = node else {
            return self.alloc(coord, slot);
        };
        let i = n as usize;
        match key_cmp(coord, slot, self.nodes[i].coord, self.nodes[i].slot) {
            Ordering::Less => {
                let child = self.insert_at(self.nodes[i].left, coord, slot);
                self.nodes[i].left = Some(child);
            }
            _ => {
                let child = self.insert_at(self.nodes[i].right, coord, slot);
                self.nodes[i].right = Some(child);
            }
        }
        self.rebalance(n)
    }

    fn remove(&mut self, coord: T, slot: usize) {
        let root = self.root;
        self.root = self.remove_at(root, coord, slot);
    }

    fn remove_at(&mut self, node: Option<u32>, coord: T, slot: usize) -> Option<u32> {
        let n = node?;
        let i = n as usize;
        match key_cmp(coord, slot, self.nodes[i].coord, self.nodes[i].slot) {
            Ordering::Less => {
                let child = self.remove_at(self.nodes[i].left, coord, slot);
                self.nodes[i].left = child;
            }
            Ordering::Greater => {
                let child = self.remove_at(self.nodes[i].right, coord, slot);
                self.nodes[i].right = child;
            }
            Ordering::Equal => match (self.nodes[i].left, self.nodes[i].right) {
                (None, None) => {
                    self.dealloc(n);
                    return None;
                }
                (Some(l), None) => {
                    self.dealloc(n);
                    return Some(l);
                }
                (None, Some(r)) => {
                    self.dealloc(n);
                    return Some(r);
                }
                (Some(_), Some(r)) => {
                    // Two children: adopt the in-order successor's key, then
                    // remove that successor from the right subtree.
                    let (s_coord, s_slot) = self.min_key(r);
                    self.nodes[i].coord = s_coord;
                    self.nodes[i].slot = s_slot;
                    let child = self.remove_at(Some(r), s_coord, s_slot);
                    self.nodes[i].right = child;
                }
            },
        }
        Some(self.rebalance(n))
    }

    fn dealloc(&mut self, node: u32) {
        self.free.push(node);
        self.len -= 1;
    }

    fn min_key(&self, mut node: u32) -> (T, usize) {
        loop {
            let n = &self.nodes[node as usize];
            match n.left {
                Some(l) => node = l,
                None => return (n.coord, n.slot),
            }
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Collect slots whose interval on this axis overlaps `[start, end]`.
    ///
    /// The descent can only rule a subtree out through the node's own
    /// interval: the left side is skipped when the node's interval ends
    /// before the query starts, the right side when it starts after the
    /// query ends. Nodes in `exclude`, nodes missing from `include`, the
    /// query origin, and nodes without a rendered interval take no part in
    /// the overlap test, but their subtrees still have to be walked.
    fn query(
        &self,
        start: T,
        end: T,
        origin: usize,
        include: Option<&HashSet<usize>>,
        exclude: &HashSet<usize>,
        interval_of: &mut dyn FnMut(usize) -> Option<(T, T)>,
        out: &mut Vec<usize>,
    ) {
        let mut stack: Vec<u32> = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n as usize];
            let (slot, left, right) = (node.slot, node.left, node.right);
            if slot == origin
                || exclude.contains(&slot)
                || include.is_some_and(|set| !set.contains(&slot))
            {
                if let Some(l) = left {
                    stack.push(l);
                }
                if let Some(r) = right {
                    stack.push(r);
                }
                continue;
            }
            match interval_of(slot) {
                Some((n_start, n_end)) => {
                    if le(n_start, end) && le(start, n_end) {
                        out.push(slot);
                        if let Some(l) = left {
                            stack.push(l);
                        }
                        if let Some(r) = right {
                            stack.push(r);
                        }
                    } else {
                        if let Some(l) = left
                            && le(start, n_end)
                        {
                            stack.push(l);
                        }
                        if let Some(r) = right
                            && le(n_start, end)
                        {
                            stack.push(r);
                        }
                    }
                }
                None => {
                    if let Some(l) = left {
                        stack.push(l);
                    }
                    if let Some(r) = right {
                        stack.push(r);
                    }
                }
            }
        }
    }

    /// In-order traversal (ascending coordinate, slot tie-break).
    fn each_in_order(&self, f: &mut dyn FnMut(usize)) {
        let mut stack: Vec<u32> = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(n) = cur {
                stack.push(n);
                cur = self.nodes[n as usize].left;
            }
            let Some(n) = stack.pop() else {
                return;
            };
            f(self.nodes[n as usize].slot);
            cur = self.nodes[n as usize].right;
        }
    }

    #[cfg(test)]
    fn validate(&self) {
        fn go<T: Copy + PartialOrd + Debug>(tree: &AxisTree<T>, node: Option<u32>) -> u8 {
            let Some(n) = node else { return 0 };
            let i = n as usize;
            let (coord, slot) = (tree.nodes[i].coord, tree.nodes[i].slot);
            if let Some(l) = tree.nodes[i].left {
                let ln = &tree.nodes[l as usize];
                assert_eq!(
                    key_cmp(ln.coord, ln.slot, coord, slot),
                    Ordering::Less,
                    "left child out of order"
                );
            }
            if let Some(r) = tree.nodes[i].right {
                let rn = &tree.nodes[r as usize];
                assert_eq!(
                    key_cmp(rn.coord, rn.slot, coord, slot),
                    Ordering::Greater,
                    "right child out of order"
                );
            }
            let lh = go(tree, tree.nodes[i].left);
            let rh = go(tree, tree.nodes[i].right);
            assert!(
                (i16::from(lh) - i16::from(rh)).abs() <= 1,
                "node out of balance"
            );
            assert_eq!(tree.nodes[i].height, 1 + lh.max(rh), "stale height");
            1 + lh.max(rh)
        }
        go(self, self.root);
    }
}

/// Dual ordered-tree backend.
///
/// The two-pass walk visits O(log n + k) nodes per query for spread-out
/// markers and degrades toward O(n) when markers densely co-locate, which is
/// acceptable for the tens-to-hundreds of markers a map renders.
#[derive(Clone)]
pub struct DualTree<T: Copy + PartialOrd + Debug> {
    by_x: AxisTree<T>,
    by_y: AxisTree<T>,
    /// Snapshot centers per slot, for keyed removal.
    centers: Vec<Option<(T, T)>>,
}

impl<T: Copy + PartialOrd + Debug> Default for DualTree<T> {
    fn default() -> Self {
        Self {
            by_x: AxisTree::default(),
            by_y: AxisTree::default(),
            centers: Vec::new(),
        }
    }
}

impl<T: Copy + PartialOrd + Debug> Debug for DualTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DualTree")
            .field("len", &self.by_x.len)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for DualTree<T> {
    fn insert(&mut self, slot: usize, x: T, y: T) {
        if self.centers.len() <= slot {
            self.centers.resize_with(slot + 1, || None);
        }
        self.centers[slot] = Some((x, y));
        self.by_x.insert(x, slot);
        self.by_y.insert(y, slot);
    }

    fn update(&mut self, slot: usize, x: T, y: T) {
        self.remove(slot);
        self.insert(slot, x, y);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(center) = self.centers.get_mut(slot)
            && let Some((x, y)) = center.take()
        {
            self.by_x.remove(x, slot);
            self.by_y.remove(y, slot);
        }
    }

    fn clear(&mut self) {
        self.by_x.clear();
        self.by_y.clear();
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
        let mut x_buf: Vec<usize> = Vec::new();
        {
            let mut interval_of = |s: usize| rect_of(s).map(|r| r.x_interval());
            let (start, end) = rect.x_interval();
            self.by_x
                .query(start, end, slot, None, exclude, &mut interval_of, &mut x_buf);
        }
        if x_buf.is_empty() {
            return;
        }
        let x_hits: HashSet<usize> = x_buf.into_iter().collect();
        {
            let mut interval_of = |s: usize| rect_of(s).map(|r| r.y_interval());
            let (start, end) = rect.y_interval();
            self.by_y.query(
                start,
                end,
                slot,
                Some(&x_hits),
                exclude,
                &mut interval_of,
                out,
            );
        }
    }

    fn each_slot(&self, f: &mut dyn FnMut(usize)) {
        self.by_x.each_in_order(f);
    }
}
