// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declutter Index: an overlap index for map marker icons.
//!
//! Declutter Index answers one question quickly, over and over: which marker
//! icons currently cover each other on screen?
//!
//! - Insert, update, and remove markers keyed by their projected screen
//!   center; payloads identify the application entity (a ship, a stop).
//! - Run [`IntersectIndexGeneric::check`] for the markers that just moved, or
//!   [`IntersectIndexGeneric::check_all`] after a zoom invalidates every icon
//!   extent.
//! - Each pass emits an [`Intersections`] value: the affected markers plus an
//!   [`OverlapGraph`] with one edge per intersecting pair, ready for
//!   connected-component fan-out.
//!
//! Icon rectangles are supplied lazily through a [`RectSource`] because they
//! change every frame; the index itself only snapshots marker centers.
//!
//! Backends are pluggable via a simple trait so you can swap the search
//! strategy without API churn. The default backend keeps two balanced trees
//! ordered by center coordinate (one per axis) and intersects per-axis
//! interval queries; a flat-vector backend is available for tiny sets and as
//! a test oracle.
//!
//! # Example
//!
//! ```rust
//! use declutter_index::{Aabb2D, IntersectIndex, MarkerKey};
//!
//! let mut idx: IntersectIndex<f64, u32> = IntersectIndex::new();
//! let a = idx.insert(0.0, 0.0, 1);
//! let b = idx.insert(5.0, 5.0, 2);
//! let c = idx.insert(100.0, 100.0, 3);
//!
//! // Every icon is a 10×10 box centered on the marker.
//! let rects = |key: MarkerKey| {
//!     idx.position(key)
//!         .map(|(x, y)| Aabb2D::<f64>::from_xywh(x - 5.0, y - 5.0, 10.0, 10.0))
//! };
//!
//! let result = idx.check_all(&rects);
//! assert!(result.graph.contains_edge(a, b));
//! assert!(result.graph.neighbors(c).is_empty());
//! ```
//!
//! ## Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Comparisons
//! against NaN fall back to the deterministic key tie-break.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod graph;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::dual_tree::DualTree;
pub use backends::flatvec::FlatVec;
pub use graph::OverlapGraph;
pub use index::{FlatIndex, IntersectIndex, IntersectIndexGeneric, Intersections, MarkerKey, RectSource};
pub use types::{Aabb2D, MarkerFlags};
