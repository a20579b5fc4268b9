// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declutter Resolver: coalesced overlap-check scheduling for marker layers.
//!
//! ## Overview
//!
//! Ship animation changes marker coordinates continuously, and running an
//! overlap check per coordinate update would dominate the frame. This crate
//! accumulates the work instead: movement schedules individual markers, a
//! zoom schedules everything, and one call to
//! [`Resolver::commit`](crate::resolver::Resolver::commit) per tick runs a
//! single batched pass over whatever accumulated. Subscribers receive the
//! resulting [`Intersections`](declutter_index::Intersections) and apply the
//! fan-out however they render.
//!
//! The pending state is either a set of markers or the check-everything
//! sentinel; once the sentinel is armed, individual requests are already
//! covered and vanish into it. See [`Pending`](crate::pending::Pending).
//!
//! ## Workflow
//!
//! 1) Feed marker lifecycle into a [`Resolver`](crate::resolver::Resolver):
//!    [`add`](crate::resolver::Resolver::add),
//!    [`marker_moved`](crate::resolver::Resolver::marker_moved),
//!    [`remove`](crate::resolver::Resolver::remove),
//!    [`zoom_changed`](crate::resolver::Resolver::zoom_changed).
//! 2) Once per tick, call [`commit`](crate::resolver::Resolver::commit) with
//!    a [`RectSource`](declutter_index::RectSource) that reports current icon
//!    boxes. With no subscriber the pass is skipped outright.
//! 3) Group markers per family with a [`LayerSet`](crate::layers::LayerSet):
//!    overlap is resolved within a layer, and layer dispatch is an exhaustive
//!    enum rather than a string lookup.
//!
//! ## Example
//!
//! ```
//! use declutter_resolver::Resolver;
//! use declutter_index::{Aabb2D, MarkerKey};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut resolver: Resolver<f64, u32> = Resolver::new();
//! let overlaps: Rc<RefCell<usize>> = Rc::default();
//! let sink = Rc::clone(&overlaps);
//! resolver.on_intersect(move |result| {
//!     *sink.borrow_mut() = result.graph.edge_count();
//! });
//!
//! let a = resolver.add(0.0, 0.0, 1);
//! let b = resolver.add(5.0, 5.0, 2);
//!
//! // One batched pass covers both insertions.
//! let rects = |_key: MarkerKey| Some(Aabb2D::<f64>::from_xywh(-5.0, -5.0, 10.0, 10.0));
//! resolver.commit(&rects);
//! assert_eq!(*overlaps.borrow(), 1);
//! # let _ = (a, b);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. It is single-threaded by design;
//! see [`Resolver`](crate::resolver::Resolver) for the threading contract.

#![no_std]

extern crate alloc;

pub mod layers;
pub mod pending;
pub mod resolver;

pub use layers::{LayerKind, LayerSet};
pub use pending::Pending;
pub use resolver::{Resolver, Subscription};
