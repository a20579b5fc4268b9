// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different overlap-search strategies.
//!
//! - [`dual_tree::DualTree`] (default): two balanced trees ordered by marker
//!   center, one per axis; queries prune subtrees by interval and intersect
//!   the per-axis candidate sets. The right choice whenever markers move
//!   every frame and queries are frequent.
//! - [`flatvec::FlatVec`]: linear scans over a flat vector. Smallest possible
//!   implementation; useful for tiny marker sets and as a test oracle.

pub mod dual_tree;
pub mod flatvec;
