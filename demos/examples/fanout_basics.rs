// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out basics.
//!
//! Three markers: two clustered, one far away. The overlap pass links the
//! cluster, fan-out ranks its members, and the straggler keeps no offset.
//! Moving the straggler into the cluster turns the pair into a triangle.
//!
//! Run:
//! - `cargo run -p declutter_demos --example fanout_basics`

use declutter_fanout::assign_marker_offsets;
use declutter_index::{Aabb2D, IntersectIndex, MarkerKey};
use kurbo::Rect;

/// Convert a kurbo icon box, as a renderer would produce, into the index's
/// AABB type.
fn to_aabb(rect: Rect) -> Aabb2D<f64> {
    Aabb2D::<f64>::from_xywh(rect.x0, rect.y0, rect.width(), rect.height())
}

fn icon_at(x: f64, y: f64) -> Rect {
    Rect::new(x - 5.0, y - 5.0, x + 5.0, y + 5.0)
}

fn main() {
    let mut idx: IntersectIndex<f64, &str> = IntersectIndex::new();
    let names = ["Volga Dream", "Mustai Karim", "Rossia"];
    let a = idx.insert(0.0, 0.0, names[0]);
    let b = idx.insert(5.0, 5.0, names[1]);
    let c = idx.insert(100.0, 100.0, names[2]);

    let rects = |key: MarkerKey| idx.position(key).map(|(x, y)| to_aabb(icon_at(x, y)));

    println!("== Initial layout ==");
    let result = idx.check_all(&rects);
    for change in assign_marker_offsets(&result) {
        let name = idx.payload(change.key).unwrap_or("?");
        match change.offset {
            Some(offset) => println!("{name}: shift by {offset}"),
            None => println!("{name}: no shift"),
        }
    }

    // The straggler sails into the cluster.
    idx.update(c, 2.0, 2.0);
    let rects = |key: MarkerKey| idx.position(key).map(|(x, y)| to_aabb(icon_at(x, y)));

    println!("== After moving {} ==", names[2]);
    let result = idx.check_all(&rects);
    assert!(result.graph.contains_edge(a, b));
    assert!(result.graph.contains_edge(a, c));
    assert!(result.graph.contains_edge(b, c));
    for change in assign_marker_offsets(&result) {
        let name = idx.payload(change.key).unwrap_or("?");
        match change.offset {
            Some(offset) => println!("{name}: shift by {offset}"),
            None => println!("{name}: no shift"),
        }
    }
}
