// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated ships with batched overlap resolution.
//!
//! Ships move along straight tracks; each tick updates every ship, then a
//! single `commit` resolves overlaps and the subscriber applies fan-out
//! offsets. A zoom halfway through shrinks every icon and forces a full
//! re-check.
//!
//! Run:
//! - `cargo run -p declutter_demos --example ship_animation`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use declutter_fanout::assign_marker_offsets;
use declutter_index::{Aabb2D, MarkerKey};
use declutter_resolver::Resolver;
use kurbo::{Point, Rect};

/// A ship on a straight track between two points.
struct Ship {
    name: &'static str,
    from: Point,
    to: Point,
    key: MarkerKey,
}

impl Ship {
    fn position(&self, t: f64) -> Point {
        self.from.lerp(self.to, t)
    }
}

fn icon_box(center: Point, icon_size: f64) -> Aabb2D<f64> {
    let rect = Rect::from_center_size(center, (icon_size, icon_size));
    Aabb2D::<f64>::from_xywh(rect.x0, rect.y0, rect.width(), rect.height())
}

fn main() {
    let mut resolver: Resolver<f64, usize> = Resolver::new();

    // The rendering layer's view: current fan-out offset per ship.
    let offsets: Rc<RefCell<HashMap<MarkerKey, Option<u32>>>> = Rc::default();
    let sink = Rc::clone(&offsets);
    resolver.on_intersect(move |result| {
        let mut offsets = sink.borrow_mut();
        for change in assign_marker_offsets(result) {
            offsets.insert(change.key, change.offset);
        }
    });

    let routes = [
        ("Volga Dream", Point::new(0.0, 0.0), Point::new(400.0, 0.0)),
        ("Mustai Karim", Point::new(400.0, 8.0), Point::new(0.0, 8.0)),
        ("Rossia", Point::new(200.0, 300.0), Point::new(200.0, 310.0)),
    ];
    let mut ships: Vec<Ship> = Vec::new();
    for (name, from, to) in routes {
        let key = resolver.add(from.x, from.y, ships.len());
        ships.push(Ship {
            name,
            from,
            to,
            key,
        });
    }

    let mut icon_size = 32.0;
    for tick in 0..=10 {
        let t = f64::from(tick) / 10.0;
        for ship in &ships {
            let p = ship.position(t);
            resolver.marker_moved(ship.key, p.x, p.y);
        }
        if tick == 5 {
            // Zoom out: icons cover more world-space, everything is suspect.
            icon_size = 64.0;
            resolver.zoom_changed();
        }

        // One batched pass per tick, however many ships moved.
        let icons: HashMap<MarkerKey, Aabb2D<f64>> = ships
            .iter()
            .map(|ship| (ship.key, icon_box(ship.position(t), icon_size)))
            .collect();
        resolver.commit(&|key: MarkerKey| icons.get(&key).copied());

        print!("tick {tick:2}:");
        let offsets = offsets.borrow();
        for ship in &ships {
            match offsets.get(&ship.key).copied().flatten() {
                Some(offset) => print!(" {}[+{offset}]", ship.name),
                None => print!(" {}", ship.name),
            }
        }
        println!();
    }
}
