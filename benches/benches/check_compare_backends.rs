// Copyright 2025 the Declutter Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use declutter_index::{
    Aabb2D, Backend, DualTree, FlatVec, IntersectIndexGeneric, MarkerKey, RectSource,
};

const ICON_W: f64 = 32.0;
const ICON_H: f64 = 32.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Marker centers scattered over a world of the given extent. Smaller
/// extents mean denser pile-ups.
fn gen_centers(count: usize, extent: f64) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| (rng.next_f64() * extent, rng.next_f64() * extent))
        .collect()
}

fn icon_at(x: f64, y: f64) -> Aabb2D<f64> {
    Aabb2D::<f64>::from_xywh(x - ICON_W / 2.0, y - ICON_H / 2.0, ICON_W, ICON_H)
}

fn build_index<B: Backend<f64> + Default>(
    centers: &[(f64, f64)],
) -> (IntersectIndexGeneric<f64, u32, B>, Vec<MarkerKey>) {
    let mut idx = IntersectIndexGeneric::new();
    let keys = centers
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| idx.insert(x, y, i as u32))
        .collect();
    (idx, keys)
}

fn rect_source<B: Backend<f64>>(
    idx: &IntersectIndexGeneric<f64, u32, B>,
) -> impl RectSource<f64> + '_ {
    |key: MarkerKey| idx.position(key).map(|(x, y)| icon_at(x, y))
}

fn bench_check_all(c: &mut Criterion) {
    // A cruise map shows tens to low hundreds of markers; extents are picked
    // so the sparse case has almost no overlaps and the dense case clusters
    // heavily.
    for (label, count, extent) in [
        ("sparse_100", 100, 4000.0),
        ("dense_100", 100, 400.0),
        ("dense_400", 400, 800.0),
    ] {
        let centers = gen_centers(count, extent);
        let mut group = c.benchmark_group(format!("check_all/{label}"));
        group.throughput(Throughput::Elements(count as u64));

        let (tree_idx, _) = build_index::<DualTree<f64>>(&centers);
        group.bench_function("dual_tree", |b| {
            b.iter(|| {
                let result = tree_idx.check_all(&rect_source(&tree_idx));
                black_box(result.graph.edge_count())
            });
        });

        let (flat_idx, _) = build_index::<FlatVec<f64>>(&centers);
        group.bench_function("flatvec", |b| {
            b.iter(|| {
                let result = flat_idx.check_all(&rect_source(&flat_idx));
                black_box(result.graph.edge_count())
            });
        });

        group.finish();
    }
}

fn bench_single_marker_check(c: &mut Criterion) {
    let centers = gen_centers(200, 1000.0);
    let mut group = c.benchmark_group("check_one/200_markers");

    let (tree_idx, tree_keys) = build_index::<DualTree<f64>>(&centers);
    group.bench_function("dual_tree", |b| {
        b.iter(|| {
            let result = tree_idx.check([tree_keys[17]], &rect_source(&tree_idx));
            black_box(result.graph.edge_count())
        });
    });

    let (flat_idx, flat_keys) = build_index::<FlatVec<f64>>(&centers);
    group.bench_function("flatvec", |b| {
        b.iter(|| {
            let result = flat_idx.check([flat_keys[17]], &rect_source(&flat_idx));
            black_box(result.graph.edge_count())
        });
    });

    group.finish();
}

fn bench_update_then_check(c: &mut Criterion) {
    // The animation pattern: every frame a few markers move, then one
    // batched pass runs.
    let centers = gen_centers(100, 1000.0);
    let mut group = c.benchmark_group("move_and_check/100_markers");

    group.bench_function("dual_tree", |b| {
        b.iter_batched(
            || build_index::<DualTree<f64>>(&centers),
            |(mut idx, keys)| {
                for (i, &key) in keys.iter().take(8).enumerate() {
                    idx.update(key, i as f64 * 10.0, i as f64 * 10.0);
                }
                let moved = keys.iter().take(8).copied().collect::<Vec<_>>();
                let result = idx.check(moved, &rect_source(&idx));
                black_box(result.graph.edge_count())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_check_all,
    bench_single_marker_check,
    bench_update_then_check
);
criterion_main!(benches);
