//! Benchmarks for spatial index construction and neighbor queries.
//!
//! Run with: `cargo bench --bench neighbor_query`

use circles::{spawn_uniform, Bounds, CirclesConfig, DVec3, SpatialConfig, SpatialIndex};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn population(count: u32) -> (Vec<(u64, DVec3)>, Bounds) {
    let config = CirclesConfig { agent_count: count, ..Default::default() };
    let bounds = config.bounds();
    let points = spawn_uniform(count, bounds, 1)
        .into_iter()
        .map(|a| (a.id, a.position))
        .collect();
    (points, bounds)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for count in [1_024u32, 16_384, 65_536] {
        let (points, bounds) = population(count);
        group.bench_with_input(BenchmarkId::new("agents", count), &points, |b, points| {
            let mut index = SpatialIndex::new();
            b.iter(|| {
                index
                    .build(points.iter().copied(), SpatialConfig::new(2.0), bounds)
                    .unwrap();
                black_box(index.len())
            })
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_query");
    let (points, bounds) = population(16_384);

    for cell_ratio in [1.0, 0.5] {
        let config = SpatialConfig::new(2.0).with_cell_size(2.0 * cell_ratio);
        let index = SpatialIndex::from_points(points.iter().copied(), config, bounds).unwrap();
        group.bench_with_input(
            BenchmarkId::new("cell_ratio", cell_ratio),
            &index,
            |b, index| {
                b.iter(|| {
                    let mut found = 0usize;
                    for &(_, p) in points.iter().take(256) {
                        index.for_each_neighbor(p, |_| found += 1);
                    }
                    black_box(found)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
