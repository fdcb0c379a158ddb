//! Benchmarks for a full simulation step.
//!
//! Run with: `cargo bench --bench step`

use circles::{spawn_uniform, CirclesConfig, SimulationStep};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    group.sample_size(20);

    for count in [4_096u32, 16_384] {
        let config = CirclesConfig { agent_count: count, ..Default::default() };
        let agents = spawn_uniform(count, config.bounds(), 1);
        let mut step = SimulationStep::new(
            config.repulsion_model().unwrap(),
            config.spatial_config(),
            config.bounds(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("agents", count), &agents, |b, agents| {
            b.iter(|| black_box(step.advance(agents).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
