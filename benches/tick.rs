//! Tick throughput benchmarks
//!
//! One world holds three entities, so per-world cost must stay far below the
//! 16.6 ms tick budget even with hundreds of concurrent sessions.
//!
//! Run with: cargo bench --bench tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flappy_live_server::game::constants::physics::DT;
use flappy_live_server::game::state::GameState;
use flappy_live_server::live::protocol::FrameSnapshot;

fn create_worlds(count: usize) -> Vec<GameState> {
    (0..count).map(|i| GameState::from_seed(i as u64)).collect()
}

/// Benchmark one tick across a batch of independent worlds
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1usize, 16, 256] {
        let mut worlds = create_worlds(count);
        let mut ticks: u64 = 0;

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("worlds", count), &count, |b, _| {
            b.iter(|| {
                ticks += 1;
                for world in worlds.iter_mut() {
                    // Flap now and then so rounds end both ways over a run.
                    if ticks % 20 == 0 {
                        world.flap();
                    }
                    black_box(world.tick(black_box(DT)));
                }
            })
        });
    }
    group.finish();
}

/// Benchmark building the per-tick frame snapshot
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    let state = GameState::from_seed(7);

    group.bench_function("frame", |b| {
        b.iter(|| black_box(FrameSnapshot::from_state(black_box(&state))))
    });
    group.finish();
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
