use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intersection_controller::clock::VirtualClock;
use intersection_controller::controller::{GreenTiming, TrafficController};
use intersection_controller::sink::MemoryLog;
use intersection_controller::state::SharedState;
use std::sync::Arc;
use std::time::Duration;

// Drains preloaded lanes on a virtual clock, so only the control loop is timed.
fn bench_controller_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_drain");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(5));

    for &per_lane in [10u32, 100, 500].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(per_lane),
            &per_lane,
            |b, &per_lane| {
                b.iter(|| {
                    let controller = TrafficController::new(
                        Arc::new(SharedState::with_vehicles([per_lane; 4])),
                        Arc::new(VirtualClock::new()),
                        Arc::new(MemoryLog::new()),
                        GreenTiming::default(),
                    );
                    black_box(controller.run());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_controller_drain);
criterion_main!(benches);
