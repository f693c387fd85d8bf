use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use intersection_controller::events::EventSource;
use intersection_controller::generator::{generate_events, TrafficPattern};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Cursor;
use std::time::Duration;

// Renders a generated stream to the text format once, outside the timed loop.
fn event_text(events: usize) -> String {
    let pattern = TrafficPattern {
        events,
        ..TrafficPattern::default()
    };
    generate_events(&mut StdRng::seed_from_u64(1), &pattern)
        .iter()
        .map(|e| format!("{}\n", e))
        .collect()
}

fn bench_event_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_source");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in [100, 1_000, 10_000].iter() {
        let text = event_text(size);
        group.bench_with_input(BenchmarkId::new("parse", size), &text, |b, text| {
            b.iter(|| {
                let count = EventSource::from_reader(Cursor::new(text.as_bytes())).count();
                black_box(count);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_event_source);
criterion_main!(benches);
