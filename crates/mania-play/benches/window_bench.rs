use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mania_config::PlayConfig;
use mania_model::{Chart, HitObject, ParsedChart};
use mania_play::{PlaySession, ScrollWindow, VisibleRange};
use mania_timing::SimulatedClock;

fn dense_chart(notes: i64) -> ParsedChart {
    let objects = (0..notes)
        .map(|i| HitObject::plain(i * 25, (i % 7) as u8))
        .collect();
    ParsedChart::mania(7, objects)
}

fn window_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_window");
    let range = VisibleRange::from_layout(1080.0, 0.9, 100.0);

    group.bench_function("forward_scroll", |b| {
        let chart = Chart::build(&dense_chart(20_000), 1.0).unwrap();
        let lane = chart.lane(0).unwrap();
        let mut window = ScrollWindow::new(lane.notes());
        let mut now = 0i64;
        b.iter(|| {
            window.update(lane.notes(), black_box(now as f64), range);
            now = (now + 1) % 500_000;
        });
    });

    group.bench_function("speed_change", |b| {
        let mut chart = Chart::build(&dense_chart(20_000), 1.0).unwrap();
        let mut window = ScrollWindow::new(chart.lane(0).unwrap().notes());
        let mut fast = false;
        b.iter(|| {
            fast = !fast;
            let speed = if fast { 4.0 } else { 0.5 };
            chart.set_speed(speed);
            let notes = chart.lane(0).unwrap().notes();
            window.update(notes, black_box(250_000.0 * speed), range);
        });
    });

    group.finish();
}

fn session_step_benchmark(c: &mut Criterion) {
    c.bench_function("session_step_7k", |b| {
        let clock = SimulatedClock::new();
        let parsed = dense_chart(20_000);
        let mut session = PlaySession::new(&parsed, &PlayConfig::default(), &clock).unwrap();
        let keys = [false; 7];
        b.iter(|| {
            clock.advance_ms(1);
            if session.step(black_box(&keys)).is_err() || session.is_finished() {
                session = PlaySession::new(&parsed, &PlayConfig::default(), &clock).unwrap();
            }
        });
    });
}

criterion_group!(benches, window_update_benchmark, session_step_benchmark);
criterion_main!(benches);
