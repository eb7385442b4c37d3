//! Playback Benchmarks
//!
//! Measures the cost of driving the engine on virtual time, so hosts know
//! how much a frame's `advance_to` can cost on long answers.
//!
//! Run with: cargo bench --bench playback_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chatreel::cli::replay_exchanges;
use chatreel::prelude::*;

fn config_with_answer(chars: usize) -> LandingConfig {
    let answer: String = "atlas ".chars().cycle().take(chars).collect();
    LandingConfig::builder()
        .scenario("Atlas: status?", answer)
        .build()
}

/// One full cycle, stepping every deadline.
fn bench_full_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("Playback_cycle");
    group.sample_size(100);

    for n in [64, 256, 1024].iter() {
        let config = config_with_answer(*n);
        group.bench_with_input(BenchmarkId::new("replay_exchange", n), &config, |b, config| {
            b.iter(|| black_box(replay_exchanges(config, 1)));
        });
    }

    group.finish();
}

/// Coarse host frames against the embedded deck.
fn bench_frame_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Playback_frames");
    group.sample_size(100);
    let config = LandingConfig::embedded();

    for frame_ms in [16_u64, 33, 250].iter() {
        group.bench_with_input(
            BenchmarkId::new("advance_60s", frame_ms),
            frame_ms,
            |b, &frame_ms| {
                b.iter(|| {
                    let transcript = SharedTranscript::new(Transcript::new());
                    let mut engine = PlaybackEngine::from_config(&config, Some(transcript));
                    engine.start(PlayTime::ZERO);
                    let mut now = 0;
                    while now < 60_000 {
                        now += frame_ms;
                        engine.advance_to(PlayTime::from_millis(now));
                    }
                    black_box(engine.snapshot())
                });
            },
        );
    }

    group.finish();
}

/// Phone mask on every keystroke.
fn bench_phone_mask(c: &mut Criterion) {
    c.bench_function("format_whatsapp", |b| {
        b.iter(|| black_box(chatreel::lead::format_whatsapp(black_box("(48) 99999-12345"))));
    });
}

criterion_group!(
    benches,
    bench_full_cycle,
    bench_frame_advance,
    bench_phone_mask
);
criterion_main!(benches);
