//! Benchmarks for the envelope evaluated as a function of time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keytone::dsp::{Envelope, EnvelopeParams};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

/// Evaluate one block of amplitudes starting at `start`.
fn render(env: &Envelope, buffer: &mut [f32], start: f64) {
    for (i, out) in buffer.iter_mut().enumerate() {
        *out = env.amplitude_at(start + i as f64 / SAMPLE_RATE);
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let params = EnvelopeParams::new(0.1, 0.1, 0.7, 0.3, 0.1);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (linear ramp)
        let mut env = Envelope::new(params);
        env.trigger_on(0.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(black_box(&env), black_box(&mut buffer), black_box(0.01)))
        });

        // Decay phase (powf per sample)
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| render(black_box(&env), black_box(&mut buffer), black_box(0.12)))
        });

        // Sustain phase (holding steady)
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(black_box(&env), black_box(&mut buffer), black_box(1.0)))
        });

        // Release phase (exp per sample)
        let mut env = Envelope::new(params);
        env.trigger_on(0.0);
        env.trigger_off(1.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(black_box(&env), black_box(&mut buffer), black_box(1.05)))
        });
    }

    group.finish();
}
