//! Benchmarks for tone generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keytone::dsp::{ToneSource, WaveShape};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for shape in WaveShape::ALL {
            let mut osc = ToneSource::new(shape, 440.0);
            group.bench_with_input(BenchmarkId::new(shape.name(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(48_000.0));
                })
            });
        }
    }

    group.finish();
}
