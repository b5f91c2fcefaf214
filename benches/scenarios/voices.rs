//! Benchmarks for the full render path with held chords.
//!
//! The worst case is every key held at once: 27 voices summed, scaled and
//! clipped for every frame.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keytone::{
    config::EngineConfig,
    dsp::WaveShape,
    synth::{control_channel, FrequencyTable, PolySynth},
};

use crate::BLOCK_SIZES;

/// A synth with the first `held` keys down, past their attack.
fn held_chord(held: usize, shape: WaveShape) -> PolySynth {
    let (mut handle, rx) = control_channel(64);
    let config = EngineConfig::default().wave_shape(shape);
    let mut synth = PolySynth::new(&config, 48_000.0, rx, None).expect("valid config");

    for &note in FrequencyTable::keyboard().notes().iter().take(held) {
        let _ = handle.note_on(note);
    }
    let mut warmup = vec![0.0f32; 512];
    for _ in 0..20 {
        synth.render_block(&mut warmup);
    }
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SINGLE NOTE ===
        let mut single = held_chord(1, WaveShape::Sine);
        group.bench_with_input(BenchmarkId::new("1_voice", size), &size, |b, _| {
            b.iter(|| single.render_block(black_box(&mut buffer)))
        });

        // === TRIAD + OCTAVES ===
        let mut chord = held_chord(8, WaveShape::Sawtooth);
        group.bench_with_input(BenchmarkId::new("8_voices", size), &size, |b, _| {
            b.iter(|| chord.render_block(black_box(&mut buffer)))
        });

        // === EVERY KEY ===
        let mut full = held_chord(27, WaveShape::Sine);
        group.bench_with_input(BenchmarkId::new("27_voices", size), &size, |b, _| {
            b.iter(|| full.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}
