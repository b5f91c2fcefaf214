//! Benchmarks for voice turnover: the cost of starting, releasing and
//! reclaiming voices, without rendering.

use std::hint::black_box;

use criterion::Criterion;
use keytone::{
    dsp::{EnvelopeParams, WaveShape},
    synth::{FrequencyTable, VoiceRegistry},
};

pub fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/churn");
    let table = FrequencyTable::keyboard();
    let notes = table.notes().to_vec();

    // Fast playing: each key pressed and released, then reclaimed
    let params = EnvelopeParams::new(0.01, 0.05, 0.7, 0.05, 0.01);
    let mut registry = VoiceRegistry::new(table.clone(), params, WaveShape::Sine, notes.len());
    let mut now = 0.0;
    group.bench_function("press_release_reap", |b| {
        b.iter(|| {
            for &note in &notes {
                registry.note_on(black_box(note), now);
                registry.note_off(black_box(note), now + 0.02);
            }
            now += 1.0;
            black_box(registry.reap(now))
        })
    });

    // Pressing past the held limit is refused without touching the arena
    let mut registry = VoiceRegistry::new(table, params, WaveShape::Sine, 4);
    for &note in &notes[..4] {
        registry.note_on(note, 0.0);
    }
    group.bench_function("refuse_at_capacity", |b| {
        b.iter(|| {
            for &note in &notes[4..] {
                black_box(registry.note_on(black_box(note), 1.0));
            }
        })
    });

    group.finish();
}
