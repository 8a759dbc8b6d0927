//! Benchmarks for LFO evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flange_dsp::dsp::{Lfo, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    let waveforms = [
        ("sinusoid", Waveform::Sinusoid),
        ("triangle", Waveform::Triangle),
        ("sawtooth", Waveform::Sawtooth),
    ];

    for &size in BLOCK_SIZES {
        for (name, waveform) in waveforms {
            let mut lfo = Lfo::new(48_000.0, 0.5, waveform);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for _ in 0..size {
                        sum += lfo.value() + lfo.quad_phase_value();
                        lfo.increment();
                    }
                    black_box(sum)
                })
            });
        }

        // Two-pass walk used by precomputed evaluation
        let mut lfo = Lfo::new(48_000.0, 0.5, Waveform::Triangle);
        let mut even = vec![0.0f32; size];
        let mut odd = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("save_restore_rows", size), &size, |b, _| {
            b.iter(|| {
                let start = lfo.save_state();
                for value in even.iter_mut() {
                    *value = lfo.value_and_increment();
                }
                let end = lfo.save_state();
                lfo.restore_state(start);
                for value in odd.iter_mut() {
                    *value = lfo.quad_phase_value_and_increment();
                }
                lfo.restore_state(end);
                black_box((&even, &odd));
            })
        });
    }

    group.finish();
}
