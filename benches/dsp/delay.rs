//! Benchmarks for delay buffer operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flange_dsp::dsp::DelayBuffer;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        // 50ms at 48kHz
        let mut delay = DelayBuffer::new(2402);
        group.bench_with_input(BenchmarkId::new("write_read_fixed", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += delay.read(black_box(240.0));
                    delay.write(sample);
                }
                sum
            })
        });

        // Swept fractional read, as a flanger does it
        let mut delay = DelayBuffer::new(2402);
        group.bench_with_input(BenchmarkId::new("write_read_swept", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    let position = 240.0 + (i as f32 * 0.01).sin() * 192.0;
                    sum += delay.read(black_box(position));
                    delay.write(sample);
                }
                sum
            })
        });
    }

    group.finish();
}
