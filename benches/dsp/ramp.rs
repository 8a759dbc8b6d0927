//! Benchmarks for ramped parameters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flange_dsp::dsp::{Percentage, RampingParameter};

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");

    for &size in BLOCK_SIZES {
        let mut param = RampingParameter::new(0.0);
        group.bench_with_input(BenchmarkId::new("settled", size), &size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += param.frame_value();
                }
                black_box(sum)
            })
        });

        // Retarget every block so the ramp never settles
        let mut mix = Percentage::new(0.0);
        let mut target = 100.0;
        group.bench_with_input(BenchmarkId::new("ramping", size), &size, |b, &size| {
            b.iter(|| {
                target = 100.0 - target;
                mix.set(target, size as u32 * 2);
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += mix.frame_value();
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
