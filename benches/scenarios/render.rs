//! Benchmarks for complete stereo render calls.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use flange_dsp::{
    engine::{PullBuffer, RenderActionFlags, SampleTime},
    flange::LfoEvaluation,
    AudioFormat, FlangeConfig, FlangeKernel, Flanger, ParameterAddress, RenderError, RenderEvent,
};

use crate::BLOCK_SIZES;

fn build_flanger(evaluation: LfoEvaluation, max_frames: usize) -> Flanger {
    let config = FlangeConfig::default().with_lfo_evaluation(evaluation);
    let mut flanger = Flanger::new(FlangeKernel::new(config));
    flanger
        .start_processing(AudioFormat::stereo(48_000.0), max_frames)
        .expect("valid format");
    let kernel = flanger.kernel_mut();
    kernel.set_parameter(ParameterAddress::StereoPhaseOffset, 1.0, None);
    kernel.set_parameter(ParameterAddress::Depth, 8.0, Some(0));
    flanger
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    let strategies = [
        ("per_sample", LfoEvaluation::PerSample),
        ("precomputed", LfoEvaluation::Precomputed),
    ];

    for &size in BLOCK_SIZES {
        let signal: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut pull = |_flags: &mut RenderActionFlags,
                        _time: SampleTime,
                        frames: usize,
                        _bus: usize,
                        buffers: &mut PullBuffer<'_>| {
            for channel in 0..buffers.channel_count() {
                buffers.channel_mut(channel).copy_from_slice(&signal[..frames]);
            }
            Ok::<(), RenderError>(())
        };

        for (name, evaluation) in strategies {
            let mut flanger = build_flanger(evaluation, size);
            let mut left = vec![0.0f32; size];
            let mut right = vec![0.0f32; size];
            let mut time: SampleTime = 0;

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut channels = [left.as_mut_slice(), right.as_mut_slice()];
                    flanger
                        .process_and_render(
                            time,
                            size,
                            0,
                            Some(&mut channels[..]),
                            &[],
                            Some(&mut pull),
                        )
                        .expect("render");
                    time += size as SampleTime;
                    black_box(&channels);
                })
            });

            // Four evenly spaced automation points per block
            let mut flanger = build_flanger(evaluation, size);
            group.bench_with_input(
                BenchmarkId::new(format!("{name}_automated"), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        let step = size as SampleTime / 4;
                        let events = [
                            RenderEvent::parameter(time, ParameterAddress::Depth.raw(), 6.0),
                            RenderEvent::parameter(time + step, ParameterAddress::Feedback.raw(), 60.0),
                            RenderEvent::parameter(time + 2 * step, ParameterAddress::Depth.raw(), 9.0),
                            RenderEvent::parameter(time + 3 * step, ParameterAddress::Feedback.raw(), 40.0),
                        ];
                        flanger
                            .process_and_render(time, size, 0, None, &events, Some(&mut pull))
                            .expect("render");
                        time += size as SampleTime;
                        black_box(flanger.output());
                    })
                },
            );
        }
    }

    group.finish();
}
