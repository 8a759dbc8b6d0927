//! Render a sawtooth through every factory preset and print the levels.
//!
//! Run with: cargo run --example offline_render

use flange_dsp::{
    engine::{PullBuffer, RenderActionFlags, SampleTime},
    flange::FACTORY_PRESETS,
    AudioFormat, FlangeConfig, FlangeKernel, Flanger, RenderError, MAX_BLOCK_SIZE,
};

const SAMPLE_RATE: f64 = 48_000.0;
const BLOCK: usize = 512;
const SECONDS: usize = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut flanger = Flanger::new(FlangeKernel::new(FlangeConfig::default()));
    flanger.start_processing(AudioFormat::stereo(SAMPLE_RATE), MAX_BLOCK_SIZE)?;

    let increment = 110.0 / SAMPLE_RATE as f32;
    let blocks = SECONDS * SAMPLE_RATE as usize / BLOCK;

    for preset in FACTORY_PRESETS {
        flanger.reset();
        flanger.kernel_mut().apply_snapshot(&preset.values, Some(0));

        let mut phase = 0.0f32;
        let mut pull = |_flags: &mut RenderActionFlags,
                        _time: SampleTime,
                        frames: usize,
                        _bus: usize,
                        buffers: &mut PullBuffer<'_>| {
            for frame in 0..frames {
                let sample = 0.5 * (2.0 * phase - 1.0);
                phase = (phase + increment).fract();
                for channel in 0..buffers.channel_count() {
                    buffers.channel_mut(channel)[frame] = sample;
                }
            }
            Ok::<(), RenderError>(())
        };

        let mut peak = 0.0f32;
        let mut energy = 0.0f64;
        for block in 0..blocks {
            let time = (block * BLOCK) as SampleTime;
            flanger.process_and_render(time, BLOCK, 0, None, &[], Some(&mut pull))?;
            for channel in 0..2 {
                for &sample in flanger.output().channel(channel) {
                    peak = peak.max(sample.abs());
                    energy += f64::from(sample * sample);
                }
            }
        }

        let rms = (energy / (blocks * BLOCK * 2) as f64).sqrt();
        println!("{:<14} peak {:>6.3}  rms {:>6.3}", preset.name, peak, rms);
    }

    flanger.stop_processing();
    Ok(())
}
