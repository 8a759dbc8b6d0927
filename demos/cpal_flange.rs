//! Play a pulsing sawtooth through the flanger, stepping through the factory
//! presets from the control thread.
//!
//! Run with: cargo run --example cpal_flange --features cpal-demo

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};

use flange_dsp::{
    engine::{EventQueue, PullBuffer, RenderActionFlags, SampleTime},
    flange::FACTORY_PRESETS,
    AudioFormat, FlangeConfig, FlangeKernel, Flanger, RenderError, RenderEvent, MAX_BLOCK_SIZE,
};

/// Events are stamped this far ahead of the audio clock.
const SCHEDULE_AHEAD: SampleTime = 2048;
const PRESET_SECONDS: u64 = 6;

struct Source {
    phase: f32,
    increment: f32,
    gate: usize,
    gate_length: usize,
}

impl Source {
    fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            increment: 82.4 / sample_rate,
            gate: 0,
            gate_length: (sample_rate * 0.25) as usize,
        }
    }

    fn render(&mut self, buffers: &mut PullBuffer<'_>, frames: usize) {
        for frame in 0..frames {
            let envelope = 1.0 - self.gate as f32 / self.gate_length as f32;
            let sample = 0.3 * envelope * (2.0 * self.phase - 1.0);
            self.phase = (self.phase + self.increment).fract();
            self.gate = (self.gate + 1) % self.gate_length;
            for channel in 0..buffers.channel_count() {
                buffers.channel_mut(channel)[frame] = sample;
            }
        }
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;

    let mut flanger = Flanger::new(FlangeKernel::new(FlangeConfig::default()));
    flanger
        .start_processing(AudioFormat::new(sample_rate, channels), MAX_BLOCK_SIZE)
        .wrap_err("flanger rejected the device format")?;
    let bypass = flanger.bypass_handle();

    let (mut sender, mut queue) = EventQueue::new(256);
    let clock = Arc::new(AtomicI64::new(0));
    let audio_clock = clock.clone();
    let mut source = Source::new(sample_rate as f32);
    let mut time: SampleTime = 0;

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let events = queue.drain_block(time, frames);
                let mut pull = |_flags: &mut RenderActionFlags,
                                _time: SampleTime,
                                frames: usize,
                                _bus: usize,
                                buffers: &mut PullBuffer<'_>| {
                    source.render(buffers, frames);
                    Ok::<(), RenderError>(())
                };

                let offset = frames_written * channels;
                let block = &mut data[offset..offset + frames * channels];
                match flanger.process_and_render(time, frames, 0, None, events, Some(&mut pull)) {
                    Ok(()) => {
                        let output = flanger.output();
                        for channel in 0..channels {
                            for (frame, &sample) in output.channel(channel).iter().enumerate() {
                                block[frame * channels + channel] = sample;
                            }
                        }
                    }
                    Err(_) => block.fill(0.0),
                }

                time += frames as SampleTime;
                frames_written += frames;
            }
            audio_clock.store(time, Ordering::Relaxed);
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;

    stream.play()?;

    println!("=== flange_dsp ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Channels: {}", channels);
    println!("Press Ctrl+C to stop");
    println!();

    // Each preset plays dry for a second, then flanged.
    for preset in FACTORY_PRESETS.iter().cycle() {
        println!("  {}", preset.name);
        bypass.set(true);
        let at = clock.load(Ordering::Relaxed) + SCHEDULE_AHEAD;
        for (address, value) in preset.values.iter() {
            if let Err(event) = sender.send(RenderEvent::parameter(at, address.raw(), value)) {
                warn!("event queue full, dropped {event:?}");
            }
        }
        std::thread::sleep(Duration::from_secs(1));
        bypass.set(false);
        info!("preset {} active", preset.name);
        std::thread::sleep(Duration::from_secs(PRESET_SECONDS - 1));
    }

    Ok(())
}
