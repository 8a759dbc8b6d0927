use log::{debug, info};

use super::{
    config::{FlangeConfig, LfoEvaluation},
    params::{ParameterAddress, ParameterSnapshot},
};
use crate::{
    dsp::{lfo::bipolar_to_unipolar, BoolParameter, DelayBuffer, Lfo, Milliseconds, Percentage},
    engine::{AudioFormat, BufferFacet, BufferFacetMut, Kernel, ParameterEvent},
    error::ConfigError,
};

/*
Flanging
========

A flanger mixes a signal with a copy of itself delayed by a few milliseconds,
and sweeps that delay slowly with an LFO. The sum is a comb filter whose
notches move up and down the spectrum as the delay changes.

Signal Flow (one channel)
-------------------------

                  ┌───────────────────────────────┐
    input ──┬────►│ (+) ─► delay line ─► read(pos)├──┬──► × wet ──┐
            │     └──▲────────────────────────────┘  │           │
            │        └──────── × ±feedback ◄─────────┘          (+) ──► output
            └─────────────────────────────► × dry ──────────────┘

The delayed sample is read before the new one is written, so the shortest
possible delay is one sample.

Sweep
-----

Delay and Depth are both in milliseconds. Delay is the bottom of the sweep
and Depth the top:

    position = delay + unipolar(lfo) * (depth - delay)

With depth equal to delay the LFO has no effect and the kernel is a plain
comb filter. Positions are converted to samples with the configured sample
rate before the delay line is read.

Stereo
------

The LFO advances once per frame, never per channel, so every channel sees the
same phase. With StereoPhaseOffset on, odd channels read the quadrature
output instead, a quarter cycle ahead of the even channels. The sweeps then
cross rather than move together and the image widens.

Evaluation Strategies
---------------------

  PerSample    frame-outer loop. Ramps, LFO and every channel advance
               together one frame at a time.

  Precomputed  two passes per segment. The first walks the ramps and the LFO
               and fills rows of positions and gains. The second runs each
               channel over its rows. The quadrature row is filled by saving
               the LFO phase, walking the in-phase row, restoring the phase
               and walking the quadrature row.

Both perform the same arithmetic in the same order per frame, so they produce
identical samples.
*/

/// Per-segment rows for [`LfoEvaluation::Precomputed`], sized to the maximum
/// block length at configuration time.
#[derive(Debug, Default)]
struct SegmentRows {
    lower: Vec<f32>,
    span: Vec<f32>,
    even: Vec<f32>,
    odd: Vec<f32>,
    feedback: Vec<f32>,
    wet: Vec<f32>,
    dry: Vec<f32>,
}

impl SegmentRows {
    fn allocate(&mut self, frames: usize) {
        for row in self.rows_mut() {
            row.clear();
            row.resize(frames, 0.0);
        }
    }

    fn release(&mut self) {
        for row in self.rows_mut() {
            *row = Vec::new();
        }
    }

    fn rows_mut(&mut self) -> [&mut Vec<f32>; 7] {
        [
            &mut self.lower,
            &mut self.span,
            &mut self.even,
            &mut self.odd,
            &mut self.feedback,
            &mut self.wet,
            &mut self.dry,
        ]
    }
}

/// Ramped values for one frame.
struct FrameState {
    lower: f32,
    span: f32,
    feedback: f32,
    wet: f32,
    dry: f32,
}

/// The flange effect.
pub struct FlangeKernel {
    config: FlangeConfig,
    depth: Milliseconds,
    delay: Milliseconds,
    feedback: Percentage,
    dry_mix: Percentage,
    wet_mix: Percentage,
    negative_feedback: BoolParameter,
    stereo_phase_offset: BoolParameter,
    lfo: Lfo,
    delay_lines: Vec<DelayBuffer>,
    rows: SegmentRows,
    samples_per_ms: f32,
    max_position: f32,
}

impl FlangeKernel {
    pub fn new(config: FlangeConfig) -> Self {
        let defaults = ParameterSnapshot::default();
        let mut kernel = Self {
            config,
            depth: Milliseconds::default(),
            delay: Milliseconds::default(),
            feedback: Percentage::default(),
            dry_mix: Percentage::default(),
            wet_mix: Percentage::default(),
            negative_feedback: BoolParameter::default(),
            stereo_phase_offset: BoolParameter::default(),
            lfo: Lfo::new(44_100.0, f64::from(defaults.rate), config.waveform),
            delay_lines: Vec::new(),
            rows: SegmentRows::default(),
            samples_per_ms: 44.1,
            max_position: 0.0,
        };
        kernel.apply_snapshot(&defaults, Some(0));
        kernel
    }

    pub fn config(&self) -> &FlangeConfig {
        &self.config
    }

    /// Set a parameter in boundary units.
    ///
    /// The value is clamped to the parameter's range, and millisecond values to
    /// the configured maximum delay. `ramp_frames` of `None` applies the
    /// configured default ramp. Rate and the two switches change immediately.
    pub fn set_parameter(&mut self, address: ParameterAddress, value: f32, ramp_frames: Option<u32>) {
        if value.is_nan() {
            return;
        }
        let value = address.definition().clamp(value);
        let duration = ramp_frames.unwrap_or(self.config.default_ramp_frames);

        match address {
            ParameterAddress::Depth => self.depth.set(value.min(self.config.max_delay_ms), duration),
            ParameterAddress::Rate => self.lfo.set_frequency(f64::from(value)),
            ParameterAddress::Delay => self.delay.set(value.min(self.config.max_delay_ms), duration),
            ParameterAddress::Feedback => self.feedback.set(value, duration),
            ParameterAddress::DryMix => self.dry_mix.set(value, duration),
            ParameterAddress::WetMix => self.wet_mix.set(value, duration),
            ParameterAddress::NegativeFeedback => self.negative_feedback.set(value),
            ParameterAddress::StereoPhaseOffset => self.stereo_phase_offset.set(value),
        }
    }

    /// Settled value of a parameter in boundary units.
    pub fn get_parameter(&self, address: ParameterAddress) -> f32 {
        match address {
            ParameterAddress::Depth => self.depth.get(),
            ParameterAddress::Rate => self.lfo.frequency() as f32,
            ParameterAddress::Delay => self.delay.get(),
            ParameterAddress::Feedback => self.feedback.get(),
            ParameterAddress::DryMix => self.dry_mix.get(),
            ParameterAddress::WetMix => self.wet_mix.get(),
            ParameterAddress::NegativeFeedback => self.negative_feedback.get(),
            ParameterAddress::StereoPhaseOffset => self.stereo_phase_offset.get(),
        }
    }

    /// Like [`Self::set_parameter`]; unknown addresses are ignored.
    pub fn set_raw_parameter(&mut self, address: u64, value: f32, ramp_frames: Option<u32>) {
        if let Some(address) = ParameterAddress::from_raw(address) {
            self.set_parameter(address, value, ramp_frames);
        }
    }

    /// Like [`Self::get_parameter`]; unknown addresses read as zero.
    pub fn get_raw_parameter(&self, address: u64) -> f32 {
        ParameterAddress::from_raw(address)
            .map(|address| self.get_parameter(address))
            .unwrap_or(0.0)
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        let mut snapshot = ParameterSnapshot::default();
        for address in ParameterAddress::ALL {
            snapshot.set(address, self.get_parameter(address));
        }
        snapshot
    }

    pub fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot, ramp_frames: Option<u32>) {
        for (address, value) in snapshot.iter() {
            self.set_parameter(address, value, ramp_frames);
        }
    }

    pub fn channel_count(&self) -> usize {
        self.delay_lines.len()
    }

    #[inline]
    fn next_frame(&mut self) -> FrameState {
        let depth = self.depth.frame_value() * self.samples_per_ms;
        let lower = self.delay.frame_value() * self.samples_per_ms;
        let sign = if self.negative_feedback.is_on() { -1.0 } else { 1.0 };
        FrameState {
            lower,
            span: depth - lower,
            feedback: sign * self.feedback.frame_value(),
            wet: self.wet_mix.frame_value(),
            dry: self.dry_mix.frame_value(),
        }
    }

    #[inline]
    fn position(&self, lfo_value: f32, lower: f32, span: f32) -> f32 {
        (bipolar_to_unipolar(lfo_value) * span + lower).clamp(0.0, self.max_position)
    }

    fn render_per_sample(
        &mut self,
        input: &BufferFacet<'_>,
        output: &mut BufferFacetMut<'_, '_>,
        channels: usize,
        frame_count: usize,
    ) {
        let stereo = self.stereo_phase_offset.is_on();

        for frame in 0..frame_count {
            let state = self.next_frame();
            let even = self.position(self.lfo.value(), state.lower, state.span);
            let odd = if stereo {
                self.position(self.lfo.quad_phase_value(), state.lower, state.span)
            } else {
                even
            };
            self.lfo.increment();

            for channel in 0..channels {
                let position = if channel & 1 == 1 { odd } else { even };
                let line = &mut self.delay_lines[channel];
                let sample = input.channel(channel)[frame];
                let delayed = line.read(position);
                line.write(sample + state.feedback * delayed);
                output.channel_mut(channel)[frame] = state.wet * delayed + state.dry * sample;
            }
        }
    }

    fn render_precomputed(
        &mut self,
        input: &BufferFacet<'_>,
        output: &mut BufferFacetMut<'_, '_>,
        channels: usize,
        frame_count: usize,
    ) {
        let stereo = self.stereo_phase_offset.is_on();
        let start = self.lfo.save_state();

        for frame in 0..frame_count {
            let state = self.next_frame();
            let value = self.lfo.value_and_increment();
            self.rows.even[frame] = self.position(value, state.lower, state.span);
            self.rows.lower[frame] = state.lower;
            self.rows.span[frame] = state.span;
            self.rows.feedback[frame] = state.feedback;
            self.rows.wet[frame] = state.wet;
            self.rows.dry[frame] = state.dry;
        }

        if stereo && channels > 1 {
            let end = self.lfo.save_state();
            self.lfo.restore_state(start);
            for frame in 0..frame_count {
                let value = self.lfo.quad_phase_value_and_increment();
                self.rows.odd[frame] =
                    self.position(value, self.rows.lower[frame], self.rows.span[frame]);
            }
            self.lfo.restore_state(end);
        }

        let rows = &self.rows;
        for (channel, line) in self.delay_lines.iter_mut().enumerate().take(channels) {
            let positions = if stereo && channel & 1 == 1 {
                &rows.odd[..frame_count]
            } else {
                &rows.even[..frame_count]
            };
            let source = input.channel(channel);
            let destination = output.channel_mut(channel);

            for frame in 0..frame_count {
                let sample = source[frame];
                let delayed = line.read(positions[frame]);
                line.write(sample + rows.feedback[frame] * delayed);
                destination[frame] = rows.wet[frame] * delayed + rows.dry[frame] * sample;
            }
        }
    }
}

impl Default for FlangeKernel {
    fn default() -> Self {
        Self::new(FlangeConfig::default())
    }
}

impl Kernel for FlangeKernel {
    fn initialize(&mut self, format: &AudioFormat, max_frames: usize) -> Result<(), ConfigError> {
        self.config.validate()?;

        let samples_per_ms = format.sample_rate / 1000.0;
        let max_position = f64::from(self.config.max_delay_ms) * samples_per_ms;
        let size = max_position.ceil() as usize + 2;

        self.samples_per_ms = samples_per_ms as f32;
        self.max_position = max_position as f32;
        let frequency = self.lfo.frequency();
        self.lfo.initialize(format.sample_rate, frequency);

        self.delay_lines.truncate(format.channel_count);
        for line in &mut self.delay_lines {
            line.resize(size);
        }
        while self.delay_lines.len() < format.channel_count {
            self.delay_lines.push(DelayBuffer::new(size));
        }
        self.rows.allocate(max_frames);

        info!(
            "flange delay lines: {} x {} samples ({} ms at {} Hz)",
            format.channel_count,
            self.delay_lines.first().map_or(0, DelayBuffer::capacity),
            self.config.max_delay_ms,
            format.sample_rate
        );
        Ok(())
    }

    fn release(&mut self) {
        debug!("releasing {} flange delay line(s)", self.delay_lines.len());
        self.delay_lines = Vec::new();
        self.rows.release();
    }

    fn reset(&mut self) {
        for line in &mut self.delay_lines {
            line.clear();
        }
        self.lfo.reset();
    }

    fn do_rendering(
        &mut self,
        input: &BufferFacet<'_>,
        output: &mut BufferFacetMut<'_, '_>,
        frame_count: usize,
    ) {
        let channels = input
            .channel_count()
            .min(output.channel_count())
            .min(self.delay_lines.len());

        match self.config.lfo_evaluation {
            LfoEvaluation::PerSample => self.render_per_sample(input, output, channels, frame_count),
            LfoEvaluation::Precomputed => {
                self.render_precomputed(input, output, channels, frame_count)
            }
        }

        for channel in channels..output.channel_count() {
            output.channel_mut(channel).fill(0.0);
        }
    }

    fn do_parameter_event(&mut self, event: &ParameterEvent) {
        self.set_raw_parameter(event.address, event.value, event.ramp_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::Waveform,
        engine::{
            EventProcessor, PullBuffer, RenderActionFlags, RenderEvent, SampleTime,
        },
        error::RenderError,
    };

    const SAMPLE_RATE: f64 = 1000.0;

    fn engine(config: FlangeConfig, channels: usize) -> EventProcessor<FlangeKernel> {
        let mut engine = EventProcessor::new(FlangeKernel::new(config));
        engine
            .start_processing(AudioFormat::new(SAMPLE_RATE, channels), 256)
            .unwrap();
        engine
    }

    fn render(
        engine: &mut EventProcessor<FlangeKernel>,
        timestamp: SampleTime,
        input: &[Vec<f32>],
        events: &[RenderEvent],
    ) -> Vec<Vec<f32>> {
        let frames = input[0].len();
        let mut pull = |_flags: &mut RenderActionFlags,
                        _time: SampleTime,
                        frames: usize,
                        _bus: usize,
                        buffers: &mut PullBuffer<'_>| {
            for (channel, samples) in input.iter().enumerate() {
                buffers.channel_mut(channel).copy_from_slice(&samples[..frames]);
            }
            Ok::<(), RenderError>(())
        };
        engine
            .process_and_render(timestamp, frames, 0, None, events, Some(&mut pull))
            .unwrap();
        (0..input.len())
            .map(|channel| engine.output().channel(channel).to_vec())
            .collect()
    }

    fn impulse(frames: usize) -> Vec<f32> {
        let mut samples = vec![0.0; frames];
        samples[0] = 1.0;
        samples
    }

    /// Wet only, no feedback, fixed position.
    fn comb(kernel: &mut FlangeKernel, delay_ms: f32) {
        kernel.set_parameter(ParameterAddress::Delay, delay_ms, Some(0));
        kernel.set_parameter(ParameterAddress::Depth, delay_ms, Some(0));
        kernel.set_parameter(ParameterAddress::Feedback, 0.0, Some(0));
        kernel.set_parameter(ParameterAddress::DryMix, 0.0, Some(0));
        kernel.set_parameter(ParameterAddress::WetMix, 100.0, Some(0));
    }

    #[test]
    fn test_parameters_round_trip_in_boundary_units() {
        let mut kernel = FlangeKernel::default();
        let values = [
            (ParameterAddress::Depth, 50.0),
            (ParameterAddress::Rate, 3.5),
            (ParameterAddress::Delay, 12.25),
            (ParameterAddress::Feedback, 15.0),
            (ParameterAddress::DryMix, 27.0),
            (ParameterAddress::WetMix, 59.0),
            (ParameterAddress::NegativeFeedback, 1.0),
            (ParameterAddress::StereoPhaseOffset, 1.0),
        ];

        for (address, value) in values {
            kernel.set_parameter(address, value, None);
            assert_eq!(kernel.get_parameter(address), value, "{address:?}");
        }
    }

    #[test]
    fn test_values_are_clamped_at_the_boundary() {
        let mut kernel =
            FlangeKernel::new(FlangeConfig::default().with_max_delay_ms(20.0));

        kernel.set_parameter(ParameterAddress::Depth, 45.0, Some(0));
        assert_eq!(kernel.get_parameter(ParameterAddress::Depth), 20.0);

        kernel.set_parameter(ParameterAddress::Feedback, 150.0, Some(0));
        assert!((kernel.get_parameter(ParameterAddress::Feedback) - 100.0).abs() < 1e-4);

        kernel.set_parameter(ParameterAddress::Rate, 0.0, None);
        assert!((kernel.get_parameter(ParameterAddress::Rate) - 0.01).abs() < 1e-6);

        kernel.set_parameter(ParameterAddress::WetMix, f32::NAN, Some(0));
        assert!((kernel.get_parameter(ParameterAddress::WetMix) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_raw_addresses_are_ignored() {
        let mut kernel = FlangeKernel::default();
        let before = kernel.snapshot();

        kernel.set_raw_parameter(42, 1.0, Some(0));
        assert_eq!(kernel.snapshot(), before);
        assert_eq!(kernel.get_raw_parameter(42), 0.0);
        assert_eq!(kernel.get_raw_parameter(ParameterAddress::Delay.raw()), 1.0);
    }

    #[test]
    fn test_snapshot_reflects_settled_targets() {
        let mut kernel = FlangeKernel::default();
        kernel.set_parameter(ParameterAddress::Feedback, 90.0, Some(10_000));

        let snapshot = kernel.snapshot();
        assert!((snapshot.feedback - 90.0).abs() < 1e-4);

        let mut other = FlangeKernel::default();
        other.apply_snapshot(&snapshot, Some(0));
        for ((address, copied), (_, original)) in other.snapshot().iter().zip(snapshot.iter()) {
            assert!((copied - original).abs() < 1e-4, "{address:?}");
        }
    }

    #[test]
    fn test_equal_depth_and_delay_is_a_fixed_comb() {
        let mut engine = engine(FlangeConfig::default(), 1);
        comb(engine.kernel_mut(), 2.0);

        let output = render(&mut engine, 0, &[impulse(16)], &[]);

        // Two samples of delay plus the read-before-write sample.
        let expected: Vec<f32> = (0..16).map(|i| if i == 3 { 1.0 } else { 0.0 }).collect();
        assert_eq!(output[0], expected);
    }

    #[test]
    fn test_negative_feedback_flips_recirculation() {
        for (negative, sign) in [(0.0, 1.0), (1.0, -1.0)] {
            let mut engine = engine(FlangeConfig::default(), 1);
            let kernel = engine.kernel_mut();
            comb(kernel, 0.0);
            kernel.set_parameter(ParameterAddress::Feedback, 50.0, Some(0));
            kernel.set_parameter(ParameterAddress::NegativeFeedback, negative, None);

            let output = render(&mut engine, 0, &[impulse(8)], &[]);
            assert_eq!(output[0][1], 1.0);
            assert!((output[0][2] - sign * 0.5).abs() < 1e-6, "{output:?}");
            assert!((output[0][3] - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stereo_offset_decorrelates_odd_channels() {
        let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.37).sin()).collect();
        let stereo = vec![input.clone(), input];

        let mut engine = engine(FlangeConfig::default(), 2);
        let kernel = engine.kernel_mut();
        kernel.set_parameter(ParameterAddress::Depth, 20.0, Some(0));
        kernel.set_parameter(ParameterAddress::Delay, 0.0, Some(0));
        kernel.set_parameter(ParameterAddress::Rate, 4.0, None);

        let locked = render(&mut engine, 0, &stereo, &[]);
        assert_eq!(locked[0], locked[1]);

        engine.reset();
        engine
            .kernel_mut()
            .set_parameter(ParameterAddress::StereoPhaseOffset, 1.0, None);
        let offset = render(&mut engine, 0, &stereo, &[]);
        assert_eq!(offset[0], locked[0]);
        assert_ne!(offset[0], offset[1]);
    }

    #[test]
    fn test_evaluation_strategies_agree() {
        let left: Vec<f32> = (0..200).map(|i| (i as f32 * 0.05).sin()).collect();
        let right: Vec<f32> = (0..200).map(|i| ((i * 7 % 13) as f32 / 6.5) - 1.0).collect();
        let input = vec![left, right];
        let events = [
            RenderEvent::ramped_parameter(20, ParameterAddress::Depth.raw(), 15.0, 64),
            RenderEvent::parameter(55, ParameterAddress::Rate.raw(), 7.0),
            RenderEvent::ramped_parameter(90, ParameterAddress::Feedback.raw(), 85.0, 30),
            RenderEvent::parameter(120, ParameterAddress::NegativeFeedback.raw(), 1.0),
            RenderEvent::ramped_parameter(150, ParameterAddress::WetMix.raw(), 20.0, 0),
        ];

        let run = |evaluation| {
            let config = FlangeConfig::default()
                .with_waveform(Waveform::Sinusoid)
                .with_lfo_evaluation(evaluation);
            let mut engine = engine(config, 2);
            let kernel = engine.kernel_mut();
            kernel.set_parameter(ParameterAddress::Rate, 2.5, None);
            kernel.set_parameter(ParameterAddress::StereoPhaseOffset, 1.0, None);

            let first = render(&mut engine, 0, &input, &events);
            let second = render(&mut engine, 200, &input, &[]);
            (first, second)
        };

        assert_eq!(run(LfoEvaluation::PerSample), run(LfoEvaluation::Precomputed));
    }

    #[test]
    fn test_reset_clears_delay_history() {
        let mut engine = engine(FlangeConfig::default(), 1);
        comb(engine.kernel_mut(), 5.0);
        render(&mut engine, 0, &[impulse(4)], &[]);

        engine.reset();
        let output = render(&mut engine, 4, &[vec![0.0; 16]], &[]);
        assert!(output[0].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_reconfigure_keeps_parameters() {
        let mut engine = engine(FlangeConfig::default(), 2);
        engine
            .kernel_mut()
            .set_parameter(ParameterAddress::Delay, 7.5, Some(0));

        engine
            .start_processing(AudioFormat::new(48_000.0, 4), 512)
            .unwrap();

        assert_eq!(engine.kernel().channel_count(), 4);
        assert_eq!(engine.kernel().get_parameter(ParameterAddress::Delay), 7.5);
    }

    #[test]
    fn test_invalid_max_delay_is_rejected() {
        let mut engine = EventProcessor::new(FlangeKernel::new(
            FlangeConfig::default().with_max_delay_ms(-1.0),
        ));
        assert_eq!(
            engine.start_processing(AudioFormat::stereo(48_000.0), 64),
            Err(ConfigError::InvalidMaxDelay(-1.0))
        );
        assert!(!engine.is_processing());
    }
}
