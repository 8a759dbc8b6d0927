use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    buffer::{AudioBufferList, BufferFacet, BufferFacetMut, PullBuffer},
    event::{EventKind, MidiEvent, ParameterEvent, RenderEvent, SampleTime},
};
use crate::error::{ConfigError, RenderError};

/*
Sample-Accurate Event Processing
================================

A host hands the engine one block at a time, together with the events that
fall inside it. Applying every event at the top of the block would smear a
parameter change by up to a block length, so the block is cut at event
boundaries instead and the kernel renders each piece separately:

    block start                                        block end
    │                                                          │
    ├──────── segment ────────┼────── segment ──────┼─ segment ┤
                              ▲                     ▲
                          event @ t1            events @ t2 (two of them)

    now = timestamp
    while frames remain:
        segment = clamp(next_event.time - now, 0, remaining)
        render segment, advance now
        apply every event with time <= now

An event already in the past (time < timestamp) produces a zero-length
segment and lands before the first rendered frame. Events sharing a time are
applied together with no rendering in between. Events at or after the block
end belong to a later call and are left alone.

Upstream Input
--------------

Input is pulled once per block through a callback. A missing callback or a
failed pull aborts the call before a single output sample is written. Once
input is in hand nothing else in the call can fail.

Bypass
------

Bypass is an atomic flag read once per block. A bypassed block copies input
to output segment by segment but still applies the events, so a later
un-bypass resumes with current parameter values.
*/

/// Stream format fixed at configuration time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AudioFormat {
    pub sample_rate: f64,
    pub channel_count: usize,
}

impl AudioFormat {
    pub fn new(sample_rate: f64, channel_count: usize) -> Self {
        Self {
            sample_rate,
            channel_count,
        }
    }

    pub fn stereo(sample_rate: f64) -> Self {
        Self::new(sample_rate, 2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.channel_count == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        Ok(())
    }
}

/// Host flags passed through to the pull callback untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderActionFlags(pub u32);

/// Upstream input callback.
///
/// Arguments are the action flags, the block timestamp, the frame count, the
/// input bus number and the buffer to fill, already cut to the block length.
pub type PullInput<'a> = dyn FnMut(
        &mut RenderActionFlags,
        SampleTime,
        usize,
        usize,
        &mut PullBuffer<'_>,
    ) -> Result<(), RenderError>
    + 'a;

/// The DSP half of a processor. The engine owns scheduling; a kernel only
/// renders segments and reacts to events.
pub trait Kernel {
    /// Size internal state for `format`. Configuration path: may allocate.
    fn initialize(&mut self, format: &AudioFormat, max_frames: usize) -> Result<(), ConfigError>;

    /// Drop whatever `initialize` sized.
    fn release(&mut self) {}

    /// Clear audio history, keep parameter values.
    fn reset(&mut self) {}

    /// Called once per block before any segment is rendered.
    fn prepare_to_render(&mut self, _frame_count: usize) {}

    /// Render `frame_count` frames from `input` into `output`. Both views are
    /// already positioned at the segment's offset.
    fn do_rendering(
        &mut self,
        input: &BufferFacet<'_>,
        output: &mut BufferFacetMut<'_, '_>,
        frame_count: usize,
    );

    fn do_parameter_event(&mut self, event: &ParameterEvent);

    fn do_midi_event(&mut self, _event: &MidiEvent) {}
}

/// Shared bypass switch. Clone it into a control thread; the audio thread
/// reads it once per block.
#[derive(Debug, Clone, Default)]
pub struct BypassHandle(Arc<AtomicBool>);

impl BypassHandle {
    pub fn set(&self, bypassed: bool) {
        self.0.store(bypassed, Ordering::Relaxed);
    }

    pub fn is_bypassed(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives a [`Kernel`]: pulls input, splits blocks at event times, dispatches
/// events and handles bypass.
pub struct EventProcessor<K: Kernel> {
    kernel: K,
    format: Option<AudioFormat>,
    max_frames: usize,
    input: AudioBufferList,
    output: AudioBufferList,
    bypass: BypassHandle,
}

impl<K: Kernel> EventProcessor<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            format: None,
            max_frames: 0,
            input: AudioBufferList::new(),
            output: AudioBufferList::new(),
            bypass: BypassHandle::default(),
        }
    }

    /// Configure for `format` and blocks of up to `max_frames`. May be called
    /// again to reconfigure; the kernel keeps its parameter values.
    pub fn start_processing(
        &mut self,
        format: AudioFormat,
        max_frames: usize,
    ) -> Result<(), ConfigError> {
        let validated = format.validate().and_then(|()| {
            if max_frames == 0 {
                Err(ConfigError::ZeroMaxFrames)
            } else {
                Ok(())
            }
        });
        if let Err(err) = validated {
            warn!("rejecting configuration {format:?} / {max_frames} frames: {err}");
            return Err(err);
        }

        self.input.allocate(format.channel_count, max_frames);
        self.output.allocate(format.channel_count, max_frames);

        if let Err(err) = self.kernel.initialize(&format, max_frames) {
            warn!("kernel rejected configuration {format:?}: {err}");
            self.release_buffers();
            return Err(err);
        }

        self.format = Some(format);
        self.max_frames = max_frames;
        info!(
            "processing at {} Hz, {} channel(s), up to {} frames per call",
            format.sample_rate, format.channel_count, max_frames
        );
        Ok(())
    }

    /// Release buffers and kernel state. Render calls fail until the next
    /// `start_processing`.
    pub fn stop_processing(&mut self) {
        if self.format.take().is_some() {
            debug!("processing stopped, releasing buffers");
        }
        self.kernel.release();
        self.release_buffers();
    }

    fn release_buffers(&mut self) {
        self.input.release();
        self.output.release();
        self.format = None;
        self.max_frames = 0;
    }

    pub fn is_processing(&self) -> bool {
        self.format.is_some()
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.format
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Clear the kernel's audio history.
    pub fn reset(&mut self) {
        self.kernel.reset();
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn set_bypass(&self, bypassed: bool) {
        self.bypass.set(bypassed);
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass.is_bypassed()
    }

    pub fn bypass_handle(&self) -> BypassHandle {
        self.bypass.clone()
    }

    /// Engine-owned output, filled when `process_and_render` is given no
    /// destination.
    pub fn output(&self) -> &AudioBufferList {
        &self.output
    }

    /// Render one block.
    ///
    /// `events` must be ordered by time. With `output` set to `None` the block
    /// is rendered into the engine's own buffer, see [`Self::output`].
    pub fn process_and_render(
        &mut self,
        timestamp: SampleTime,
        frame_count: usize,
        input_bus: usize,
        output: Option<&mut [&mut [f32]]>,
        events: &[RenderEvent],
        pull_input: Option<&mut PullInput<'_>>,
    ) -> Result<(), RenderError> {
        if self.format.is_none() {
            return Err(RenderError::NotConfigured);
        }
        if frame_count > self.max_frames {
            return Err(RenderError::TooManyFrames {
                requested: frame_count,
                maximum: self.max_frames,
            });
        }
        if let Some(channels) = output.as_deref() {
            if let Some(available) = channels
                .iter()
                .map(|channel| channel.len())
                .filter(|&len| len < frame_count)
                .min()
            {
                return Err(RenderError::OutputTooShort {
                    required: frame_count,
                    available,
                });
            }
        }

        let pull_input = pull_input.ok_or(RenderError::UpstreamUnavailable)?;
        self.input.set_frame_count(frame_count);
        let mut flags = RenderActionFlags::default();
        pull_input(
            &mut flags,
            timestamp,
            frame_count,
            input_bus,
            &mut PullBuffer::new(&mut self.input),
        )?;

        let bypassed = self.bypass.is_bypassed();
        let mut destination = match output {
            Some(channels) => BufferFacetMut::host(channels, frame_count),
            None => {
                self.output.set_frame_count(frame_count);
                BufferFacetMut::owned(&mut self.output)
            }
        };
        let mut source = BufferFacet::new(&self.input);

        self.kernel.prepare_to_render(frame_count);
        render_segments(
            &mut self.kernel,
            &mut source,
            &mut destination,
            timestamp,
            frame_count,
            events,
            bypassed,
        );
        Ok(())
    }
}

fn render_segments<K: Kernel>(
    kernel: &mut K,
    input: &mut BufferFacet<'_>,
    output: &mut BufferFacetMut<'_, '_>,
    timestamp: SampleTime,
    frame_count: usize,
    events: &[RenderEvent],
    bypassed: bool,
) {
    let end = timestamp.saturating_add(frame_count as SampleTime);
    let mut now = timestamp;
    let mut processed = 0;
    let mut next = 0;

    while processed < frame_count {
        let remaining = frame_count - processed;
        let segment = match events.get(next) {
            Some(event) => event
                .time
                .saturating_sub(now)
                .clamp(0, remaining as SampleTime) as usize,
            None => remaining,
        };

        if segment > 0 {
            input.set_range(processed, segment);
            output.set_range(processed, segment);
            if bypassed {
                output.copy_from(input);
            } else {
                kernel.do_rendering(input, output, segment);
            }
            processed += segment;
            now = now.saturating_add(segment as SampleTime);
        }

        while let Some(event) = events.get(next) {
            if event.time > now || event.time >= end {
                break;
            }
            dispatch(kernel, event);
            next += 1;
        }
    }
}

#[inline]
fn dispatch<K: Kernel>(kernel: &mut K, event: &RenderEvent) {
    match &event.kind {
        EventKind::Parameter(parameter) => kernel.do_parameter_event(parameter),
        EventKind::Midi(midi) => kernel.do_midi_event(midi),
    }
}
