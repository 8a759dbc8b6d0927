//! Low Frequency Oscillator (LFO) with a quadrature companion.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio rates (~0.01 - 20 Hz). In a
flanger it sweeps the delay time back and forth, which moves the comb-filter
notches up and down the spectrum and produces the "jet plane" whoosh.

Vocabulary
----------

  phase         Position inside one cycle, kept in [0, 1).

  increment     How far the phase moves per sample:
                    increment = frequency / sample_rate
                A negative frequency runs the cycle backwards.

  quadrature    A companion reading taken a quarter cycle (90°) ahead.
                Feeding the left channel from the in-phase value and the
                right channel from the quadrature value decorrelates the
                stereo image.

  bipolar       Output swings -1.0 .. +1.0. All waveforms here are bipolar.

  unipolar      Output swings 0.0 .. 1.0:
                    unipolar = (bipolar + 1.0) * 0.5


Phase Accumulator
-----------------

Every sample:

    phase += increment
    if increment > 0 and phase >= 1  →  phase -= 1
    if increment < 0 and phase <  0  →  phase += 1

The quadrature phase is always (phase + 0.25) wrapped into [0, 1). Both are
updated together so the two readings can never drift apart.


Waveforms
---------

  SINUSOID   Parabolic approximation of sin(2π·phase). Two multiplies and
             an abs, no transcendental call, worst error around 0.1%.

  TRIANGLE   Linear up and down. Constant sweep speed, the classic flanger
             shape.

                 1 ●           ●
                    ╲         ╱
                     ╲       ╱
                -1    ●─────●       (phase 0.5 is the trough)

  SAWTOOTH   Linear ramp -1 → +1, then snap back.

The waveform is chosen at configuration time. Evaluation dispatches through a
plain function pointer picked once, not a match per sample.


Save and Restore
----------------

`save_state` / `restore_state` snapshot the phase. A block renderer can walk
the in-phase trajectory for N frames, rewind, and walk the quadrature
trajectory for the same N frames without recomputing anything else.
*/

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

/// Calculate samples per LFO period.
///
/// # Example
/// ```
/// use flange_dsp::dsp::lfo::samples_per_period;
/// let samples = samples_per_period(5.0, 48000.0);
/// assert_eq!(samples, 9600.0); // 5 Hz at 48kHz = 9600 samples
/// ```
#[inline]
pub fn samples_per_period(frequency_hz: f32, sample_rate: f32) -> f32 {
    sample_rate / frequency_hz
}

/// Fast sine approximation for `angle` in [-π, π].
#[inline]
pub fn parabolic_sine(angle: f64) -> f64 {
    const B: f64 = 4.0 / PI;
    const C: f64 = -4.0 / (PI * PI);
    const P: f64 = 0.225;

    let y = B * angle + C * angle * angle.abs();
    P * (y * y.abs() - y) + y
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    Sinusoid,
    #[default]
    Triangle,
    Sawtooth,
}

impl Waveform {
    fn generator(self) -> fn(f64) -> f32 {
        match self {
            Waveform::Sinusoid => sine_value,
            Waveform::Triangle => triangle_value,
            Waveform::Sawtooth => sawtooth_value,
        }
    }
}

fn sine_value(phase: f64) -> f32 {
    parabolic_sine(PI - phase * 2.0 * PI) as f32
}

fn triangle_value(phase: f64) -> f32 {
    (2.0 * (2.0 * phase - 1.0).abs() - 1.0) as f32
}

fn sawtooth_value(phase: f64) -> f32 {
    (2.0 * phase - 1.0) as f32
}

/// Opaque phase snapshot produced by [`Lfo::save_state`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoState(f64);

/// Phase-accumulating oscillator.
///
/// Phase is accumulated in f64 so that long sessions and very slow rates do
/// not drift.
#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f64,
    frequency: f64,
    waveform: Waveform,
    generator: fn(f64) -> f32,
    phase: f64,
    quad_phase: f64,
    increment: f64,
}

impl Lfo {
    pub fn new(sample_rate: f64, frequency: f64, waveform: Waveform) -> Self {
        let mut lfo = Self {
            sample_rate,
            frequency,
            waveform,
            generator: waveform.generator(),
            phase: 0.0,
            quad_phase: 0.25,
            increment: 0.0,
        };
        lfo.reset();
        lfo
    }

    /// Adopt a new sample rate and frequency, then rewind.
    pub fn initialize(&mut self, sample_rate: f64, frequency: f64) {
        self.sample_rate = sample_rate;
        self.frequency = frequency;
        self.reset();
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Change rate. Applies from the next advance; the current phase is kept.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.increment = frequency / self.sample_rate;
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Recompute the increment and move the phase back to the cycle start.
    pub fn reset(&mut self) {
        self.increment = self.frequency / self.sample_rate;
        self.set_phase(0.0);
    }

    pub fn save_state(&self) -> LfoState {
        LfoState(self.phase)
    }

    pub fn restore_state(&mut self, state: LfoState) {
        self.set_phase(state.0);
    }

    /// Current in-phase value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        (self.generator)(self.phase)
    }

    /// Current value a quarter cycle ahead, without advancing.
    #[inline]
    pub fn quad_phase_value(&self) -> f32 {
        (self.generator)(self.quad_phase)
    }

    /// Advance both phases by one sample.
    #[inline]
    pub fn increment(&mut self) {
        let next = wrap(self.phase + self.increment, self.increment);
        self.set_phase(next);
    }

    /// Return the in-phase value, then advance.
    #[inline]
    pub fn value_and_increment(&mut self) -> f32 {
        let value = self.value();
        self.increment();
        value
    }

    /// Return the quadrature value, then advance.
    #[inline]
    pub fn quad_phase_value_and_increment(&mut self) -> f32 {
        let value = self.quad_phase_value();
        self.increment();
        value
    }

    #[inline]
    fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
        self.quad_phase = wrap(phase + 0.25, 0.25);
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(44_100.0, 1.0, Waveform::default())
    }
}

#[inline]
fn wrap(phase: f64, increment: f64) -> f64 {
    if increment > 0.0 && phase >= 1.0 {
        phase - 1.0
    } else if increment < 0.0 && phase < 0.0 {
        phase + 1.0
    } else {
        phase
    }
}
