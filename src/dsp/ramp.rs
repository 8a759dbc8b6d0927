//! Click-free parameter ramps.

/*
Ramped Parameters
=================

Jumping a gain or delay time from one value to another between two samples
produces a step in the waveform, heard as a click ("zipper noise" when it
happens repeatedly). A ramp spreads the change over N samples instead.

    value
      1.0 ┤            ●●●●●●●  target
          │        ●●●●
          │    ●●●●
      0.2 ┤●●●●                 start
          └──────────────────→ samples
               N frames

Per-sample step:

    step = (target - current) / N

Each rendered frame pulls exactly one value. On the N-th pull the value snaps
to the target, so accumulated floating point error never leaves the parameter
slightly off.

Settled vs. Transient
---------------------

Render code reads the transient value (`frame_value`). Everything else (the
parameter boundary, UI, snapshots) reads the settled value (`get`), which is
the target while a ramp is running. Observers never see half-way values.

Units
-----

The ramp itself is unit-less. The wrappers below fix one unit convention per
control:

  Percentage     boundary 0..100, stored 0..1
  Milliseconds   boundary and storage both in ms
  BoolParameter  boundary 0.0 / 1.0, stored as bool, no ramp
*/

/// A scalar that moves linearly to a new target over a number of frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampingParameter {
    value: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl RampingParameter {
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Begin moving toward `target` over `duration` frames.
    ///
    /// A zero duration snaps immediately.
    pub fn set(&mut self, target: f32, duration: u32) {
        self.target = target;
        if duration > 0 {
            self.step = (target - self.value) / duration as f32;
            self.remaining = duration;
        } else {
            self.value = target;
            self.step = 0.0;
            self.remaining = 0;
        }
    }

    /// Settled value: the target while ramping, the current value otherwise.
    #[inline]
    pub fn get(&self) -> f32 {
        if self.remaining > 0 {
            self.target
        } else {
            self.value
        }
    }

    /// Advance one frame and return the value for that frame.
    ///
    /// Call at most once per rendered sample.
    #[inline]
    pub fn frame_value(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.value = self.target;
            } else {
                self.value += self.step;
            }
        }
        self.value
    }

    /// Frames left before the ramp settles.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

impl Default for RampingParameter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Ramped control whose boundary unit is percent (0..100), stored as 0..1.
///
/// The boundary value is kept next to the ramp so it reads back exactly as
/// it was set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Percentage {
    ramp: RampingParameter,
    percent: f32,
}

impl Percentage {
    pub fn new(percent: f32) -> Self {
        Self {
            ramp: RampingParameter::new(percent / 100.0),
            percent,
        }
    }

    pub fn set(&mut self, percent: f32, duration: u32) {
        self.percent = percent;
        self.ramp.set(percent / 100.0, duration);
    }

    /// Settled value in percent.
    pub fn get(&self) -> f32 {
        self.percent
    }

    /// Per-frame value, normalized to 0..1.
    #[inline]
    pub fn frame_value(&mut self) -> f32 {
        self.ramp.frame_value()
    }
}

/// Ramped control stored directly in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Milliseconds(RampingParameter);

impl Milliseconds {
    pub fn new(milliseconds: f32) -> Self {
        Self(RampingParameter::new(milliseconds))
    }

    pub fn set(&mut self, milliseconds: f32, duration: u32) {
        self.0.set(milliseconds, duration);
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    #[inline]
    pub fn frame_value(&mut self) -> f32 {
        self.0.frame_value()
    }
}

/// On/off control. Anything above zero is on; reads back as 1.0 or 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolParameter(bool);

impl BoolParameter {
    pub fn new(on: bool) -> Self {
        Self(on)
    }

    pub fn set(&mut self, value: f32) {
        self.0 = value > 0.0;
    }

    pub fn get(&self) -> f32 {
        if self.0 {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.0
    }
}
