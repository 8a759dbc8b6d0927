//! Low-level DSP primitives used by the render engine and the flange kernel.
//!
//! These components are allocation-free on their hot paths and realtime-safe,
//! making them safe to embed directly inside a kernel. Storage is sized when
//! the kernel is configured, never while rendering.

/// Power-of-two circular delay buffer with interpolated reads.
pub mod delay;
/// Low frequency oscillator with a quadrature companion.
pub mod lfo;
/// Linear parameter ramps and their unit wrappers.
pub mod ramp;

pub use delay::DelayBuffer;
pub use lfo::{Lfo, LfoState, Waveform};
pub use ramp::{BoolParameter, Milliseconds, Percentage, RampingParameter};
