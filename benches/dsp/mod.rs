//! Benchmarks for low-level DSP primitives.

mod delay;
mod lfo;
mod ramp;

pub use delay::bench_delay;
pub use lfo::bench_lfo;
pub use ramp::bench_ramp;
