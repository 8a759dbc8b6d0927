//! Full render-call benchmarks.
//!
//! These drive the flange kernel through the event processor the way a host
//! would: pull input, split at events, render.

mod render;

pub use render::bench_render;
