pub mod dsp;
pub mod engine; // Block scheduling, host buffers and events
pub mod error;
pub mod flange; // The flange effect

pub use engine::{AudioFormat, BypassHandle, EventProcessor, Kernel, RenderEvent};
pub use error::{ConfigError, RenderError};
pub use flange::{FlangeConfig, FlangeKernel, ParameterAddress};

/// Largest render block a host is expected to ask for.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// A flanger driven by the sample-accurate event processor.
pub type Flanger = EventProcessor<FlangeKernel>;
