//! Host-facing render engine: buffers, events and the block scheduler that
//! drives a [`Kernel`].

pub mod buffer;
pub mod event;
pub mod processor;
#[cfg(feature = "rtrb")]
pub mod queue;

pub use buffer::{AudioBufferList, BufferFacet, BufferFacetMut, PullBuffer};
pub use event::{EventKind, MidiEvent, ParameterEvent, RenderEvent, SampleTime};
pub use processor::{
    AudioFormat, BypassHandle, EventProcessor, Kernel, PullInput, RenderActionFlags,
};
#[cfg(feature = "rtrb")]
pub use queue::{EventQueue, EventSender};
