use thiserror::Error;

/// Rejected configuration. Only produced at the configuration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),
    #[error("channel count must be at least 1")]
    ZeroChannels,
    #[error("maximum frames per render call must be at least 1")]
    ZeroMaxFrames,
    #[error("maximum delay must be positive and finite, got {0} ms")]
    InvalidMaxDelay(f32),
}

/// Failure of a single render call. The call wrote no output.
///
/// `Copy` so that returning one from the audio thread never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no upstream input is connected")]
    UpstreamUnavailable,
    #[error("upstream input failed with status {0}")]
    UpstreamFailure(i32),
    #[error("render called without an active configuration")]
    NotConfigured,
    #[error("asked to render {requested} frames, configured maximum is {maximum}")]
    TooManyFrames { requested: usize, maximum: usize },
    #[error("output channel holds {available} frames, the call needs {required}")]
    OutputTooShort { required: usize, available: usize },
}

/// A raw parameter address outside the effect's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown parameter address {0}")]
pub struct UnknownParameter(pub u64);
