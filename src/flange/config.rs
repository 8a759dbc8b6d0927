#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::Waveform, error::ConfigError};

/// How the kernel walks the LFO while rendering a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LfoEvaluation {
    /// Evaluate the LFO inside the frame loop.
    #[default]
    PerSample,
    /// Fill a row of delay positions per segment first, then run each channel
    /// over its row.
    Precomputed,
}

/// Effect-level settings fixed when the kernel is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlangeConfig {
    /// Longest delay the lines must hold. Sizes the delay buffers.
    pub max_delay_ms: f32,
    pub waveform: Waveform,
    /// Ramp applied to parameter changes that do not carry their own.
    pub default_ramp_frames: u32,
    pub lfo_evaluation: LfoEvaluation,
}

impl Default for FlangeConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: 50.0,
            waveform: Waveform::Triangle,
            default_ramp_frames: 480,
            lfo_evaluation: LfoEvaluation::PerSample,
        }
    }
}

impl FlangeConfig {
    pub fn with_max_delay_ms(mut self, max_delay_ms: f32) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_default_ramp_frames(mut self, frames: u32) -> Self {
        self.default_ramp_frames = frames;
        self
    }

    pub fn with_lfo_evaluation(mut self, evaluation: LfoEvaluation) -> Self {
        self.lfo_evaluation = evaluation;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_delay_ms.is_finite() || self.max_delay_ms <= 0.0 {
            return Err(ConfigError::InvalidMaxDelay(self.max_delay_ms));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = FlangeConfig::default()
            .with_max_delay_ms(20.0)
            .with_waveform(Waveform::Sinusoid)
            .with_default_ramp_frames(0)
            .with_lfo_evaluation(LfoEvaluation::Precomputed);

        assert_eq!(config.max_delay_ms, 20.0);
        assert_eq!(config.waveform, Waveform::Sinusoid);
        assert_eq!(config.default_ramp_frames, 0);
        assert_eq!(config.lfo_evaluation, LfoEvaluation::Precomputed);
    }

    #[test]
    fn test_max_delay_must_be_positive() {
        assert!(FlangeConfig::default().validate().is_ok());
        assert_eq!(
            FlangeConfig::default().with_max_delay_ms(0.0).validate(),
            Err(ConfigError::InvalidMaxDelay(0.0))
        );
        assert!(FlangeConfig::default()
            .with_max_delay_ms(f32::NAN)
            .validate()
            .is_err());
    }
}
