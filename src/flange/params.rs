//! Parameter address space of the flanger.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::UnknownParameter;

/// Host-visible parameter keys. The discriminant is the raw address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterAddress {
    /// Upper bound of the delay sweep, in milliseconds.
    Depth = 0,
    /// LFO rate in Hz.
    Rate = 1,
    /// Lower bound of the delay sweep, in milliseconds.
    Delay = 2,
    Feedback = 3,
    DryMix = 4,
    WetMix = 5,
    /// Flip the sign of the feedback path.
    NegativeFeedback = 6,
    /// Drive odd channels from the LFO's quadrature output.
    StereoPhaseOffset = 7,
}

impl ParameterAddress {
    pub const ALL: [ParameterAddress; 8] = [
        ParameterAddress::Depth,
        ParameterAddress::Rate,
        ParameterAddress::Delay,
        ParameterAddress::Feedback,
        ParameterAddress::DryMix,
        ParameterAddress::WetMix,
        ParameterAddress::NegativeFeedback,
        ParameterAddress::StereoPhaseOffset,
    ];

    pub fn raw(self) -> u64 {
        self as u64
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn definition(self) -> &'static ParameterDefinition {
        &DEFINITIONS[self as usize]
    }
}

impl TryFrom<u64> for ParameterAddress {
    type Error = UnknownParameter;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or(UnknownParameter(raw))
    }
}

impl From<ParameterAddress> for u64 {
    fn from(address: ParameterAddress) -> Self {
        address.raw()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterUnit {
    Milliseconds,
    Hertz,
    Percent,
    Boolean,
}

/// Static description of one parameter, in boundary units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDefinition {
    pub address: ParameterAddress,
    pub identifier: &'static str,
    pub name: &'static str,
    pub unit: ParameterUnit,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParameterDefinition {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

static DEFINITIONS: [ParameterDefinition; 8] = [
    ParameterDefinition {
        address: ParameterAddress::Depth,
        identifier: "depth",
        name: "Depth",
        unit: ParameterUnit::Milliseconds,
        min: 0.0,
        max: 50.0,
        default: 5.0,
    },
    ParameterDefinition {
        address: ParameterAddress::Rate,
        identifier: "rate",
        name: "Rate",
        unit: ParameterUnit::Hertz,
        min: 0.01,
        max: 20.0,
        default: 0.25,
    },
    ParameterDefinition {
        address: ParameterAddress::Delay,
        identifier: "delay",
        name: "Delay",
        unit: ParameterUnit::Milliseconds,
        min: 0.0,
        max: 50.0,
        default: 1.0,
    },
    ParameterDefinition {
        address: ParameterAddress::Feedback,
        identifier: "feedback",
        name: "Feedback",
        unit: ParameterUnit::Percent,
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
    ParameterDefinition {
        address: ParameterAddress::DryMix,
        identifier: "dry",
        name: "Dry",
        unit: ParameterUnit::Percent,
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
    ParameterDefinition {
        address: ParameterAddress::WetMix,
        identifier: "wet",
        name: "Wet",
        unit: ParameterUnit::Percent,
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
    ParameterDefinition {
        address: ParameterAddress::NegativeFeedback,
        identifier: "negative_feedback",
        name: "-Feedback",
        unit: ParameterUnit::Boolean,
        min: 0.0,
        max: 1.0,
        default: 0.0,
    },
    ParameterDefinition {
        address: ParameterAddress::StereoPhaseOffset,
        identifier: "odd90",
        name: "Odd 90°",
        unit: ParameterUnit::Boolean,
        min: 0.0,
        max: 1.0,
        default: 0.0,
    },
];

/// Every parameter's boundary value at one instant.
///
/// A convenience for moving a full parameter set around (presets, UI sync),
/// not a persistence format.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSnapshot {
    pub depth: f32,
    pub rate: f32,
    pub delay: f32,
    pub feedback: f32,
    pub dry_mix: f32,
    pub wet_mix: f32,
    pub negative_feedback: bool,
    pub stereo_phase_offset: bool,
}

impl ParameterSnapshot {
    pub fn get(&self, address: ParameterAddress) -> f32 {
        match address {
            ParameterAddress::Depth => self.depth,
            ParameterAddress::Rate => self.rate,
            ParameterAddress::Delay => self.delay,
            ParameterAddress::Feedback => self.feedback,
            ParameterAddress::DryMix => self.dry_mix,
            ParameterAddress::WetMix => self.wet_mix,
            ParameterAddress::NegativeFeedback => f32::from(u8::from(self.negative_feedback)),
            ParameterAddress::StereoPhaseOffset => f32::from(u8::from(self.stereo_phase_offset)),
        }
    }

    pub fn set(&mut self, address: ParameterAddress, value: f32) {
        match address {
            ParameterAddress::Depth => self.depth = value,
            ParameterAddress::Rate => self.rate = value,
            ParameterAddress::Delay => self.delay = value,
            ParameterAddress::Feedback => self.feedback = value,
            ParameterAddress::DryMix => self.dry_mix = value,
            ParameterAddress::WetMix => self.wet_mix = value,
            ParameterAddress::NegativeFeedback => self.negative_feedback = value > 0.0,
            ParameterAddress::StereoPhaseOffset => self.stereo_phase_offset = value > 0.0,
        }
    }

    /// `(address, boundary value)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (ParameterAddress, f32)> + '_ {
        ParameterAddress::ALL
            .iter()
            .map(move |&address| (address, self.get(address)))
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        let mut snapshot = Self {
            depth: 0.0,
            rate: 0.0,
            delay: 0.0,
            feedback: 0.0,
            dry_mix: 0.0,
            wet_mix: 0.0,
            negative_feedback: false,
            stereo_phase_offset: false,
        };
        for address in ParameterAddress::ALL {
            snapshot.set(address, address.definition().default);
        }
        snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactoryPreset {
    pub name: &'static str,
    pub values: ParameterSnapshot,
}

const fn preset(
    name: &'static str,
    depth: f32,
    rate: f32,
    delay: f32,
    feedback: f32,
    stereo_phase_offset: bool,
) -> FactoryPreset {
    FactoryPreset {
        name,
        values: ParameterSnapshot {
            depth,
            rate,
            delay,
            feedback,
            dry_mix: 50.0,
            wet_mix: 50.0,
            negative_feedback: false,
            stereo_phase_offset,
        },
    }
}

/// Built-in starting points.
pub const FACTORY_PRESETS: [FactoryPreset; 6] = [
    preset("Flangie", 10.0, 0.14, 1.10, 20.0, false),
    preset("Sweeper", 10.0, 0.14, 1.51, 80.0, false),
    preset("Chorious", 6.4, 1.8, 3.23, 0.0, true),
    FactoryPreset {
        name: "Lord Tremolo",
        values: ParameterSnapshot {
            depth: 10.0,
            rate: 8.6,
            delay: 0.07,
            feedback: 90.0,
            dry_mix: 0.0,
            wet_mix: 100.0,
            negative_feedback: false,
            stereo_phase_offset: false,
        },
    },
    preset("Wide Flangie", 10.0, 0.14, 0.72, 50.0, true),
    preset("Wide Sweeper", 10.0, 0.14, 1.51, 80.0, true),
];
