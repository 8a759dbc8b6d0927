//! The flange effect: parameter address space, configuration and the
//! rendering kernel.

pub mod config;
pub mod kernel;
pub mod params;

pub use config::{FlangeConfig, LfoEvaluation};
pub use kernel::FlangeKernel;
pub use params::{
    FactoryPreset, ParameterAddress, ParameterDefinition, ParameterSnapshot, ParameterUnit,
    FACTORY_PRESETS,
};
