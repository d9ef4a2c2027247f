//! Parameter definitions with physical units and documented semantics.
//!
//! Every component gets its own immutable configuration struct:
//! - Physical units (meters, seconds, rad/m)
//! - Documented ranges and meanings
//! - `validate()` before anything is built from it

mod buoyancy;
mod ocean;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Re-export all types
pub use buoyancy::{BuoyancyConfig, ForceConfig, VoxelGridConfig};
pub use ocean::{CascadeConfig, FoamSettings, OceanConfig, SpectrumSettings, MAX_CASCADES};

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ocean: OceanConfig,
    pub buoyancy: BuoyancyConfig,
}

impl SimulationConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ocean.validate()?;
        self.buoyancy.validate()
    }
}
