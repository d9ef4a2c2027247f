//! Buoyancy voxel grid and force parameters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ocean::positive;
use crate::error::ConfigError;

/// Subdivision of a body's bounding box into sample voxels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelGridConfig {
    /// Voxel count along local X, Y and Z
    pub voxels_per_axis: [u32; 3],
}

impl Default for VoxelGridConfig {
    fn default() -> Self {
        Self {
            voxels_per_axis: [2, 2, 2],
        }
    }
}

impl VoxelGridConfig {
    pub fn voxel_count(&self) -> usize {
        self.voxels_per_axis.iter().map(|&n| n as usize).product()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, &count) in ['x', 'y', 'z'].iter().zip(&self.voxels_per_axis) {
            if count == 0 {
                return Err(ConfigError::ZeroVoxels { axis: *axis });
            }
        }
        Ok(())
    }
}

/// Force and damping response of a floating body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Gravity vector (m/s²); buoyancy pushes against it
    pub gravity: Vec3,

    /// Damping applied when fully out of the water
    pub baseline_damping: f32,

    /// Linear damping when fully submerged (0.1-20)
    pub linear_drag_max: f32,

    /// Angular damping when fully submerged (0.1-20)
    pub angular_drag_max: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            baseline_damping: 2.0,
            linear_drag_max: 8.0,
            angular_drag_max: 6.0,
        }
    }
}

impl ForceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("linear_drag_max", self.linear_drag_max)?;
        positive("angular_drag_max", self.angular_drag_max)?;
        Ok(())
    }
}

/// Complete buoyancy setup for one body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuoyancyConfig {
    pub grid: VoxelGridConfig,
    pub force: ForceConfig,
}

impl BuoyancyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.force.validate()
    }
}
