//! Swellfloat library - FFT ocean wave field with voxel buoyancy
//!
//! The ocean side synthesizes a wave spectrum once, then evolves, inverse
//! transforms and assembles it every tick into periodic fields. The buoyancy
//! side samples the height field asynchronously per voxel and turns the
//! cached heights into forces on a rigid body.

pub mod buoyancy;
pub mod error;
pub mod export;
pub mod ocean;
pub mod params;
