//! Error types for configuration and field readback.

use thiserror::Error;

/// Rejected configuration. Raised at construction time, never during a tick.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("resolution must be a power of two >= 2, got {0}")]
    ResolutionNotPowerOfTwo(usize),

    #[error("expected between 1 and 4 cascades, got {0}")]
    CascadeCount(usize),

    #[error("height cascade {index} out of range ({count} cascades)")]
    HeightCascadeOutOfRange { index: usize, count: usize },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("high_cutoff ({high}) must exceed low_cutoff ({low})")]
    CutoffRange { low: f32, high: f32 },

    #[error("voxel grid has zero voxels along {axis}")]
    ZeroVoxels { axis: char },

    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

/// A height readback completed with its error flag set
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("height readback at texel ({x}, {y}) failed")]
pub struct ReadError {
    pub x: usize,
    pub y: usize,
}

/// Writing a field to disk failed
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("field buffer does not match {size}x{size} texels")]
    SizeMismatch { size: usize },

    #[error("failed to encode image")]
    Image(#[from] image::ImageError),

    #[error("failed to write field")]
    Io(#[from] std::io::Error),
}
