//! Ocean spectrum, cascade and foam parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of wave cascades (two statistical sets each)
pub const MAX_CASCADES: usize = 4;

/// Statistical wind-wave parameters feeding one JONSWAP evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumSettings {
    /// Energy multiplier (dimensionless, 0-5). A set with scale <= 0 is skipped.
    pub scale: f32,

    /// Wind speed U (m/s)
    pub wind_speed: f32,

    /// Wind direction (degrees, 0-360)
    pub wind_direction_deg: f32,

    /// Fetch: distance over which the wind has blown (m)
    pub fetch: f32,

    /// Blend between wide cos² spread (0) and swell-narrowed cos-2s spread (1)
    pub spread_blend: f32,

    /// Swell narrowing (clamped to [0.01, 1] at synthesis time)
    pub swell: f32,

    /// JONSWAP peak enhancement factor gamma (> 0)
    pub peak_enhancement: f32,

    /// Short-wave damping strength near Nyquist (0-1)
    pub short_waves_fade: f32,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            scale: 0.1,
            wind_speed: 10.0,
            wind_direction_deg: 0.0,
            fetch: 100.0,
            spread_blend: 0.8,
            swell: 0.6,
            peak_enhancement: 3.3,
            short_waves_fade: 0.2,
        }
    }
}

impl SpectrumSettings {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        scale: f32,
        wind_speed: f32,
        wind_direction_deg: f32,
        fetch: f32,
        spread_blend: f32,
        swell: f32,
        peak_enhancement: f32,
        short_waves_fade: f32,
    ) -> Self {
        Self {
            scale,
            wind_speed,
            wind_direction_deg,
            fetch,
            spread_blend,
            swell,
            peak_enhancement,
            short_waves_fade,
        }
    }

    /// Validate ranges that would otherwise produce NaN spectra
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("wind_speed", self.wind_speed)?;
        positive("fetch", self.fetch)?;
        positive("peak_enhancement", self.peak_enhancement)?;
        Ok(())
    }
}

/// One frequency-domain wave layer tiled at its own world-space period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// World-space period of the tile (meters): UV = frac(P / tile_scale_m)
    pub tile_scale_m: f32,

    /// Spectral patch size (meters), sets wavenumber spacing Δk = 2π / L
    pub length_scale_m: f32,

    /// Blend weight of this cascade (clamped to [0, 1] before use)
    pub contribution: f32,

    /// Two statistical sets whose spectral densities are summed
    pub spectra: [SpectrumSettings; 2],
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            tile_scale_m: 25.0,
            length_scale_m: 4.0,
            contribution: 0.8,
            spectra: [SpectrumSettings::default(); 2],
        }
    }
}

impl CascadeConfig {
    /// Contribution weight clamped to [0, 1]
    pub fn weight(&self) -> f32 {
        self.contribution.clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_scale_m", self.tile_scale_m)?;
        positive("length_scale_m", self.length_scale_m)?;
        for spectrum in &self.spectra {
            spectrum.validate()?;
        }
        Ok(())
    }
}

/// Foam accumulation and variation mask shaping (render-only outputs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoamSettings {
    /// Horizontal choppiness (lambda) along X and Z
    pub wave_sharp: [f32; 2],

    /// Jacobian bias: foam appears where J < bias
    pub foam_bias: f32,

    /// Exponent applied to the biased jacobian
    pub foam_power: f32,

    /// Foam injected per tick per unit of biased jacobian
    pub foam_add: f32,

    /// Exponential foam decay per tick
    pub foam_decay_rate: f32,

    /// Wavelength (meters) below which the variation mask is filtered out
    pub variation_range_m: f32,

    /// Exponent shaping the variation mask
    pub variation_power: f32,
}

impl Default for FoamSettings {
    fn default() -> Self {
        Self {
            wave_sharp: [0.4, 0.4],
            foam_bias: 0.2,
            foam_power: 1.5,
            foam_add: 0.1,
            foam_decay_rate: 0.05,
            variation_range_m: 3.0,
            variation_power: 3.0,
        }
    }
}

/// Global ocean synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    /// Texels per side of every field (power of two, shared by all cascades)
    pub resolution: usize,

    /// Gravitational acceleration (m/s²)
    pub gravity: f32,

    /// Water depth used by the dispersion relation (m)
    pub depth: f32,

    /// Time multiplier (dimensionless)
    pub speed: f32,

    /// Period after which the surface repeats exactly (s)
    pub repeat_time_s: f32,

    /// Wavenumbers below this carry no energy (rad/m)
    pub low_cutoff: f32,

    /// Wavenumbers above this carry no energy (rad/m)
    pub high_cutoff: f32,

    /// Random seed for spectrum amplitudes
    pub seed: u32,

    /// Index of the cascade exported as the buoyancy height field
    pub height_cascade: usize,

    pub foam: FoamSettings,

    /// Up to four cascades
    pub cascades: Vec<CascadeConfig>,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            gravity: 9.81,
            depth: 10.0,
            speed: 0.5,
            repeat_time_s: 200.0,
            low_cutoff: 0.0001,
            high_cutoff: 9000.0,
            seed: 28,
            height_cascade: 0,
            foam: FoamSettings::default(),
            cascades: default_cascades(),
        }
    }
}

impl OceanConfig {
    /// Validate configuration (resolution must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution < 2 || !self.resolution.is_power_of_two() {
            return Err(ConfigError::ResolutionNotPowerOfTwo(self.resolution));
        }
        if self.cascades.is_empty() || self.cascades.len() > MAX_CASCADES {
            return Err(ConfigError::CascadeCount(self.cascades.len()));
        }
        if self.height_cascade >= self.cascades.len() {
            return Err(ConfigError::HeightCascadeOutOfRange {
                index: self.height_cascade,
                count: self.cascades.len(),
            });
        }
        positive("gravity", self.gravity)?;
        positive("depth", self.depth)?;
        positive("repeat_time_s", self.repeat_time_s)?;
        positive("low_cutoff", self.low_cutoff)?;
        if self.high_cutoff.is_nan() || self.high_cutoff <= self.low_cutoff {
            return Err(ConfigError::CutoffRange {
                low: self.low_cutoff,
                high: self.high_cutoff,
            });
        }
        for cascade in &self.cascades {
            cascade.validate()?;
        }
        Ok(())
    }

    /// Tile scale of the cascade backing the height field
    pub fn height_tile_scale(&self) -> f32 {
        self.cascades[self.height_cascade].tile_scale_m
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Four-layer setup: swell, mid-range chop and two detail layers
fn default_cascades() -> Vec<CascadeConfig> {
    vec![
        CascadeConfig {
            tile_scale_m: 1.0 / 0.04,
            length_scale_m: 4.0,
            contribution: 0.8,
            spectra: [
                SpectrumSettings::new(0.4, 1200.0, 130.0, 600.0, 1.0, 0.9, 5.0, 0.8),
                SpectrumSettings::new(0.4, 1000.0, 50.0, 500.0, 1.0, 0.9, 5.0, 0.8),
            ],
        },
        CascadeConfig {
            tile_scale_m: 1.0 / 0.06,
            length_scale_m: 4.0,
            contribution: 0.8,
            spectra: [
                SpectrumSettings::new(0.1, 800.0, 45.0, 400.0, 0.98, 0.9, 5.0, 0.4),
                SpectrumSettings::new(0.1, 800.0, 135.0, 350.0, 0.98, 0.9, 5.0, 0.4),
            ],
        },
        CascadeConfig {
            tile_scale_m: 1.0 / 0.12,
            length_scale_m: 4.0,
            contribution: 0.6,
            spectra: [
                SpectrumSettings::new(0.04, 100.0, 260.0, 100.0, 0.95, 0.8, 3.0, 0.4),
                SpectrumSettings::new(0.04, 50.0, 280.0, 100.0, 0.95, 0.8, 3.0, 0.4),
            ],
        },
        CascadeConfig {
            tile_scale_m: 1.0 / 0.18,
            length_scale_m: 4.0,
            contribution: 0.4,
            spectra: [
                SpectrumSettings::new(0.1, 10.0, 0.0, 40.0, 0.8, 0.6, 1.0, 0.2),
                SpectrumSettings::new(0.1, 10.0, 0.0, 20.0, 0.6, 0.4, 1.0, 0.2),
            ],
        },
    ]
}
