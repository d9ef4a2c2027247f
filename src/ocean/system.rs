//! High-level ocean system driving the per-tick pipeline.

use log::{debug, info};

use super::assemble::{FieldAssembler, OceanFields};
use super::evolve::TimeEvolver;
use super::field::HeightField;
use super::ifft::{FourierStack, InverseFftEngine};
use super::spectrum::SpectrumSynthesizer;
use crate::error::ConfigError;
use crate::params::OceanConfig;

/// Spectrum synthesis happens once at construction; every `update` only
/// evolves phase, transforms and assembles.
pub struct OceanSystem {
    config: OceanConfig,
    evolver: TimeEvolver,
    engine: InverseFftEngine,
    assembler: FieldAssembler,
    stack: FourierStack,
    fields: OceanFields,
    ticks: u64,
}

impl OceanSystem {
    /// Create new ocean system with specified parameters
    pub fn new(config: OceanConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let spectra = SpectrumSynthesizer::new(&config).synthesize(&config.cascades);
        let evolver = TimeEvolver::new(&config, spectra);
        let stack = FourierStack::new(config.resolution, evolver.layer_count());

        info!(
            "Ocean: {}x{} texels, {} cascades, seed {}",
            config.resolution,
            config.resolution,
            config.cascades.len(),
            config.seed
        );

        Ok(Self {
            engine: InverseFftEngine::new(config.resolution),
            assembler: FieldAssembler::new(&config),
            fields: OceanFields::new(&config),
            evolver,
            stack,
            config,
            ticks: 0,
        })
    }

    /// Run evolution → inverse FFT → assembly for simulation time `time_s`
    pub fn update(&mut self, time_s: f32) -> &OceanFields {
        self.evolver.evolve(time_s, &mut self.stack);
        self.engine.transform(&mut self.stack);
        self.assembler.assemble(&self.stack, &mut self.fields);
        self.ticks += 1;

        if self.ticks == 1 {
            debug!("Ocean: height field available");
        }

        &self.fields
    }

    pub fn config(&self) -> &OceanConfig {
        &self.config
    }

    /// Number of completed updates
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Assembled fields, once at least one update has run
    pub fn fields(&self) -> Option<&OceanFields> {
        (self.ticks > 0).then_some(&self.fields)
    }

    /// Height-query resource, once at least one update has run
    pub fn height_field(&self) -> Option<&HeightField> {
        self.fields().map(OceanFields::height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn small_ocean() -> OceanSystem {
        OceanSystem::new(OceanConfig {
            resolution: 16,
            ..OceanConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_height_field_unavailable_before_first_update() {
        let mut ocean = small_ocean();
        assert!(ocean.height_field().is_none());
        ocean.update(0.0);
        assert!(ocean.height_field().is_some());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = OceanSystem::new(OceanConfig {
            resolution: 24,
            ..OceanConfig::default()
        });
        assert!(matches!(result, Err(ConfigError::ResolutionNotPowerOfTwo(24))));

        let result = OceanSystem::new(OceanConfig {
            resolution: 16,
            low_cutoff: 0.0,
            ..OceanConfig::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::NonPositive {
                field: "low_cutoff",
                ..
            })
        ));
    }

    #[test]
    fn test_independent_runs_are_identical() {
        let mut a = small_ocean();
        let mut b = small_ocean();
        a.update(12.5);
        b.update(12.5);

        let ha = a.height_field().unwrap();
        let hb = b.height_field().unwrap();
        assert_eq!(ha, hb);
    }

    #[test]
    fn test_height_field_is_not_flat_and_finite() {
        let mut ocean = small_ocean();
        ocean.update(3.0);
        let height = ocean.height_field().unwrap();

        let values = height.texels().as_slice();
        assert!(values.iter().all(|v| v.is_finite()));
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max > min);
    }

    #[test]
    fn test_transformed_height_is_real() {
        let mut ocean = small_ocean();
        ocean.update(7.0);

        // Layer 1 packs Dy (real part) with ∂Dz/∂x; the variation layer is Dy alone
        let aux = ocean.stack.layer(ocean.stack.layers() - 1);
        let scale = aux.iter().map(|c| c.norm()).fold(0.0, f32::max).max(1e-12);
        for value in aux {
            assert!(value.im.abs() <= 1e-3 * scale);
        }
    }

    #[test]
    fn test_fields_tile_seamlessly() {
        let mut ocean = small_ocean();
        ocean.update(1.0);
        let height = ocean.height_field().unwrap();
        let fields = ocean.fields().unwrap();
        let tile = height.tile_scale_m();

        for i in 0..=20 {
            let v = i as f32 / 20.0;
            let texels = height.texels();
            assert_eq!(texels.sample(Vec2::new(0.0, v)), texels.sample(Vec2::new(1.0, v)));
            assert_eq!(texels.sample(Vec2::new(v, 0.0)), texels.sample(Vec2::new(v, 1.0)));

            let p = Vec3::new(v * 13.0, 0.0, v * -7.0);
            let wrapped = p + Vec3::new(tile, 0.0, 2.0 * tile);
            assert!((height.sample_world(p) - height.sample_world(wrapped)).abs() < 1e-3);
        }

        let d0 = fields.sample_displacement(Vec2::ZERO);
        assert!(d0.is_finite());
    }
}
