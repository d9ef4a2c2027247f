//! Turns transformed layers into displacement, slope, foam and height fields.

use glam::{Vec2, Vec3};

use super::evolve::CHANNELS_PER_CASCADE;
use super::field::{DisplacementTexel, Field2, HeightField, SlopeTexel};
use super::ifft::FourierStack;
use crate::params::{FoamSettings, OceanConfig};

/// World-space placement of one cascade
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeLayout {
    pub tile_scale_m: f32,
    /// Contribution, already clamped to [0, 1]
    pub weight: f32,
}

/// Assembled spatial fields of one tick.
///
/// Displacement and slope stay per cascade; the weighted blend is evaluated
/// at lookup time because every cascade tiles at its own period.
#[derive(Clone, Debug)]
pub struct OceanFields {
    layouts: Vec<CascadeLayout>,
    displacement: Vec<Field2<DisplacementTexel>>,
    slope: Vec<Field2<SlopeTexel>>,
    height: HeightField,
    variation: Field2<f32>,
}

impl OceanFields {
    pub fn new(config: &OceanConfig) -> Self {
        let n = config.resolution;
        let layouts = config
            .cascades
            .iter()
            .map(|c| CascadeLayout {
                tile_scale_m: c.tile_scale_m,
                weight: c.weight(),
            })
            .collect::<Vec<_>>();

        Self {
            displacement: vec![Field2::new(n); layouts.len()],
            slope: vec![Field2::new(n); layouts.len()],
            height: HeightField::flat(n, config.height_tile_scale()),
            variation: Field2::new(n),
            layouts,
        }
    }

    pub fn layouts(&self) -> &[CascadeLayout] {
        &self.layouts
    }

    pub fn displacement(&self, cascade: usize) -> &Field2<DisplacementTexel> {
        &self.displacement[cascade]
    }

    pub fn slope(&self, cascade: usize) -> &Field2<SlopeTexel> {
        &self.slope[cascade]
    }

    /// The buoyancy height-query resource
    pub fn height(&self) -> &HeightField {
        &self.height
    }

    /// Large-scale variation mask in [0, 1] (render-only)
    pub fn variation(&self) -> &Field2<f32> {
        &self.variation
    }

    /// Weighted displacement of all cascades at a world XZ position
    pub fn sample_displacement(&self, world_xz: Vec2) -> Vec3 {
        self.layouts
            .iter()
            .zip(&self.displacement)
            .map(|(layout, field)| {
                let texel = field.sample(world_xz / layout.tile_scale_m);
                Vec3::from_array(texel.offset) * layout.weight
            })
            .sum()
    }

    /// Weighted surface gradient of all cascades at a world XZ position
    pub fn sample_slope(&self, world_xz: Vec2) -> Vec2 {
        self.layouts
            .iter()
            .zip(&self.slope)
            .map(|(layout, field)| {
                let texel = field.sample(world_xz / layout.tile_scale_m);
                Vec2::from_array(texel.slope) * layout.weight
            })
            .sum()
    }

    /// Weighted foam of all cascades at a world XZ position
    pub fn sample_foam(&self, world_xz: Vec2) -> f32 {
        self.layouts
            .iter()
            .zip(&self.displacement)
            .map(|(layout, field)| field.sample(world_xz / layout.tile_scale_m).foam * layout.weight)
            .sum()
    }
}

/// Writes per-cascade texels from the transformed stack, carrying foam across ticks
pub struct FieldAssembler {
    foam: FoamSettings,
    height_cascade: usize,
}

impl FieldAssembler {
    pub fn new(config: &OceanConfig) -> Self {
        Self {
            foam: config.foam,
            height_cascade: config.height_cascade,
        }
    }

    /// Assemble `stack` (already inverse transformed) into `fields`
    pub fn assemble(&self, stack: &FourierStack, fields: &mut OceanFields) {
        let n = stack.size();
        let [lambda_x, lambda_z] = self.foam.wave_sharp;
        let decay = (-self.foam.foam_decay_rate).exp();

        for cascade in 0..fields.layouts.len() {
            let base = cascade * CHANNELS_PER_CASCADE;
            let dx_dz = stack.layer(base);
            let dy_dxz = stack.layer(base + 1);
            let dyx_dyz = stack.layer(base + 2);
            let dxx_dzz = stack.layer(base + 3);

            let displacement = fields.displacement[cascade].as_mut_slice();
            let slope = fields.slope[cascade].as_mut_slice();

            for index in 0..n * n {
                let jacobian = (1.0 + lambda_x * dxx_dzz[index].re)
                    * (1.0 + lambda_z * dxx_dzz[index].im)
                    - lambda_x * lambda_z * dy_dxz[index].im * dy_dxz[index].im;

                let mut foam = (displacement[index].foam * decay).clamp(0.0, 1.0);
                let biased = (-(jacobian - self.foam.foam_bias)).max(0.0);
                if biased > 0.0 {
                    foam += self.foam.foam_add * biased.powf(self.foam.foam_power);
                }

                displacement[index] = DisplacementTexel {
                    offset: [
                        lambda_x * dx_dz[index].re,
                        dy_dxz[index].re,
                        lambda_z * dx_dz[index].im,
                    ],
                    foam,
                };
                slope[index] = SlopeTexel {
                    slope: [
                        dyx_dyz[index].re / (1.0 + (lambda_x * dxx_dzz[index].re).abs()),
                        dyx_dyz[index].im / (1.0 + (lambda_z * dxx_dzz[index].im).abs()),
                    ],
                };
            }
        }

        // Height query field: vertical displacement of one cascade, unweighted
        let heights = stack.layer(self.height_cascade * CHANNELS_PER_CASCADE + 1);
        for (texel, value) in fields
            .height
            .texels_mut()
            .as_mut_slice()
            .iter_mut()
            .zip(heights)
        {
            *texel = value.re;
        }

        let aux = stack.layer(stack.layers() - 1);
        for (texel, value) in fields.variation.as_mut_slice().iter_mut().zip(aux) {
            *texel = value.re.abs().powf(self.foam.variation_power).clamp(0.0, 1.0);
        }
    }
}
