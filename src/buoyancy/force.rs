//! Turns cached voxel heights into point forces and damping on a body.

use glam::Vec3;

use super::body::RigidBodyProxy;
use super::voxel::VoxelArena;
use crate::params::ForceConfig;

/// Fraction of a voxel under water, from its depth below the surface
pub fn submerged_factor(depth: f32, voxel_height: f32) -> f32 {
    (depth / voxel_height).clamp(0.0, 1.0)
}

/// Loads applied during one physics step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceReport {
    /// Average submerged factor over all voxels, in [0, 1]
    pub submerged_fraction: f32,
    pub total_force: Vec3,
    /// Torque of the applied forces about the center of mass
    pub torque: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Mass over bounding volume
    pub density: f32,
    /// Per-voxel force scale, (1 - density) / voxel count
    pub unit_force: f32,
}

pub struct ForceIntegrator {
    config: ForceConfig,
}

impl ForceIntegrator {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Apply buoyancy from the voxels' cached heights and set damping
    pub fn step<B: RigidBodyProxy + ?Sized>(&self, voxels: &VoxelArena, body: &mut B) -> ForceReport {
        let count = voxels.len();
        if count == 0 {
            return ForceReport::default();
        }

        let density = body.mass() / body.local_bounds().volume();
        let unit_force = (1.0 - density) / count as f32;
        let voxel_height = voxels.voxel_size().y;
        let center = body.center_of_mass();

        let mut submerged = 0.0;
        let mut total_force = Vec3::ZERO;
        let mut torque = Vec3::ZERO;

        for (_, voxel) in voxels.iter() {
            let world = body.transform_point(voxel.rest_position());
            let depth = voxel.cached_height() - world.y + voxel_height;
            submerged += submerged_factor(depth, voxel_height);

            let displacement = depth.max(0.0);
            let force = -self.config.gravity * displacement * unit_force;
            body.apply_force_at_point(force, world);

            total_force += force;
            torque += (world - center).cross(force);
        }

        let submerged_fraction = submerged / count as f32;
        let baseline = self.config.baseline_damping;
        let linear_damping = lerp(baseline, self.config.linear_drag_max, submerged_fraction);
        let angular_damping = lerp(baseline, self.config.angular_drag_max, submerged_fraction);
        body.set_damping(linear_damping, angular_damping);

        ForceReport {
            submerged_fraction,
            total_force,
            torque,
            linear_damping,
            angular_damping,
            density,
            unit_force,
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buoyancy::body::BoxBody;
    use crate::buoyancy::readback::QueuedReadback;
    use crate::buoyancy::sampler::BuoyancySampler;
    use crate::ocean::{Field2, HeightField};
    use crate::params::VoxelGridConfig;

    fn constant_field(height: f32) -> HeightField {
        let mut texels = Field2::<f32>::new(8);
        texels.as_mut_slice().fill(height);
        HeightField::new(texels, 25.0)
    }

    /// Run the sampler until every voxel holds a read of `water_height`
    fn settled_sampler(body: &BoxBody, water_height: f32) -> BuoyancySampler {
        let field = constant_field(water_height);
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::new(1);
        sampler.update(Some(&field), &mut readback, body);
        readback.pump();
        sampler.update(Some(&field), &mut readback, body);
        sampler
    }

    fn heavy_box(y: f32) -> BoxBody {
        BoxBody::new(Vec3::new(10.0, 2.0, 5.0), 500.0, Vec3::new(0.0, y, 0.0))
    }

    #[test]
    fn test_submerged_factor_is_monotonic() {
        let mut previous = submerged_factor(-5.0, 1.0);
        assert_eq!(previous, 0.0);
        for i in -40..40 {
            let factor = submerged_factor(i as f32 * 0.1, 1.0);
            if factor > 0.0 && factor < 1.0 {
                assert!(factor > previous);
            } else {
                assert!(factor >= previous);
            }
            previous = factor;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_body_above_water_gets_no_force() {
        let mut body = heavy_box(10.0);
        let sampler = settled_sampler(&body, 0.0);
        let integrator = ForceIntegrator::new(ForceConfig::default());

        let report = integrator.step(sampler.voxels().unwrap(), &mut body);
        assert_eq!(report.submerged_fraction, 0.0);
        assert_eq!(report.total_force, Vec3::ZERO);
        assert_eq!(body.pending_force(), Vec3::ZERO);
        assert_eq!(report.linear_damping, 2.0);
        assert_eq!(report.angular_damping, 2.0);
        assert_eq!(body.linear_damping, 2.0);
    }

    #[test]
    fn test_fully_submerged_dense_body_sinks() {
        let mut body = heavy_box(0.0);
        let sampler = settled_sampler(&body, 10.0);
        let config = ForceConfig::default();
        let integrator = ForceIntegrator::new(config);
        let voxels = sampler.voxels().unwrap();

        let report = integrator.step(voxels, &mut body);
        assert_eq!(report.submerged_fraction, 1.0);
        assert_eq!(report.linear_damping, config.linear_drag_max);
        assert_eq!(report.angular_damping, config.angular_drag_max);
        assert!((report.density - 5.0).abs() < 1e-5);
        assert!((report.unit_force + 0.5).abs() < 1e-6);

        let voxel_height = voxels.voxel_size().y;
        let expected: f32 = voxels
            .iter()
            .map(|(_, v)| {
                let depth = 10.0 - v.rest_position().y + voxel_height;
                -config.gravity.y * depth * report.unit_force
            })
            .sum();
        assert!(report.total_force.y < 0.0);
        assert!((report.total_force.y - expected).abs() < 1e-3);
        assert!((body.pending_force().y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_light_body_is_pushed_up_symmetrically() {
        let mut body = BoxBody::new(Vec3::new(10.0, 2.0, 5.0), 20.0, Vec3::ZERO);
        let sampler = settled_sampler(&body, 0.0);
        let integrator = ForceIntegrator::new(ForceConfig::default());

        let report = integrator.step(sampler.voxels().unwrap(), &mut body);
        assert!(report.total_force.y > 0.0);
        assert!(report.submerged_fraction > 0.0 && report.submerged_fraction < 1.0);
        assert!(report.torque.length() < 1e-3);
    }

    #[test]
    fn test_fraction_strictly_grows_as_body_sinks() {
        let integrator = ForceIntegrator::new(ForceConfig::default());
        let mut body = heavy_box(3.0);
        let sampler = settled_sampler(&body, 0.0);
        let voxels = sampler.voxels().unwrap();

        let mut previous = integrator.step(voxels, &mut body).submerged_fraction;
        assert_eq!(previous, 0.0);
        let mut partial_steps = 0;
        for step in 1..=40 {
            body.position.y = 3.0 - step as f32 * 0.125;
            let fraction = integrator.step(voxels, &mut body).submerged_fraction;
            if fraction > 0.0 && fraction < 1.0 {
                assert!(fraction > previous);
                partial_steps += 1;
            } else {
                assert!(fraction >= previous);
            }
            previous = fraction;
        }
        assert_eq!(previous, 1.0);
        assert!(partial_steps > 10);
    }
}
