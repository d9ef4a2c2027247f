//! Per-body voxel sampling of the water height.

use log::{debug, warn};

use super::body::RigidBodyProxy;
use super::readback::FieldReadback;
use super::voxel::{PollOutcome, VoxelArena};
use crate::error::ConfigError;
use crate::ocean::HeightField;
use crate::params::VoxelGridConfig;

/// What one sampler tick did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleReport {
    /// False when the height field did not exist yet
    pub resource_available: bool,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub issued: usize,
}

/// Keeps one body's voxels fed with height reads.
///
/// Voxels are created on the first tick that sees a height field and dropped
/// by [`BuoyancySampler::disable`]; outstanding reads are abandoned then.
pub struct BuoyancySampler {
    grid: VoxelGridConfig,
    voxels: Option<VoxelArena>,
}

impl BuoyancySampler {
    pub fn new(grid: VoxelGridConfig) -> Result<Self, ConfigError> {
        grid.validate()?;
        Ok(Self { grid, voxels: None })
    }

    pub fn grid(&self) -> &VoxelGridConfig {
        &self.grid
    }

    /// Voxels, once the sampler has seen a height field
    pub fn voxels(&self) -> Option<&VoxelArena> {
        self.voxels.as_ref()
    }

    /// Poll every voxel once and issue follow-up reads. Never blocks.
    pub fn update<R, B>(
        &mut self,
        field: Option<&HeightField>,
        readback: &mut R,
        body: &B,
    ) -> SampleReport
    where
        R: FieldReadback + ?Sized,
        B: RigidBodyProxy + ?Sized,
    {
        let mut report = SampleReport::default();
        let Some(field) = field else {
            return report;
        };
        report.resource_available = true;

        let Some(voxels) = self.voxels.as_mut() else {
            let mut arena = VoxelArena::build(&self.grid, body.local_bounds());
            for (_, voxel) in arena.iter_mut() {
                let world = body.transform_point(voxel.rest_position());
                if voxel.issue(readback, field, world) {
                    report.issued += 1;
                }
            }
            debug!("Buoyancy: created {} voxels", arena.len());
            self.voxels = Some(arena);
            return report;
        };

        for (id, voxel) in voxels.iter_mut() {
            match voxel.poll() {
                PollOutcome::Pending => report.pending += 1,
                PollOutcome::Failed(error) => {
                    // Retried on the next tick from Idle
                    warn!("Buoyancy: voxel {}: {}", id.0, error);
                    report.failed += 1;
                }
                PollOutcome::Completed(_) => {
                    report.completed += 1;
                    let world = body.transform_point(voxel.rest_position());
                    if voxel.issue(readback, field, world) {
                        report.issued += 1;
                    }
                }
                PollOutcome::NeedsQuery => {
                    let world = body.transform_point(voxel.rest_position());
                    if voxel.issue(readback, field, world) {
                        report.issued += 1;
                    }
                }
            }
        }

        report
    }

    /// Drop all voxel state; completions arriving later are discarded
    pub fn disable(&mut self) {
        if self.voxels.take().is_some() {
            debug!("Buoyancy: voxels dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buoyancy::body::BoxBody;
    use crate::buoyancy::readback::QueuedReadback;
    use crate::ocean::Field2;
    use glam::Vec3;

    fn constant_field(height: f32) -> HeightField {
        let mut texels = Field2::<f32>::new(8);
        texels.as_mut_slice().fill(height);
        HeightField::new(texels, 25.0)
    }

    fn body() -> BoxBody {
        BoxBody::new(Vec3::new(10.0, 2.0, 5.0), 0.5, Vec3::ZERO)
    }

    #[test]
    fn test_idle_without_height_field() {
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::new(1);
        let report = sampler.update(None, &mut readback, &body());

        assert!(!report.resource_available);
        assert!(sampler.voxels().is_none());
        assert_eq!(readback.in_flight(), 0);
    }

    #[test]
    fn test_zero_voxel_grid_is_rejected() {
        let result = BuoyancySampler::new(VoxelGridConfig {
            voxels_per_axis: [2, 0, 2],
        });
        assert!(matches!(result, Err(ConfigError::ZeroVoxels { axis: 'y' })));
    }

    #[test]
    fn test_reads_refresh_cached_height() {
        let field = constant_field(0.75);
        let body = body();
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::new(1);

        let first = sampler.update(Some(&field), &mut readback, &body);
        assert_eq!(first.issued, 8);

        readback.pump();
        let second = sampler.update(Some(&field), &mut readback, &body);
        assert_eq!(second.completed, 8);
        assert_eq!(second.issued, 8);

        let voxels = sampler.voxels().unwrap();
        assert!(voxels.iter().all(|(_, v)| v.cached_height() == 0.75));
        assert_eq!(voxels.in_flight_count(), 8);
    }

    #[test]
    fn test_stalled_reads_keep_cache_and_single_request() {
        let field = constant_field(3.0);
        let body = body();
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::stalled();

        for _ in 0..50 {
            readback.pump();
            let report = sampler.update(Some(&field), &mut readback, &body);
            assert_eq!(report.completed, 0);
        }

        let voxels = sampler.voxels().unwrap();
        assert!(voxels.iter().all(|(_, v)| v.cached_height() == 0.0));
        assert_eq!(voxels.in_flight_count(), 8);
        assert_eq!(readback.in_flight(), 8);
    }

    #[test]
    fn test_failed_read_is_retried_next_tick() {
        let field = constant_field(1.0);
        let body = body();
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::new(1);

        readback.fail_next(8);
        sampler.update(Some(&field), &mut readback, &body);
        readback.pump();

        let failed = sampler.update(Some(&field), &mut readback, &body);
        assert_eq!(failed.failed, 8);
        assert_eq!(failed.issued, 0);
        assert_eq!(sampler.voxels().unwrap().in_flight_count(), 0);

        let retry = sampler.update(Some(&field), &mut readback, &body);
        assert_eq!(retry.issued, 8);

        readback.pump();
        sampler.update(Some(&field), &mut readback, &body);
        let voxels = sampler.voxels().unwrap();
        assert!(voxels.iter().all(|(_, v)| v.cached_height() == 1.0));
    }

    #[test]
    fn test_disable_discards_late_completions() {
        let field = constant_field(1.0);
        let body = body();
        let mut sampler = BuoyancySampler::new(VoxelGridConfig::default()).unwrap();
        let mut readback = QueuedReadback::new(2);

        sampler.update(Some(&field), &mut readback, &body);
        sampler.disable();
        assert!(sampler.voxels().is_none());

        readback.pump();
        readback.pump();
        assert_eq!(readback.discarded(), 8);
        assert_eq!(readback.in_flight(), 0);
    }
}
