//! Voxel arena: sample points inside a body's bounds and their query state.

use glam::{UVec3, Vec3};

use super::body::Aabb;
use super::readback::{FieldReadback, ReadStatus, ReadTicket};
use crate::error::ReadError;
use crate::ocean::HeightField;
use crate::params::VoxelGridConfig;

/// Index of a voxel inside its arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelId(pub usize);

/// Query state of one voxel
#[derive(Debug, Default)]
pub enum VoxelPhase {
    /// No read outstanding; a new query may be issued
    #[default]
    Idle,
    QueryInFlight(ReadTicket),
    /// Last read landed in the cache; waiting for the next issue
    Ready,
}

/// What a poll observed
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PollOutcome {
    /// Read still outstanding, cached height is stale but usable
    Pending,
    Completed(f32),
    Failed(ReadError),
    /// Nothing in flight
    NeedsQuery,
}

#[derive(Debug)]
pub struct VoxelRecord {
    rest_position: Vec3,
    cached_height: f32,
    phase: VoxelPhase,
}

impl VoxelRecord {
    fn new(rest_position: Vec3) -> Self {
        Self {
            rest_position,
            cached_height: 0.0,
            phase: VoxelPhase::Idle,
        }
    }

    /// Cell center in the body's local, rotation-reset frame
    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }

    /// Most recent successfully read water height
    pub fn cached_height(&self) -> f32 {
        self.cached_height
    }

    pub fn phase(&self) -> &VoxelPhase {
        &self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, VoxelPhase::QueryInFlight(_))
    }

    /// Non-blocking check of the outstanding read. A finished read moves
    /// the voxel to `Ready` (success) or `Idle` (error).
    pub fn poll(&mut self) -> PollOutcome {
        let status = match &self.phase {
            VoxelPhase::QueryInFlight(ticket) => ticket.poll(),
            VoxelPhase::Idle | VoxelPhase::Ready => return PollOutcome::NeedsQuery,
        };

        match status {
            ReadStatus::Pending => PollOutcome::Pending,
            ReadStatus::Ready(height) => {
                self.cached_height = height;
                self.phase = VoxelPhase::Ready;
                PollOutcome::Completed(height)
            }
            ReadStatus::Failed(error) => {
                self.phase = VoxelPhase::Idle;
                PollOutcome::Failed(error)
            }
        }
    }

    /// Request the texel under `world_position`. Returns false, leaving the
    /// voxel untouched, while a query is already outstanding.
    pub fn issue<R: FieldReadback + ?Sized>(
        &mut self,
        readback: &mut R,
        field: &HeightField,
        world_position: Vec3,
    ) -> bool {
        if self.is_in_flight() {
            return false;
        }
        let texel = field.texel_for_world(world_position);
        self.phase = VoxelPhase::QueryInFlight(readback.request(field, texel));
        true
    }
}

/// Voxels of one body laid out on a regular grid over its bounds
#[derive(Debug)]
pub struct VoxelArena {
    counts: UVec3,
    voxel_size: Vec3,
    records: Vec<VoxelRecord>,
}

impl VoxelArena {
    /// Subdivide `bounds` into the configured cells, x-major then y then z
    pub fn build(grid: &VoxelGridConfig, bounds: Aabb) -> Self {
        let counts = UVec3::from_array(grid.voxels_per_axis);
        let voxel_size = bounds.size() / counts.as_vec3();

        let mut records = Vec::with_capacity(grid.voxel_count());
        for x in 0..counts.x {
            for y in 0..counts.y {
                for z in 0..counts.z {
                    let cell = UVec3::new(x, y, z).as_vec3() + Vec3::splat(0.5);
                    records.push(VoxelRecord::new(bounds.min + voxel_size * cell));
                }
            }
        }

        Self {
            counts,
            voxel_size,
            records,
        }
    }

    pub fn counts(&self) -> UVec3 {
        self.counts
    }

    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: VoxelId) -> Option<&VoxelRecord> {
        self.records.get(id.0)
    }

    pub fn get_mut(&mut self, id: VoxelId) -> Option<&mut VoxelRecord> {
        self.records.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoxelId, &VoxelRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (VoxelId(index), record))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VoxelId, &mut VoxelRecord)> {
        self.records
            .iter_mut()
            .enumerate()
            .map(|(index, record)| (VoxelId(index), record))
    }

    pub fn in_flight_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_in_flight()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buoyancy::readback::QueuedReadback;
    use crate::ocean::Field2;

    fn grid(x: u32, y: u32, z: u32) -> VoxelGridConfig {
        VoxelGridConfig {
            voxels_per_axis: [x, y, z],
        }
    }

    #[test]
    fn test_rest_positions_are_cell_centers() {
        let bounds = Aabb::from_center_size(Vec3::ZERO, Vec3::new(10.0, 2.0, 5.0));
        let arena = VoxelArena::build(&grid(2, 2, 2), bounds);

        assert_eq!(arena.len(), 8);
        assert_eq!(arena.voxel_size(), Vec3::new(5.0, 1.0, 2.5));
        let first = arena.get(VoxelId(0)).unwrap();
        assert_eq!(first.rest_position(), Vec3::new(-2.5, -0.5, -1.25));
        // z varies fastest
        let second = arena.get(VoxelId(1)).unwrap();
        assert_eq!(second.rest_position(), Vec3::new(-2.5, -0.5, 1.25));
        let last = arena.get(VoxelId(7)).unwrap();
        assert_eq!(last.rest_position(), Vec3::new(2.5, 0.5, 1.25));
    }

    #[test]
    fn test_grid_construction_is_idempotent() {
        let bounds = Aabb::from_center_size(Vec3::new(1.0, 0.0, -3.0), Vec3::new(4.0, 3.0, 6.0));
        let a = VoxelArena::build(&grid(3, 1, 4), bounds);
        let b = VoxelArena::build(&grid(3, 1, 4), bounds);

        let pa: Vec<_> = a.iter().map(|(_, r)| r.rest_position()).collect();
        let pb: Vec<_> = b.iter().map(|(_, r)| r.rest_position()).collect();
        assert_eq!(pa, pb);
        assert_eq!(pa.len(), 12);
    }

    #[test]
    fn test_issue_refuses_second_query() {
        let mut texels = Field2::<f32>::new(4);
        texels.as_mut_slice().fill(1.5);
        let field = HeightField::new(texels, 8.0);
        let mut readback = QueuedReadback::new(1);
        let mut arena = VoxelArena::build(&grid(1, 1, 1), Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));
        let voxel = arena.get_mut(VoxelId(0)).unwrap();

        assert_eq!(voxel.poll(), PollOutcome::NeedsQuery);
        assert!(voxel.issue(&mut readback, &field, Vec3::ZERO));
        assert!(!voxel.issue(&mut readback, &field, Vec3::ZERO));
        assert_eq!(readback.in_flight(), 1);
        assert_eq!(voxel.poll(), PollOutcome::Pending);

        readback.pump();
        assert_eq!(voxel.poll(), PollOutcome::Completed(1.5));
        assert_eq!(voxel.cached_height(), 1.5);
        assert!(matches!(voxel.phase(), VoxelPhase::Ready));
    }

    #[test]
    fn test_failed_read_keeps_cache_and_goes_idle() {
        let mut texels = Field2::<f32>::new(4);
        texels.as_mut_slice().fill(2.0);
        let field = HeightField::new(texels, 8.0);
        let mut readback = QueuedReadback::new(1);
        let mut arena = VoxelArena::build(&grid(1, 1, 1), Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));
        let voxel = arena.get_mut(VoxelId(0)).unwrap();

        voxel.issue(&mut readback, &field, Vec3::ZERO);
        readback.pump();
        voxel.poll();

        readback.fail_next(1);
        voxel.issue(&mut readback, &field, Vec3::ZERO);
        readback.pump();
        assert!(matches!(voxel.poll(), PollOutcome::Failed(_)));
        assert!(matches!(voxel.phase(), VoxelPhase::Idle));
        assert_eq!(voxel.cached_height(), 2.0);
    }
}
