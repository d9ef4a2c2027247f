//! Voxel buoyancy: asynchronous height sampling and force integration.

pub mod body;
mod force;
mod readback;
mod sampler;
mod voxel;

pub use body::{Aabb, BoxBody, RigidBodyProxy};
pub use force::{submerged_factor, ForceIntegrator, ForceReport};
pub use readback::{read_channel, FieldReadback, QueuedReadback, ReadCompleter, ReadStatus, ReadTicket};
pub use sampler::{BuoyancySampler, SampleReport};
pub use voxel::{PollOutcome, VoxelArena, VoxelId, VoxelPhase, VoxelRecord};
