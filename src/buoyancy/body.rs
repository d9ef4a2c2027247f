//! Rigid-body seam: what buoyancy needs from a body, plus a simple box body.

use glam::{Quat, Vec3};

/// Axis-aligned box in a body's local, rotation-reset frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self {
            min: center - size * 0.5,
            max: center + size * 0.5,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn volume(&self) -> f32 {
        let size = self.size();
        size.x * size.y * size.z
    }
}

/// External body driven by buoyancy. The core applies forces and damping,
/// it never owns or integrates the body.
pub trait RigidBodyProxy {
    fn mass(&self) -> f32;

    /// Bounding box in the body's local frame with rotation reset to identity
    fn local_bounds(&self) -> Aabb;

    /// Body-local point to world space under the current pose
    fn transform_point(&self, local: Vec3) -> Vec3;

    /// World-space center of mass
    fn center_of_mass(&self) -> Vec3 {
        self.transform_point(Vec3::ZERO)
    }

    fn apply_force_at_point(&mut self, force: Vec3, world_point: Vec3);

    fn set_damping(&mut self, linear: f32, angular: f32);
}

/// Solid box with uniform density, integrated with semi-implicit Euler
#[derive(Clone, Debug)]
pub struct BoxBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub half_extents: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    force: Vec3,
    torque: Vec3,
}

impl BoxBody {
    pub fn new(size: Vec3, mass: f32, position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            half_extents: size * 0.5,
            linear_damping: 0.0,
            angular_damping: 0.05,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// Force accumulated since the last integration step
    pub fn pending_force(&self) -> Vec3 {
        self.force
    }

    /// Torque about the center of mass accumulated since the last step
    pub fn pending_torque(&self) -> Vec3 {
        self.torque
    }

    /// Diagonal of the local inertia tensor
    fn inertia_local(&self) -> Vec3 {
        let s = self.half_extents * 2.0;
        let k = self.mass / 12.0;
        Vec3::new(
            k * (s.y * s.y + s.z * s.z),
            k * (s.x * s.x + s.z * s.z),
            k * (s.x * s.x + s.y * s.y),
        )
    }

    /// Advance the pose by `dt`, applying gravity and the accumulated loads
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        let acceleration = self.force / self.mass + gravity;
        self.velocity += acceleration * dt;
        self.velocity *= 1.0 / (1.0 + dt * self.linear_damping);

        let torque_local = self.rotation.inverse() * self.torque;
        let angular_accel = self.rotation * (torque_local / self.inertia_local());
        self.angular_velocity += angular_accel * dt;
        self.angular_velocity *= 1.0 / (1.0 + dt * self.angular_damping);

        self.position += self.velocity * dt;
        if self.angular_velocity.length_squared() > 1e-12 {
            let delta = Quat::from_scaled_axis(self.angular_velocity * dt);
            self.rotation = (delta * self.rotation).normalize();
        }

        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }
}

impl RigidBodyProxy for BoxBody {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn local_bounds(&self) -> Aabb {
        Aabb {
            min: -self.half_extents,
            max: self.half_extents,
        }
    }

    fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    fn apply_force_at_point(&mut self, force: Vec3, world_point: Vec3) {
        self.force += force;
        self.torque += (world_point - self.position).cross(force);
    }

    fn set_damping(&mut self, linear: f32, angular: f32) {
        self.linear_damping = linear;
        self.angular_damping = angular;
    }
}
