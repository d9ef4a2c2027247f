//! Periodic 2D fields and the height-query resource.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Integer texel address inside an N×N field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Texel {
    pub x: usize,
    pub y: usize,
}

/// Per-cascade displacement (meters) plus accumulated foam
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DisplacementTexel {
    pub offset: [f32; 3],
    pub foam: f32,
}

/// Per-cascade surface gradient (∂y/∂x, ∂y/∂z)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SlopeTexel {
    pub slope: [f32; 2],
}

/// Values that can be bilinearly filtered
pub trait Filterable: Copy + Default {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Filterable for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Filterable for DisplacementTexel {
    fn lerp(self, other: Self, t: f32) -> Self {
        let a = Vec3::from_array(self.offset);
        let b = Vec3::from_array(other.offset);
        Self {
            offset: a.lerp(b, t).to_array(),
            foam: self.foam.lerp(other.foam, t),
        }
    }
}

impl Filterable for SlopeTexel {
    fn lerp(self, other: Self, t: f32) -> Self {
        let a = Vec2::from_array(self.slope);
        let b = Vec2::from_array(other.slope);
        Self {
            slope: a.lerp(b, t).to_array(),
        }
    }
}

/// Square, periodic field. Indices and UVs wrap in both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2<T> {
    size: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Field2<T> {
    /// Create a zeroed field; `size` must be a power of two
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            size,
            data: vec![T::default(); size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        let mask = self.size - 1;
        self.data[(y & mask) * self.size + (x & mask)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let mask = self.size - 1;
        self.data[(y & mask) * self.size + (x & mask)] = value;
    }

    /// Row-major texels
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Texel containing `uv` after wrapping into [0, 1)
    pub fn texel_at(&self, uv: Vec2) -> Texel {
        let wrapped = uv - uv.floor();
        let n = self.size as f32;
        Texel {
            x: ((wrapped.x * n) as usize).min(self.size - 1),
            y: ((wrapped.y * n) as usize).min(self.size - 1),
        }
    }
}

impl<T: Filterable> Field2<T> {
    /// Bilinear lookup with repeat addressing, texel centers at (i + 0.5) / N
    pub fn sample(&self, uv: Vec2) -> T {
        let n = self.size as f32;
        let wrapped = uv - uv.floor();
        let p = wrapped * n - Vec2::splat(0.5);
        let base = p.floor();
        let frac = p - base;

        let size = self.size as i64;
        let x0 = (base.x as i64).rem_euclid(size) as usize;
        let y0 = (base.y as i64).rem_euclid(size) as usize;
        let x1 = (x0 + 1) % self.size;
        let y1 = (y0 + 1) % self.size;

        let top = self.get(x0, y0).lerp(self.get(x1, y0), frac.x);
        let bottom = self.get(x0, y1).lerp(self.get(x1, y1), frac.x);
        top.lerp(bottom, frac.y)
    }
}

/// Single-channel height field queried by buoyancy.
///
/// World position P maps to UV = frac(P.xz / tile_scale_m).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    texels: Field2<f32>,
    tile_scale_m: f32,
}

impl HeightField {
    pub fn new(texels: Field2<f32>, tile_scale_m: f32) -> Self {
        Self {
            texels,
            tile_scale_m,
        }
    }

    /// Flat field at height zero
    pub fn flat(size: usize, tile_scale_m: f32) -> Self {
        Self::new(Field2::new(size), tile_scale_m)
    }

    pub fn resolution(&self) -> usize {
        self.texels.size()
    }

    pub fn tile_scale_m(&self) -> f32 {
        self.tile_scale_m
    }

    pub fn texels(&self) -> &Field2<f32> {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut Field2<f32> {
        &mut self.texels
    }

    /// UV of a world position at this field's tile scale
    pub fn world_to_uv(&self, world: Vec3) -> Vec2 {
        Vec2::new(world.x, world.z) / self.tile_scale_m
    }

    /// Texel a point query for `world` should read
    pub fn texel_for_world(&self, world: Vec3) -> Texel {
        self.texels.texel_at(self.world_to_uv(world))
    }

    /// Point read of one texel (what an async readback returns)
    pub fn read(&self, texel: Texel) -> f32 {
        self.texels.get(texel.x, texel.y)
    }

    /// Filtered height at a world position
    pub fn sample_world(&self, world: Vec3) -> f32 {
        self.texels.sample(self.world_to_uv(world))
    }
}
