// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The vertex as it travels through the pipeline.
//!
//! All four attributes participate in interpolation as one algebraic
//! entity: every operator below is componentwise over the whole attribute
//! set, so any affine combination of vertices is again a valid vertex.
//! Perspective correction relies on this — the pipeline multiplies entire
//! vertices by `1/w` at viewport entry and divides them back per fragment.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use glam::{Vec2, Vec3, Vec4};

/// One vertex: clip-space position, surface normal, texture coordinate,
/// and the world-space position carried along for lighting.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec3,
    pub texcoord: Vec2,
    pub world_pos: Vec3,
}

impl Vertex {
    pub const fn new(position: Vec4, normal: Vec3, texcoord: Vec2, world_pos: Vec3) -> Self {
        Self {
            position,
            normal,
            texcoord,
            world_pos,
        }
    }

    /// Mesh-input constructor: `world_pos` defaults to the position, the
    /// shader overwrites it during transformation.
    pub fn at(position: Vec3, normal: Vec3, texcoord: Vec2) -> Self {
        Self {
            position: Vec4::new(position.x, position.y, position.z, 1.0),
            normal,
            texcoord,
            world_pos: position,
        }
    }
}

impl Add for Vertex {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            position: self.position + other.position,
            normal: self.normal + other.normal,
            texcoord: self.texcoord + other.texcoord,
            world_pos: self.world_pos + other.world_pos,
        }
    }
}

impl Sub for Vertex {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            position: self.position - other.position,
            normal: self.normal - other.normal,
            texcoord: self.texcoord - other.texcoord,
            world_pos: self.world_pos - other.world_pos,
        }
    }
}

impl Mul<f32> for Vertex {
    type Output = Self;
    #[inline]
    fn mul(self, scale: f32) -> Self {
        Self {
            position: self.position * scale,
            normal: self.normal * scale,
            texcoord: self.texcoord * scale,
            world_pos: self.world_pos * scale,
        }
    }
}

impl Div<f32> for Vertex {
    type Output = Self;
    #[inline]
    fn div(self, denom: f32) -> Self {
        self * (1.0 / denom)
    }
}

impl AddAssign for Vertex {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Vertex {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl MulAssign<f32> for Vertex {
    #[inline]
    fn mul_assign(&mut self, scale: f32) {
        *self = *self * scale;
    }
}

impl DivAssign<f32> for Vertex {
    #[inline]
    fn div_assign(&mut self, denom: f32) {
        *self = *self * (1.0 / denom);
    }
}
