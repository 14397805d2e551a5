// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Position / rotation / scale with cached matrices.
//!
//! Every mutation bumps a version counter. Dependents (the camera's
//! view-projection cache, this transform's own matrix cache) remember the
//! version they were computed against and recompute when it disagrees —
//! no observer back-pointers.

use std::cell::Cell;

use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Clone, Copy)]
struct MatrixCache {
    version: u64,
    local: Mat4,
    inverse: Mat4,
}

/// A TRS transform.
#[derive(Clone)]
pub struct Transform {
    position: Vec3,
    scale: Vec3,
    rotation: Quat,
    version: u64,
    cache: Cell<MatrixCache>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            version: 1,
            cache: Cell::new(MatrixCache {
                version: 0, // stale, forces first compute
                local: Mat4::IDENTITY,
                inverse: Mat4::IDENTITY,
            }),
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.version += 1;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.version += 1;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.version += 1;
    }

    /// Euler rotation in degrees: yaw (y) applied first, then pitch (x),
    /// then roll (z).
    pub fn set_rotation_euler(&mut self, x_deg: f32, y_deg: f32, z_deg: f32) {
        self.set_rotation(Quat::from_euler(
            EulerRot::YXZ,
            y_deg.to_radians(),
            x_deg.to_radians(),
            z_deg.to_radians(),
        ));
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Monotonically increasing mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        self.cached().local
    }

    /// World-to-local matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.cached().inverse
    }

    fn cached(&self) -> MatrixCache {
        let cache = self.cache.get();
        if cache.version == self.version {
            return cache;
        }

        let inv_scale = Vec3::new(
            1.0 / self.scale.x,
            1.0 / self.scale.y,
            1.0 / self.scale.z,
        );
        let fresh = MatrixCache {
            version: self.version,
            local: Mat4::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            ),
            inverse: Mat4::from_scale(inv_scale)
                * Mat4::from_quat(self.rotation.inverse())
                * Mat4::from_translation(-self.position),
        };
        self.cache.set(fresh);
        fresh
    }
}
