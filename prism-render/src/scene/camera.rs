// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Perspective camera with a cached view-projection matrix and frustum.
//!
//! The cache is keyed by the transform's version counter and a projection
//! version bumped by the setters; it recomputes whenever either disagrees.
//! Projection is left-handed with clip depth in `[0, 1]`, so the visible
//! volume in clip space is `-w ≤ x,y ≤ w`, `0 ≤ z ≤ w`.

use std::cell::Cell;

use glam::{Mat4, Vec4, Vec4Swizzles};

use super::mesh::Sphere;
use super::transform::Transform;

#[derive(Clone, Copy)]
struct CameraCache {
    transform_version: u64,
    projection_version: u64,
    view_projection: Mat4,
    frustum: [Vec4; 6],
}

/// A perspective camera.
pub struct Camera {
    pub transform: Transform,
    fov: f32,
    aspect: f32,
    near_plane: f32,
    far_plane: f32,
    projection_version: u64,
    cache: Cell<CameraCache>,
}

impl Camera {
    /// `fov` is the horizontal field of view in degrees.
    pub fn new(fov: f32, aspect: f32, near_plane: f32, far_plane: f32) -> Self {
        Self {
            transform: Transform::new(),
            fov,
            aspect,
            near_plane,
            far_plane,
            projection_version: 1,
            cache: Cell::new(CameraCache {
                transform_version: 0,
                projection_version: 0,
                view_projection: Mat4::IDENTITY,
                frustum: [Vec4::ZERO; 6],
            }),
        }
    }

    pub fn set_field_of_view(&mut self, fov: f32) {
        self.fov = fov;
        self.projection_version += 1;
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_version += 1;
    }

    pub fn set_near_plane(&mut self, near: f32) {
        self.near_plane = near;
        self.projection_version += 1;
    }

    pub fn set_far_plane(&mut self, far: f32) {
        self.far_plane = far;
        self.projection_version += 1;
    }

    pub fn field_of_view(&self) -> f32 {
        self.fov
    }

    pub fn projection_matrix(&self) -> Mat4 {
        // fov is horizontal; the vertical angle follows from the aspect
        // ratio (x scales by 1/tan(fov/2), y by aspect times that).
        let fov_y = 2.0 * ((self.fov.to_radians() * 0.5).tan() / self.aspect).atan();
        Mat4::perspective_lh(fov_y, self.aspect, self.near_plane, self.far_plane)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.cached().view_projection
    }

    /// Frustum test: false when the sphere is entirely behind any of the
    /// six planes. Degenerate spheres are never visible.
    pub fn can_see(&self, bounds: &Sphere) -> bool {
        if bounds.radius < f32::EPSILON {
            return false;
        }

        let frustum = self.cached().frustum;
        frustum.iter().all(|p| !in_back(p, bounds))
    }

    fn cached(&self) -> CameraCache {
        let cache = self.cache.get();
        if cache.transform_version == self.transform.version()
            && cache.projection_version == self.projection_version
        {
            return cache;
        }

        let vp = self.projection_matrix() * self.transform.inverse_matrix();

        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        // Plane extraction from the view-projection; near is r2 alone
        // because clip depth starts at zero.
        let frustum = [
            normalize_plane(r3 + r0), // left
            normalize_plane(r3 - r0), // right
            normalize_plane(r3 - r1), // top
            normalize_plane(r3 + r1), // bottom
            normalize_plane(r2),      // near
            normalize_plane(r3 - r2), // far
        ];

        let fresh = CameraCache {
            transform_version: self.transform.version(),
            projection_version: self.projection_version,
            view_projection: vp,
            frustum,
        };
        self.cache.set(fresh);
        fresh
    }
}

fn normalize_plane(p: Vec4) -> Vec4 {
    let len = p.xyz().length();
    if len > f32::EPSILON {
        p / len
    } else {
        p
    }
}

fn in_back(plane: &Vec4, sphere: &Sphere) -> bool {
    plane.xyz().dot(sphere.center) + plane.w < -sphere.radius
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn camera_at_origin() -> Camera {
        // Looking down +Z, 60° horizontal fov, 4:3.
        Camera::new(60.0, 4.0 / 3.0, 0.1, 100.0)
    }

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Sphere {
        Sphere {
            center: Vec3::new(x, y, z),
            radius: r,
        }
    }

    #[test]
    fn test_sees_sphere_ahead() {
        let cam = camera_at_origin();
        assert!(cam.can_see(&sphere(0.0, 0.0, 10.0, 1.0)));
    }

    #[test]
    fn test_rejects_sphere_behind() {
        let cam = camera_at_origin();
        assert!(!cam.can_see(&sphere(0.0, 0.0, -10.0, 1.0)));
    }

    #[test]
    fn test_rejects_sphere_beyond_far_plane() {
        let cam = camera_at_origin();
        assert!(!cam.can_see(&sphere(0.0, 0.0, 500.0, 1.0)));
    }

    #[test]
    fn test_rejects_sphere_far_off_axis() {
        let cam = camera_at_origin();
        assert!(!cam.can_see(&sphere(100.0, 0.0, 5.0, 1.0)));
    }

    #[test]
    fn test_sphere_straddling_plane_is_visible() {
        let cam = camera_at_origin();
        // Center outside the left plane, but radius reaches in.
        assert!(cam.can_see(&sphere(-10.0, 0.0, 5.0, 8.0)));
    }

    #[test]
    fn test_degenerate_sphere_is_invisible() {
        let cam = camera_at_origin();
        assert!(!cam.can_see(&sphere(0.0, 0.0, 10.0, 0.0)));
    }

    #[test]
    fn test_cache_follows_transform_version() {
        let mut cam = camera_at_origin();
        assert!(cam.can_see(&sphere(0.0, 0.0, 10.0, 1.0)));

        // Turn around: the same sphere is now behind.
        cam.transform.set_rotation_euler(0.0, 180.0, 0.0);
        assert!(!cam.can_see(&sphere(0.0, 0.0, 10.0, 1.0)));
        assert!(cam.can_see(&sphere(0.0, 0.0, -10.0, 1.0)));
    }

    #[test]
    fn test_projection_maps_into_zero_one_depth() {
        let cam = camera_at_origin();
        let clip_near = cam.projection_matrix() * Vec4::new(0.0, 0.0, 0.1, 1.0);
        let clip_far = cam.projection_matrix() * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert!(clip_near.z.abs() < 1e-4);
        assert!((clip_far.z / clip_far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_fov_is_horizontal() {
        // 90° horizontal fov at aspect 2: a point on the horizontal edge
        // of the frustum (x = z) projects to ndc x = ±1, and the vertical
        // half-extent is half the horizontal one.
        let cam = Camera::new(90.0, 2.0, 0.1, 100.0);
        let proj = cam.projection_matrix();

        let edge_x = proj * Vec4::new(5.0, 0.0, 5.0, 1.0);
        assert!((edge_x.x / edge_x.w - 1.0).abs() < 1e-4);

        let edge_y = proj * Vec4::new(0.0, 2.5, 5.0, 1.0);
        assert!((edge_y.y / edge_y.w - 1.0).abs() < 1e-4);
    }
}
