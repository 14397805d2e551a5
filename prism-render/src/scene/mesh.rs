// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Triangle meshes and their bounding volumes.
//!
//! A mesh is a flat triangle list (every three vertices form one
//! triangle). The supplier contract: CCW winding in a left-handed Y-up
//! Z-forward space, positions in world-unit meters, unit-length normals,
//! texture V already flipped. Any unit scaling or V-flips are the
//! supplier's job; the renderer consumes vertices as-is.

use glam::Vec3;

use crate::vertex::Vertex;

/// A bounding sphere.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// A triangle mesh with precomputed bounds.
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub bounds: Aabb,
    pub bounding_sphere: Sphere,
}

impl Mesh {
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        let mut mesh = Self {
            vertices,
            bounds: Aabb::default(),
            bounding_sphere: Sphere::default(),
        };
        mesh.recalc_bounds();
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Recompute the AABB and the bounding sphere (centroid center,
    /// radius to the farthest vertex).
    pub fn recalc_bounds(&mut self) {
        if self.vertices.is_empty() {
            self.bounds = Aabb::default();
            self.bounding_sphere = Sphere::default();
            return;
        }

        let first = self.vertices[0].position.truncate();
        let mut min = first;
        let mut max = first;
        let mut center = first;

        for v in &self.vertices[1..] {
            let p = v.position.truncate();
            min = min.min(p);
            max = max.max(p);
            center += p;
        }
        center /= self.vertices.len() as f32;

        let mut radius_sq = 0.0f32;
        for v in &self.vertices {
            radius_sq = radius_sq.max(center.distance_squared(v.position.truncate()));
        }

        self.bounds = Aabb { min, max };
        self.bounding_sphere = Sphere {
            center,
            radius: radius_sq.sqrt(),
        };
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn tri(a: Vec3, b: Vec3, c: Vec3) -> Vec<Vertex> {
        [a, b, c]
            .iter()
            .map(|p| Vertex::at(*p, Vec3::Y, Vec2::ZERO))
            .collect()
    }

    #[test]
    fn test_bounds_of_unit_triangle() {
        let mesh = Mesh::from_vertices(tri(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ));
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.triangle_count(), 1);

        let s = mesh.bounding_sphere;
        // Every vertex inside the sphere.
        for v in &mesh.vertices {
            assert!(s.center.distance(v.position.truncate()) <= s.radius + 1e-6);
        }
    }

    #[test]
    fn test_empty_mesh_has_degenerate_bounds() {
        let mesh = Mesh::from_vertices(Vec::new());
        assert_eq!(mesh.bounding_sphere.radius, 0.0);
    }
}
