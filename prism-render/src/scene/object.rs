// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Drawable scene objects.

use std::sync::Arc;

use super::mesh::{Mesh, Sphere};
use super::transform::Transform;
use crate::shader::SharedShader;
use crate::texture::Texture;

/// Which triangle facing gets culled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CullMode {
    /// Draw both facings.
    None,
    /// Cull back faces (the default for closed meshes).
    #[default]
    Back,
    /// Cull front faces.
    Front,
}

/// A drawable object: mesh + texture + shader + transform.
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub mesh: Arc<Mesh>,
    pub texture: Arc<Texture>,
    pub shader: SharedShader,
    pub cull_mode: CullMode,
}

impl SceneObject {
    pub fn new(
        name: impl Into<String>,
        mesh: Arc<Mesh>,
        texture: Arc<Texture>,
        shader: SharedShader,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            mesh,
            texture,
            shader,
            cull_mode: CullMode::Back,
        }
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// The mesh bounding sphere carried into world space. Radius scales
    /// by the largest axis scale, conservative for non-uniform scaling.
    pub fn world_bounding_sphere(&self) -> Sphere {
        let scale = self.transform.scale();
        let max_scale = scale.x.abs().max(scale.y.abs()).max(scale.z.abs());
        Sphere {
            center: self
                .transform
                .matrix()
                .transform_point3(self.mesh.bounding_sphere.center),
            radius: self.mesh.bounding_sphere.radius * max_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::shader::{shared, test_support::FlatShader};
    use crate::texture::FilterMode;
    use crate::vertex::Vertex;
    use prism_common::{Color, Color32};

    fn test_object() -> SceneObject {
        let mesh = Arc::new(Mesh::from_vertices(vec![
            Vertex::at(Vec3::new(-1.0, 0.0, 0.0), Vec3::Y, Vec2::ZERO),
            Vertex::at(Vec3::new(1.0, 0.0, 0.0), Vec3::Y, Vec2::ZERO),
            Vertex::at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, Vec2::ZERO),
        ]));
        let texture = Arc::new(Texture::from_pixels(
            &[Color32::new(255, 255, 255, 255)],
            1,
            1,
            3,
            FilterMode::Point,
        ));
        SceneObject::new("obj", mesh, texture, shared(FlatShader::with_color(Color::WHITE)))
    }

    #[test]
    fn test_world_bounding_sphere_translates() {
        let mut obj = test_object();
        obj.transform.set_position(Vec3::new(10.0, 0.0, 0.0));
        let s = obj.world_bounding_sphere();
        assert!((s.center.x - 10.0).abs() < 0.5);
    }

    #[test]
    fn test_world_bounding_sphere_scales_radius() {
        let mut obj = test_object();
        let base = obj.world_bounding_sphere().radius;
        obj.transform.set_scale(Vec3::new(3.0, 1.0, 1.0));
        let scaled = obj.world_bounding_sphere().radius;
        assert!((scaled - base * 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_default_cull_mode_is_back() {
        assert_eq!(test_object().cull_mode, CullMode::Back);
    }
}
