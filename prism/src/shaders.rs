// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The demo's shader programs.
//!
//! `prepare` captures per-object state (matrices, texture, the light
//! list) by value; `capture` clones the shader into the renderer's
//! per-frame store, so workers shade against a snapshot.

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};

use prism_common::Color;
use prism_render::scene::{Light, Scene, SceneObject};
use prism_render::{Shader, Texture, Vertex};

/// Pixel-lit shader used for most objects.
#[derive(Clone)]
pub struct LitShader {
    mtx_model: Mat4,
    mtx_mvp: Mat4,
    mtx_normal: Mat4,
    eye_pos: Vec3,
    eye_dir: Vec3,
    lights: Vec<Light>,
    texture: Option<Arc<Texture>>,
    pub lighting_enabled: bool,
}

impl LitShader {
    pub fn new() -> Self {
        Self {
            mtx_model: Mat4::IDENTITY,
            mtx_mvp: Mat4::IDENTITY,
            mtx_normal: Mat4::IDENTITY,
            eye_pos: Vec3::ZERO,
            eye_dir: Vec3::Z,
            lights: Vec::new(),
            texture: None,
            lighting_enabled: true,
        }
    }

    fn accumulate_lighting(&self, world_pos: Vec3, normal: Vec3) -> Color {
        let mut luminance = Color::BLACK;
        for light in &self.lights {
            luminance += light.apply(world_pos, normal, self.eye_pos, self.eye_dir);
        }
        luminance
    }
}

impl Default for LitShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for LitShader {
    fn prepare(&mut self, scene: &Scene, object: &SceneObject) {
        self.mtx_model = object.transform.matrix();
        self.mtx_mvp = scene.camera.view_projection() * self.mtx_model;
        self.mtx_normal = object.transform.inverse_matrix().transpose();
        self.eye_pos = scene.camera.transform.position();
        self.eye_dir = scene.camera.transform.forward();
        self.lights = scene.lights.clone();
        self.texture = Some(object.texture.clone());
    }

    fn process_vertex(&self, input: &Vertex) -> Vertex {
        let model_pos = Vec4::new(
            input.position.x,
            input.position.y,
            input.position.z,
            1.0,
        );
        Vertex {
            position: self.mtx_mvp * model_pos,
            normal: (self.mtx_normal * Vec4::from((input.normal, 0.0))).truncate(),
            texcoord: input.texcoord,
            world_pos: (self.mtx_model * model_pos).truncate(),
        }
    }

    fn process_pixel(&self, input: &Vertex, mip_level: f32, _discard: &mut bool) -> Color {
        let texture = match &self.texture {
            Some(t) => t,
            None => return Color::MAGENTA,
        };
        let tex = texture.sample(input.texcoord, mip_level);

        if !self.lighting_enabled {
            return tex;
        }

        // Alpha-marked texels of 4-channel textures are self-illuminated
        // (window panes, lamp glass).
        if texture.channels() == 4 && tex.a > 0.5 {
            return tex;
        }

        tex * self.accumulate_lighting(input.world_pos, input.normal)
    }

    fn capture(&self) -> Box<dyn Shader> {
        Box::new(self.clone())
    }
}

/// Self-illuminated shader (sky, UI quads).
#[derive(Clone, Default)]
pub struct UnlitShader {
    mtx_mvp: Mat4,
    texture: Option<Arc<Texture>>,
}

impl UnlitShader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Shader for UnlitShader {
    fn prepare(&mut self, scene: &Scene, object: &SceneObject) {
        self.mtx_mvp = scene.camera.view_projection() * object.transform.matrix();
        self.texture = Some(object.texture.clone());
    }

    fn process_vertex(&self, input: &Vertex) -> Vertex {
        let model_pos = Vec4::new(
            input.position.x,
            input.position.y,
            input.position.z,
            1.0,
        );
        Vertex {
            position: self.mtx_mvp * model_pos,
            normal: input.normal,
            texcoord: input.texcoord,
            world_pos: input.world_pos,
        }
    }

    fn process_pixel(&self, input: &Vertex, mip_level: f32, _discard: &mut bool) -> Color {
        match &self.texture {
            Some(t) => t.sample(input.texcoord, mip_level),
            None => Color::MAGENTA,
        }
    }

    fn capture(&self) -> Box<dyn Shader> {
        Box::new(self.clone())
    }
}

/// Lit shader with alpha cutout: fragments under the alpha threshold are
/// discarded instead of written (foliage, fences).
#[derive(Clone)]
pub struct LitCutoutShader {
    inner: LitShader,
    pub cutoff: f32,
}

impl LitCutoutShader {
    pub fn new() -> Self {
        Self {
            inner: LitShader::new(),
            cutoff: 0.5,
        }
    }

    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        self.inner.lighting_enabled = enabled;
    }
}

impl Default for LitCutoutShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for LitCutoutShader {
    fn prepare(&mut self, scene: &Scene, object: &SceneObject) {
        self.inner.prepare(scene, object);
    }

    fn process_vertex(&self, input: &Vertex) -> Vertex {
        self.inner.process_vertex(input)
    }

    fn process_pixel(&self, input: &Vertex, mip_level: f32, discard: &mut bool) -> Color {
        let texture = match &self.inner.texture {
            Some(t) => t,
            None => return Color::MAGENTA,
        };
        let tex = texture.sample(input.texcoord, mip_level);
        if tex.a < self.cutoff {
            *discard = true;
            return tex;
        }

        if !self.inner.lighting_enabled {
            return tex;
        }
        tex * self.inner.accumulate_lighting(input.world_pos, input.normal)
    }

    fn capture(&self) -> Box<dyn Shader> {
        Box::new(self.clone())
    }
}
