// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The per-frame vertex pipeline: frustum culling, vertex shading,
//! clipping, viewport transform, and draw-call recording.
//!
//! For each visible object the shader transforms every mesh vertex into
//! clip space; each triangle is near/far clipped in homogeneous space,
//! perspective-divided (storing `1/w` back into `w` and pre-scaling all
//! attributes by it), mapped to render-space pixels, clipped against the
//! screen edges, and fan-triangulated into the frame's flat vertex
//! stream. One captured shader instance and one [`DrawCall`] are recorded
//! per surviving object.

use std::sync::Arc;

use crate::clip::{clip_depth, clip_screen, ClipPoly};
use crate::scene::{CullMode, Scene};
use crate::shader::Shader;
use crate::texture::Texture;
use crate::vertex::Vertex;

/// One object's triangles in the clipped vertex stream.
pub struct DrawCall {
    /// Range in [`FrameState::vertices`]; every 3 vertices form a triangle.
    pub start: usize,
    pub end: usize,
    pub cull_mode: CullMode,
    pub texture: Arc<Texture>,
    /// Index into [`FrameState::shaders`].
    pub shader_index: usize,
}

/// Per-frame transient state: the clipped vertex stream, the draw-call
/// list, and the captured shader store. Built by the main thread, read by
/// every worker, cleared at end of frame.
#[derive(Default)]
pub struct FrameState {
    pub vertices: Vec<Vertex>,
    pub calls: Vec<DrawCall>,
    pub shaders: Vec<Box<dyn Shader>>,
    /// Vertex-shader output scratch, reused across objects.
    transformed: Vec<Vertex>,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all frame data. The shader store is cleared wholesale, not
    /// per instance.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.calls.clear();
        self.shaders.clear();
        self.transformed.clear();
    }
}

/// Transform and clip every visible scene object into `frame`.
/// `render_w`/`render_h` are render-space dimensions (display × SSAA
/// factor).
pub fn build_draw_calls(frame: &mut FrameState, scene: &Scene, render_w: f32, render_h: f32) {
    let mut culled = 0usize;

    for object in &scene.objects {
        if !scene.camera.can_see(&object.world_bounding_sphere()) {
            culled += 1;
            continue;
        }
        if object.mesh.vertices.is_empty() {
            continue;
        }

        let mut shader = object.shader.lock();
        shader.prepare(scene, object);

        frame.transformed.clear();
        frame
            .transformed
            .extend(object.mesh.vertices.iter().map(|v| shader.process_vertex(v)));

        let start = frame.vertices.len();

        for tri in frame.transformed.chunks_exact(3) {
            let mut poly = ClipPoly::default();
            poly[..3].copy_from_slice(tri);

            let count = clip_depth(&mut poly, 3);
            if count < 3 {
                continue;
            }

            for v in &mut poly[..count] {
                // Perspective divide; 1/w replaces w and pre-scales every
                // attribute for perspective-correct interpolation.
                let zr = 1.0 / v.position.w;
                *v *= zr;
                v.position.w = zr;

                // Viewport transform into render-space pixels, y down.
                v.position.x = (v.position.x + 1.0) * 0.5 * render_w;
                v.position.y = render_h - (v.position.y + 1.0) * 0.5 * render_h;
            }

            let count = clip_screen(&mut poly, count, render_w, render_h);
            if count < 3 {
                continue;
            }

            for i in 1..count - 1 {
                frame.vertices.push(poly[0]);
                frame.vertices.push(poly[i]);
                frame.vertices.push(poly[i + 1]);
            }
        }

        let end = frame.vertices.len();
        if end > start {
            let shader_index = frame.shaders.len();
            frame.shaders.push(shader.capture());
            frame.calls.push(DrawCall {
                start,
                end,
                cull_mode: object.cull_mode,
                texture: object.texture.clone(),
                shader_index,
            });
        }
    }

    log::trace!(
        "frame: {} draw calls, {} triangles, {} objects culled",
        frame.calls.len(),
        frame.vertices.len() / 3,
        culled
    );
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3, Vec4};

    use super::*;
    use crate::scene::{Camera, Mesh, SceneObject};
    use crate::shader::{shared, test_support::FlatShader};
    use crate::texture::{FilterMode, Texture};
    use prism_common::{Color, Color32};

    fn clip_vert(x: f32, y: f32, z: f32, w: f32) -> Vertex {
        Vertex::new(Vec4::new(x, y, z, w), Vec3::Y, Vec2::new(0.5, 0.5), Vec3::ZERO)
    }

    fn scene_with_triangle(verts: Vec<Vertex>) -> Scene {
        let texture = Arc::new(Texture::from_pixels(
            &[Color32::new(255, 255, 255, 255)],
            1,
            1,
            3,
            FilterMode::Point,
        ));
        let mesh = Arc::new(Mesh::from_vertices(verts));
        let mut scene = Scene::new(Camera::new(60.0, 4.0 / 3.0, 0.1, 100.0));
        scene.objects.push(SceneObject::new(
            "tri",
            mesh,
            texture,
            shared(FlatShader::with_color(Color::WHITE)),
        ));
        scene
    }

    #[test]
    fn test_ndc_triangle_lands_in_screen_space() {
        // FlatShader passes clip positions through; w = 1 everywhere.
        let scene = scene_with_triangle(vec![
            clip_vert(-1.0, -1.0, 0.5, 1.0),
            clip_vert(1.0, -1.0, 0.5, 1.0),
            clip_vert(0.0, 1.0, 0.5, 1.0),
        ]);

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);

        assert_eq!(frame.calls.len(), 1);
        assert_eq!(frame.vertices.len(), 3);

        // NDC (-1,-1) maps to (0, 480); (0,1) maps to (320, 0).
        let xs: Vec<f32> = frame.vertices.iter().map(|v| v.position.x).collect();
        let ys: Vec<f32> = frame.vertices.iter().map(|v| v.position.y).collect();
        assert!(xs.iter().any(|&x| (x - 0.0).abs() < 1e-3));
        assert!(xs.iter().any(|&x| (x - 640.0).abs() < 1e-3));
        assert!(xs.iter().any(|&x| (x - 320.0).abs() < 1e-3));
        assert!(ys.iter().any(|&y| (y - 480.0).abs() < 1e-3));
        assert!(ys.iter().any(|&y| (y - 0.0).abs() < 1e-3));
    }

    #[test]
    fn test_clip_totality_in_screen_space() {
        // A triangle leaning far outside: every emitted vertex must land
        // inside [0, w] x [0, h] with z within [0, w] before divide.
        let scene = scene_with_triangle(vec![
            clip_vert(-5.0, -3.0, 0.5, 1.0),
            clip_vert(5.0, -3.0, 0.5, 1.0),
            clip_vert(0.0, 4.0, 0.5, 1.0),
        ]);

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);

        assert!(!frame.vertices.is_empty());
        assert_eq!(frame.vertices.len() % 3, 0);
        for v in &frame.vertices {
            assert!(v.position.x >= 0.0 && v.position.x <= 640.0);
            assert!(v.position.y >= 0.0 && v.position.y <= 480.0);
        }
    }

    #[test]
    fn test_perspective_divide_stores_reciprocal_w() {
        let scene = scene_with_triangle(vec![
            clip_vert(-2.0, -2.0, 1.0, 2.0),
            clip_vert(2.0, -2.0, 1.0, 2.0),
            clip_vert(0.0, 2.0, 1.0, 2.0),
        ]);

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);

        for v in &frame.vertices {
            assert!((v.position.w - 0.5).abs() < 1e-6);
            // texcoord was (0.5, 0.5); pre-divided it is (0.25, 0.25).
            assert!((v.texcoord.x - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_viewport_transform_inverts_to_ndc() {
        // Round-trip law: viewport transform followed by its algebraic
        // inverse recovers NDC within 1e-4.
        let (rw, rh) = (640.0f32, 480.0f32);
        for (ndc_x, ndc_y) in [(-1.0, -1.0), (0.0, 0.0), (0.25, -0.75), (1.0, 1.0)] {
            let sx = (ndc_x + 1.0) * 0.5 * rw;
            let sy = rh - (ndc_y + 1.0) * 0.5 * rh;

            let back_x = sx / (0.5 * rw) - 1.0;
            let back_y = (rh - sy) / (0.5 * rh) - 1.0;
            assert!((back_x - ndc_x).abs() < 1e-4);
            assert!((back_y - ndc_y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_triangle_behind_near_plane_emits_nothing() {
        let scene = scene_with_triangle(vec![
            clip_vert(-1.0, -1.0, -1.0, 1.0),
            clip_vert(1.0, -1.0, -1.0, 1.0),
            clip_vert(0.0, 1.0, -1.0, 1.0),
        ]);

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);

        assert!(frame.calls.is_empty());
        assert!(frame.vertices.is_empty());
        assert!(frame.shaders.is_empty());
    }

    #[test]
    fn test_object_behind_camera_is_frustum_culled() {
        // Mesh vertices are also used for the bounding sphere; a mesh
        // fully behind the camera never reaches the vertex shader.
        let texture = Arc::new(Texture::from_pixels(
            &[Color32::new(255, 255, 255, 255)],
            1,
            1,
            3,
            FilterMode::Point,
        ));
        let mesh = Arc::new(Mesh::from_vertices(vec![
            Vertex::at(Vec3::new(-1.0, 0.0, -50.0), Vec3::Y, Vec2::ZERO),
            Vertex::at(Vec3::new(1.0, 0.0, -50.0), Vec3::Y, Vec2::ZERO),
            Vertex::at(Vec3::new(0.0, 1.0, -50.0), Vec3::Y, Vec2::ZERO),
        ]));
        let mut scene = Scene::new(Camera::new(60.0, 4.0 / 3.0, 0.1, 100.0));
        scene.objects.push(SceneObject::new(
            "behind",
            mesh,
            texture,
            shared(FlatShader::with_color(Color::WHITE)),
        ));

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);
        assert!(frame.calls.is_empty());
    }

    #[test]
    fn test_fan_triangulation_of_clipped_quad() {
        // One vertex pokes past the right screen edge: the clipped
        // polygon gains vertices and fans into more than one triangle.
        let scene = scene_with_triangle(vec![
            clip_vert(0.0, -0.9, 0.5, 1.0),
            clip_vert(3.0, 0.0, 0.5, 1.0), // off right edge
            clip_vert(0.0, 0.9, 0.5, 1.0),
        ]);

        let mut frame = FrameState::new();
        build_draw_calls(&mut frame, &scene, 640.0, 480.0);

        assert_eq!(frame.calls.len(), 1);
        let call = &frame.calls[0];
        assert!(
            (call.end - call.start) >= 6,
            "expected a fan of at least 2 triangles, got {} vertices",
            call.end - call.start
        );
    }
}
