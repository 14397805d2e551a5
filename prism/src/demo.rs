// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The built-in demo scene: procedural textures and meshes standing in
//! for the asset pipeline, plus the scene's lights.
//!
//! Meshes are authored directly in the renderer's mesh contract: CCW
//! winding in a left-handed Y-up Z-forward space, world-unit meters,
//! unit normals, texture V growing downward.

use std::sync::Arc;

use glam::{Vec2, Vec3};

use prism_common::{Color, Color32};
use prism_render::scene::{Light, LightKind};
use prism_render::shader::shared;
use prism_render::{
    Camera, CullMode, FilterMode, Mesh, Scene, SceneObject, Texture, Vertex,
};

use crate::shaders::{LitCutoutShader, LitShader};

/// Checkerboard texture of `cells`×`cells` squares.
pub fn checker_texture(size: u32, cells: u32, a: Color32, b: Color32, filter: FilterMode) -> Texture {
    let cell = (size / cells).max(1);
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let odd = ((x / cell) + (y / cell)) % 2 == 1;
            pixels.push(if odd { b } else { a });
        }
    }
    Texture::from_pixels(&pixels, size, size, 3, filter)
}

/// Foliage-style cutout texture: opaque blobs on transparent background.
pub fn cutout_texture(size: u32, filter: FilterMode) -> Texture {
    let mut pixels = Vec::with_capacity((size * size) as usize);
    let center = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 - center) / center;
            let dy = (y as f32 - center) / center;
            let inside = dx * dx + dy * dy < 0.64;
            pixels.push(if inside {
                Color32::new(40, 160, 60, 255)
            } else {
                Color32::new(0, 0, 0, 0)
            });
        }
    }
    Texture::from_pixels(&pixels, size, size, 4, filter)
}

/// Quad as two CCW triangles. Corners in bl, br, tr, tl order as seen
/// from the front side; UVs put V=0 at the top edge.
fn quad(
    out: &mut Vec<Vertex>,
    bl: Vec3,
    br: Vec3,
    tr: Vec3,
    tl: Vec3,
    normal: Vec3,
    uv_scale: f32,
) {
    let uv_bl = Vec2::new(0.0, uv_scale);
    let uv_br = Vec2::new(uv_scale, uv_scale);
    let uv_tr = Vec2::new(uv_scale, 0.0);
    let uv_tl = Vec2::new(0.0, 0.0);

    out.push(Vertex::at(bl, normal, uv_bl));
    out.push(Vertex::at(br, normal, uv_br));
    out.push(Vertex::at(tr, normal, uv_tr));

    out.push(Vertex::at(bl, normal, uv_bl));
    out.push(Vertex::at(tr, normal, uv_tr));
    out.push(Vertex::at(tl, normal, uv_tl));
}

/// Ground plane of `size`×`size` meters at y = 0, facing up.
pub fn plane_mesh(size: f32, uv_scale: f32) -> Mesh {
    let h = size * 0.5;
    let mut verts = Vec::with_capacity(6);
    quad(
        &mut verts,
        Vec3::new(-h, 0.0, -h),
        Vec3::new(h, 0.0, -h),
        Vec3::new(h, 0.0, h),
        Vec3::new(-h, 0.0, h),
        Vec3::Y,
        uv_scale,
    );
    Mesh::from_vertices(verts)
}

/// Axis-aligned cube of `size` meters centered at the origin.
pub fn cube_mesh(size: f32) -> Mesh {
    let h = size * 0.5;
    let mut v = Vec::with_capacity(36);

    // Each face authored CCW as seen from outside along its normal.
    // -Z (toward a camera looking +Z).
    quad(
        &mut v,
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, h, -h),
        Vec3::NEG_Z,
        1.0,
    );
    // +Z.
    quad(
        &mut v,
        Vec3::new(h, -h, h),
        Vec3::new(-h, -h, h),
        Vec3::new(-h, h, h),
        Vec3::new(h, h, h),
        Vec3::Z,
        1.0,
    );
    // -X.
    quad(
        &mut v,
        Vec3::new(-h, -h, h),
        Vec3::new(-h, -h, -h),
        Vec3::new(-h, h, -h),
        Vec3::new(-h, h, h),
        Vec3::NEG_X,
        1.0,
    );
    // +X.
    quad(
        &mut v,
        Vec3::new(h, -h, -h),
        Vec3::new(h, -h, h),
        Vec3::new(h, h, h),
        Vec3::new(h, h, -h),
        Vec3::X,
        1.0,
    );
    // +Y.
    quad(
        &mut v,
        Vec3::new(-h, h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(h, h, h),
        Vec3::new(-h, h, h),
        Vec3::Y,
        1.0,
    );
    // -Y.
    quad(
        &mut v,
        Vec3::new(h, -h, -h),
        Vec3::new(-h, -h, -h),
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::NEG_Y,
        1.0,
    );

    Mesh::from_vertices(v)
}

/// Assemble the demo scene.
pub fn build_scene(aspect: f32, filter: FilterMode, lighting: bool) -> Scene {
    let ground_tex = Arc::new(checker_texture(
        256,
        16,
        Color32::new(170, 150, 120, 255),
        Color32::new(110, 95, 75, 255),
        filter,
    ));
    let crate_tex = Arc::new(checker_texture(
        128,
        4,
        Color32::new(190, 70, 60, 255),
        Color32::new(235, 220, 200, 255),
        filter,
    ));
    let plant_tex = Arc::new(cutout_texture(64, filter));

    // Texture addressing clamps to [0,1], so tiling lives in the checker
    // cell count rather than the UVs.
    let ground_mesh = Arc::new(plane_mesh(24.0, 1.0));
    let cube = Arc::new(cube_mesh(1.5));
    let plant_quad = {
        let mut verts = Vec::with_capacity(6);
        quad(
            &mut verts,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::NEG_Z,
            1.0,
        );
        Arc::new(Mesh::from_vertices(verts))
    };

    let mut lit_shader = LitShader::new();
    lit_shader.lighting_enabled = lighting;
    let mut cutout_shader = LitCutoutShader::new();
    cutout_shader.set_lighting_enabled(lighting);
    let lit = shared(lit_shader);
    let cutout = shared(cutout_shader);

    let mut camera = Camera::new(60.0, aspect, 0.1, 300.0);
    camera.transform.set_position(Vec3::new(0.0, 2.0, -6.0));
    camera.transform.set_rotation_euler(10.0, 0.0, 0.0);

    let mut scene = Scene::new(camera);

    let mut ground = SceneObject::new("terrain", ground_mesh, ground_tex, lit.clone());
    ground.transform.set_position(Vec3::ZERO);
    scene.objects.push(ground);

    let mut crate_a = SceneObject::new("crate_a", cube.clone(), crate_tex.clone(), lit.clone());
    crate_a.transform.set_position(Vec3::new(-1.5, 0.75, 1.0));
    scene.objects.push(crate_a);

    let mut crate_b = SceneObject::new("crate_b", cube, crate_tex, lit);
    crate_b.transform.set_position(Vec3::new(1.8, 0.75, 2.5));
    crate_b.transform.set_rotation_euler(0.0, 35.0, 0.0);
    scene.objects.push(crate_b);

    let mut plant =
        SceneObject::new("plant", plant_quad, plant_tex, cutout).with_cull_mode(CullMode::None);
    plant.transform.set_position(Vec3::new(0.3, 0.0, 0.5));
    scene.objects.push(plant);

    scene.lights.push(Light::new(
        "ambient_light",
        LightKind::Ambient {
            color: Color::new(0.46, 0.68, 0.85, 1.0),
            intensity: 0.4,
        },
    ));
    scene.lights.push(Light::new(
        "sun",
        LightKind::Directional {
            color: Color::new(1.0, 0.95, 0.85, 1.0),
            intensity: 0.9,
            direction: Vec3::new(0.4, -0.8, 0.45).normalize(),
        },
    ));
    scene.lights.push(Light::new(
        "lamp_light",
        LightKind::Point {
            color: Color::new(1.0, 0.8, 0.5, 1.0),
            intensity: 1.2,
            position: Vec3::new(0.0, 2.5, 1.5),
            dist_atten_min: 4.0,
            dist_atten_max: 7.0,
        },
    ));
    scene.lights.push(Light::new(
        "spot",
        LightKind::Spot {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(-3.0, 3.0, -1.0),
            direction: Vec3::new(0.5, -0.8, 0.4).normalize(),
            ang_atten_min: 40.0,
            ang_atten_max: 45.0,
            dist_atten_min: 8.0,
            dist_atten_max: 10.0,
        },
    ));

    scene
}

/// Orbit the camera around the scene center at `radius`, facing inward.
pub fn orbit_camera(camera: &mut Camera, angle_deg: f32, radius: f32, height: f32) {
    let rad = angle_deg.to_radians();
    camera
        .transform
        .set_position(Vec3::new(-rad.sin() * radius, height, -rad.cos() * radius));
    camera.transform.set_rotation_euler(12.0, angle_deg, 0.0);
}
