// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Triangle rasterization.
//!
//! Three paths share this module's machinery: classical scanline
//! ([`scanline`]), edge-function halfspace ([`halfspace`]), and 4×-MSAA
//! halfspace ([`msaa`]). All of them interpolate the *whole* vertex
//! linearly in screen space (attributes were pre-divided by `w` at
//! viewport entry and `position.w` holds `1/w`), divide back per fragment,
//! and use `1/w` directly for the depth test (larger is nearer).
//!
//! Writes go through raw pointers into the frame's buffers. Workers own
//! disjoint horizontal bands, and every offset produced here stays within
//! the caller's band, which keeps the concurrent writes race-free.

pub mod halfspace;
pub mod msaa;
pub mod scanline;

use glam::Vec2;

use prism_common::Rect;

use crate::context::{AntiAliasingMode, ContextState, RasterizationMode};
use crate::framebuffer::{tiled_col_offset, tiled_row_offset};
use crate::pipeline::DrawCall;
use crate::resolve;
use crate::scene::CullMode;
use crate::shader::Shader;
use crate::texture::Texture;
use crate::vertex::Vertex;

/// Fill-rule bias added to the constant term of top/left edges — one
/// fractional bit of edge-function offset, enough to break ties without
/// moving coverage off the edge visibly.
pub(crate) const EDGE_BIAS: f32 = 1.0;

// ---------------------------------------------------------------------------
// Sample addressing
// ---------------------------------------------------------------------------

/// Maps `(x, y)` sample coordinates to indices in sample storage.
pub(crate) trait SampleLayout: Copy {
    fn row_offset(&self, y: i32) -> usize;
    fn col_offset(&self, x: i32) -> usize;

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        self.row_offset(y) + self.col_offset(x)
    }
}

/// Plain row-major layout, one sample per pixel.
#[derive(Clone, Copy)]
pub(crate) struct DirectLayout {
    pub width: i32,
}

impl SampleLayout for DirectLayout {
    #[inline]
    fn row_offset(&self, y: i32) -> usize {
        (y * self.width) as usize
    }

    #[inline]
    fn col_offset(&self, x: i32) -> usize {
        x as usize
    }
}

/// Tile-packed X×X supersample layout over a display-width buffer.
#[derive(Clone, Copy)]
pub(crate) struct TiledLayout<const X: u32> {
    pub width: i32,
}

impl<const X: u32> SampleLayout for TiledLayout<X> {
    #[inline]
    fn row_offset(&self, y: i32) -> usize {
        tiled_row_offset::<X>(self.width, y)
    }

    #[inline]
    fn col_offset(&self, x: i32) -> usize {
        tiled_col_offset::<X>(x)
    }
}

// ---------------------------------------------------------------------------
// Shared per-triangle state
// ---------------------------------------------------------------------------

/// Inputs one rasterizer invocation needs for one triangle.
pub(crate) struct RasterParams<'a, L: SampleLayout> {
    /// Render-space rows this worker owns.
    pub band: Rect,
    pub layout: L,
    pub color: *mut u32,
    pub depth: *mut f32,
    pub texture: &'a Texture,
    pub shader: &'a dyn Shader,
    pub mipmaps_enabled: bool,
}

/// Which side of the triangle the coverage test accepts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Facing {
    Front,
    Back,
}

/// Twice the signed area of a screen-space triangle; positive means the
/// all-edges-positive ("front") orientation.
#[inline]
pub(crate) fn signed_area(v0: &Vertex, v1: &Vertex, v2: &Vertex) -> f32 {
    (v1.position.y - v0.position.y) * (v2.position.x - v0.position.x)
        - (v1.position.x - v0.position.x) * (v2.position.y - v0.position.y)
}

/// Classify the triangle against the cull mode. `None` skips it entirely
/// (culled, or zero-area degenerate).
#[inline]
pub(crate) fn facing_for(cull: CullMode, area: f32) -> Option<Facing> {
    if area == 0.0 || !area.is_finite() {
        return None;
    }

    let front = area > 0.0;
    match cull {
        CullMode::Back if !front => None,
        CullMode::Front if front => None,
        _ => Some(if front { Facing::Front } else { Facing::Back }),
    }
}

/// The three edge functions of a triangle, seeded at a point, with the
/// top-left fill bias folded into the constant terms.
pub(crate) struct Edges {
    /// E at the seed point, bias included.
    pub base: [f32; 3],
    /// dE/dx per edge.
    pub step_x: [f32; 3],
    /// dE/dy per edge.
    pub step_y: [f32; 3],
    /// Back-face threshold: twice the bias of each edge, so the back
    /// test mirrors the front test symmetrically.
    pub back_limit: [f32; 3],
}

impl Edges {
    pub fn new(v0: &Vertex, v1: &Vertex, v2: &Vertex, seed_x: f32, seed_y: f32) -> Self {
        let mut base = [0.0f32; 3];
        let mut step_x = [0.0f32; 3];
        let mut step_y = [0.0f32; 3];
        let mut back_limit = [0.0f32; 3];

        let edges = [(v0, v1), (v1, v2), (v2, v0)];
        for (k, (a, b)) in edges.iter().enumerate() {
            let ax = a.position.x;
            let ay = a.position.y;
            let dx = b.position.x - ax;
            let dy = b.position.y - ay;

            // Top and left edges tie-break as inside; the rest do not.
            let bias = if dy > 0.0 || (dy == 0.0 && dx < 0.0) {
                EDGE_BIAS
            } else {
                0.0
            };

            step_x[k] = dy;
            step_y[k] = -dx;
            base[k] = dy * (seed_x - ax) - dx * (seed_y - ay) + bias;
            back_limit[k] = 2.0 * bias;
        }

        Self {
            base,
            step_x,
            step_y,
            back_limit,
        }
    }
}

/// Coverage test for one sample given its three edge values.
#[inline]
pub(crate) fn covered(e: &[f32; 3], back_limit: &[f32; 3], facing: Facing) -> bool {
    match facing {
        Facing::Front => e[0] > 0.0 && e[1] > 0.0 && e[2] > 0.0,
        Facing::Back => e[0] < back_limit[0] && e[1] < back_limit[1] && e[2] < back_limit[2],
    }
}

/// Triangle bounding box (ceil-rounded like the traversal origin),
/// padded by `pad` pixels on every side, intersected with the worker
/// band. `None` when nothing remains. MSAA passes `pad = 1` because its
/// sample positions reach outside the pixel origin.
pub(crate) fn traversal_box(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    band: &Rect,
    pad: i32,
) -> Option<(i32, i32, i32, i32)> {
    let min_x = v0.position.x.min(v1.position.x).min(v2.position.x).ceil() as i32 - pad;
    let max_x = v0.position.x.max(v1.position.x).max(v2.position.x).ceil() as i32 + pad;
    let min_y = v0.position.y.min(v1.position.y).min(v2.position.y).ceil() as i32 - pad;
    let max_y = v0.position.y.max(v1.position.y).max(v2.position.y).ceil() as i32 + pad;

    let min_x = min_x.clamp(band.x, band.right());
    let max_x = max_x.clamp(band.x, band.right());
    let min_y = min_y.clamp(band.y, band.bottom());
    let max_y = max_y.clamp(band.y, band.bottom());

    if max_x - min_x < 1 || max_y - min_y < 1 {
        return None;
    }
    Some((min_x, min_y, max_x, max_y))
}

/// Rebuild the interpolation plane at three traversal-box corners by
/// barycentric extrapolation of the triangle's vertices. `None` when the
/// barycentric denominator degenerates.
pub(crate) fn extrapolate_plane(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    c00: Vec2,
    c01: Vec2,
    c10: Vec2,
) -> Option<(Vertex, Vertex, Vertex)> {
    let a = Vec2::new(v0.position.x, v0.position.y);
    let b = Vec2::new(v1.position.x, v1.position.y);
    let c = Vec2::new(v2.position.x, v2.position.y);

    let e0 = b - a;
    let e1 = c - a;

    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);

    let denom = d00 * d11 - d01 * d01;
    let inv = 1.0 / denom;
    if !inv.is_finite() {
        return None;
    }

    let at = |corner: Vec2| -> Vertex {
        let e2 = corner - a;
        let d20 = e2.dot(e0);
        let d21 = e2.dot(e1);
        let v = (d11 * d20 - d01 * d21) * inv;
        let w = (d00 * d21 - d01 * d20) * inv;
        let u = 1.0 - v - w;
        *v0 * u + *v1 * v + *v2 * w
    };

    Some((at(c00), at(c01), at(c10)))
}

/// Mip level from the perspective-corrected texture-coordinate deltas to
/// the `+1x` and `+1y` neighbor samples.
#[inline]
pub(crate) fn calc_mip_level(
    curr: &Vertex,
    x_next: &Vertex,
    y_next: &Vertex,
    tex_size: Vec2,
    mip_bias: f32,
    mip_count: usize,
    enabled: bool,
) -> f32 {
    if !enabled || mip_count <= 1 {
        return 0.0;
    }

    // position.w holds 1/w; dividing by it recovers the true uv.
    let uv00 = curr.texcoord * (1.0 / curr.position.w);
    let uv01 = x_next.texcoord.x / x_next.position.w;
    let uv10 = y_next.texcoord.y / y_next.position.w;

    let dt = Vec2::new(uv01 - uv00.x, uv10 - uv00.y) * tex_size;
    let max_sq = (dt.x * dt.x).max(dt.y * dt.y);

    let mip = 0.5 * max_sq.log2() + mip_bias;
    if mip.is_nan() {
        // Degenerate derivative (extrapolated w crossing zero); treat as
        // an unscaled sample.
        return 0.0;
    }
    mip.clamp(0.0, (mip_count - 1) as f32)
}

/// Depth-test, shade, and write one covered sample at `offset`.
///
/// # Safety
/// `offset` must address a sample inside both target buffers and inside
/// the calling worker's band.
#[inline]
pub(crate) unsafe fn process_fragment<L: SampleLayout>(
    p: &RasterParams<'_, L>,
    xv: &Vertex,
    x_delta: &Vertex,
    y_delta: &Vertex,
    offset: usize,
) {
    let depth = p.depth.add(offset);
    if xv.position.w <= *depth {
        return;
    }

    let mip_level = calc_mip_level(
        xv,
        &(*xv + *x_delta),
        &(*xv + *y_delta),
        p.texture.size(),
        p.texture.mipmap_bias(),
        p.texture.mipmap_count(),
        p.mipmaps_enabled,
    );

    // Undo the perspective pre-division to get true attributes.
    let mut frag = *xv / xv.position.w;
    frag.normal = frag.normal.normalize_or_zero();

    let mut discard = false;
    let output = p.shader.process_pixel(&frag, mip_level, &mut discard).clamped();
    if !discard {
        *p.color.add(offset) = output.to_packed();
        *depth = xv.position.w;
    }
}

// ---------------------------------------------------------------------------
// Band rendering
// ---------------------------------------------------------------------------

/// Rasterize every draw call's intersection with this worker's band, then
/// resolve the band's AA samples. `band` is in display space.
pub(crate) fn render_band(state: &ContextState, band: Rect) {
    if band.is_empty() {
        return;
    }

    let scale = state.aa_mode.supersample_factor();
    let render_band = Rect::new(
        band.x * scale,
        band.y * scale,
        band.w * scale,
        band.h * scale,
    );

    for call in &state.frame.calls {
        let shader = state.frame.shaders[call.shader_index].as_ref();
        let verts = &state.frame.vertices[call.start..call.end];

        for tri in verts.chunks_exact(3) {
            draw_triangle(state, render_band, call, shader, &tri[0], &tri[1], &tri[2]);
        }
    }

    resolve::resolve_band(state, band);
}

fn draw_triangle(
    state: &ContextState,
    band: Rect,
    call: &DrawCall,
    shader: &dyn Shader,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
) {
    let area = signed_area(v0, v1, v2);
    let Some(facing) = facing_for(call.cull_mode, area) else {
        return;
    };

    match state.aa_mode {
        AntiAliasingMode::Off => {
            let p = RasterParams {
                band,
                layout: DirectLayout {
                    width: state.width,
                },
                color: state.color.ptr(),
                depth: state.depth.ptr(),
                texture: call.texture.as_ref(),
                shader,
                mipmaps_enabled: state.mipmaps_enabled,
            };
            single_sample(state.raster_mode, &p, v0, v1, v2, facing);
        }
        AntiAliasingMode::Msaa4x => {
            let p = RasterParams {
                band,
                layout: DirectLayout {
                    width: state.width,
                },
                color: state.samples.ptr(),
                depth: state.depth.ptr(),
                texture: call.texture.as_ref(),
                shader,
                mipmaps_enabled: state.mipmaps_enabled,
            };
            msaa::rasterize(&p, v0, v1, v2, facing);
        }
        AntiAliasingMode::Ssaa2x => {
            let p = RasterParams {
                band,
                layout: TiledLayout::<2> {
                    width: state.width,
                },
                color: state.samples.ptr(),
                depth: state.depth.ptr(),
                texture: call.texture.as_ref(),
                shader,
                mipmaps_enabled: state.mipmaps_enabled,
            };
            single_sample(state.raster_mode, &p, v0, v1, v2, facing);
        }
        AntiAliasingMode::Ssaa4x => {
            let p = RasterParams {
                band,
                layout: TiledLayout::<4> {
                    width: state.width,
                },
                color: state.samples.ptr(),
                depth: state.depth.ptr(),
                texture: call.texture.as_ref(),
                shader,
                mipmaps_enabled: state.mipmaps_enabled,
            };
            single_sample(state.raster_mode, &p, v0, v1, v2, facing);
        }
    }
}

fn single_sample<L: SampleLayout>(
    mode: RasterizationMode,
    p: &RasterParams<'_, L>,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    facing: Facing,
) {
    match mode {
        RasterizationMode::Scanline => scanline::rasterize(p, v0, v1, v2),
        RasterizationMode::Halfspace => halfspace::rasterize(p, v0, v1, v2, facing),
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;

    fn screen_vert(x: f32, y: f32) -> Vertex {
        Vertex::new(Vec4::new(x, y, 0.5, 1.0), Vec3::Y, Vec2::ZERO, Vec3::ZERO)
    }

    #[test]
    fn test_signed_area_orientation() {
        // (0,0) -> (0,10) -> (10,0) walks the all-edges-positive way.
        let a = screen_vert(0.0, 0.0);
        let b = screen_vert(0.0, 10.0);
        let c = screen_vert(10.0, 0.0);
        assert!(signed_area(&a, &b, &c) > 0.0);
        assert!(signed_area(&a, &c, &b) < 0.0);
    }

    #[test]
    fn test_facing_for_cull_modes() {
        assert!(matches!(
            facing_for(CullMode::Back, 5.0),
            Some(Facing::Front)
        ));
        assert!(facing_for(CullMode::Back, -5.0).is_none());
        assert!(matches!(
            facing_for(CullMode::Front, -5.0),
            Some(Facing::Back)
        ));
        assert!(facing_for(CullMode::Front, 5.0).is_none());
        assert!(facing_for(CullMode::None, 5.0).is_some());
        assert!(facing_for(CullMode::None, -5.0).is_some());
        assert!(facing_for(CullMode::None, 0.0).is_none());
    }

    #[test]
    fn test_edges_are_positive_inside_front_triangle() {
        let a = screen_vert(0.0, 0.0);
        let b = screen_vert(0.0, 10.0);
        let c = screen_vert(10.0, 0.0);
        let edges = Edges::new(&a, &b, &c, 2.0, 2.0); // interior point
        assert!(covered(&edges.base, &edges.back_limit, Facing::Front));

        let outside = Edges::new(&a, &b, &c, 20.0, 20.0);
        assert!(!covered(&outside.base, &outside.back_limit, Facing::Front));
    }

    #[test]
    fn test_edge_stepping_matches_direct_evaluation() {
        let a = screen_vert(1.0, 2.0);
        let b = screen_vert(11.0, 3.0);
        let c = screen_vert(4.0, 12.0);
        let seed = Edges::new(&a, &b, &c, 5.0, 5.0);
        let stepped_x: Vec<f32> = (0..3).map(|k| seed.base[k] + seed.step_x[k]).collect();
        let direct = Edges::new(&a, &b, &c, 6.0, 5.0);
        for k in 0..3 {
            assert!((stepped_x[k] - direct.base[k]).abs() < 1e-4);
        }
        let stepped_y: Vec<f32> = (0..3).map(|k| seed.base[k] + seed.step_y[k]).collect();
        let direct = Edges::new(&a, &b, &c, 5.0, 6.0);
        for k in 0..3 {
            assert!((stepped_y[k] - direct.base[k]).abs() < 1e-4);
        }
    }

    #[test]
    fn test_extrapolate_plane_reproduces_vertices() {
        let mut a = screen_vert(0.0, 0.0);
        let mut b = screen_vert(8.0, 0.0);
        let mut c = screen_vert(0.0, 8.0);
        a.texcoord = Vec2::new(0.0, 0.0);
        b.texcoord = Vec2::new(1.0, 0.0);
        c.texcoord = Vec2::new(0.0, 1.0);

        let (v00, v01, v10) = extrapolate_plane(
            &a,
            &b,
            &c,
            Vec2::new(0.0, 0.0),
            Vec2::new(8.0, 0.0),
            Vec2::new(0.0, 8.0),
        )
        .unwrap();

        assert!((v00.texcoord - a.texcoord).length() < 1e-5);
        assert!((v01.texcoord - b.texcoord).length() < 1e-5);
        assert!((v10.texcoord - c.texcoord).length() < 1e-5);
    }

    #[test]
    fn test_extrapolate_plane_rejects_degenerate_triangle() {
        let a = screen_vert(0.0, 0.0);
        let b = screen_vert(4.0, 4.0);
        let c = screen_vert(8.0, 8.0); // collinear
        assert!(extrapolate_plane(
            &a,
            &b,
            &c,
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0)
        )
        .is_none());
    }

    #[test]
    fn test_mip_level_for_one_to_one_mapping_is_zero() {
        // uv advances one texel per pixel on a 64-texel texture: mip 0.
        let mut curr = screen_vert(0.0, 0.0);
        curr.texcoord = Vec2::new(0.5, 0.5);
        let mut xn = screen_vert(1.0, 0.0);
        xn.texcoord = Vec2::new(0.5 + 1.0 / 64.0, 0.5);
        let mut yn = screen_vert(0.0, 1.0);
        yn.texcoord = Vec2::new(0.5, 0.5 + 1.0 / 64.0);

        let mip = calc_mip_level(&curr, &xn, &yn, Vec2::splat(64.0), 0.0, 7, true);
        assert!(mip.abs() < 1e-3, "mip = {mip}");
    }

    #[test]
    fn test_mip_level_doubles_per_octave() {
        // Four texels per pixel: one octave down.
        let mut curr = screen_vert(0.0, 0.0);
        curr.texcoord = Vec2::new(0.0, 0.0);
        let mut xn = screen_vert(1.0, 0.0);
        xn.texcoord = Vec2::new(2.0 / 64.0, 0.0);
        let mut yn = screen_vert(0.0, 1.0);
        yn.texcoord = Vec2::new(0.0, 2.0 / 64.0);

        let mip = calc_mip_level(&curr, &xn, &yn, Vec2::splat(64.0), 0.0, 7, true);
        assert!((mip - 1.0).abs() < 1e-3, "mip = {mip}");
    }

    #[test]
    fn test_mip_level_respects_bias_and_clamp() {
        let mut curr = screen_vert(0.0, 0.0);
        curr.texcoord = Vec2::ZERO;
        let mut xn = screen_vert(1.0, 0.0);
        xn.texcoord = Vec2::new(1000.0, 0.0);
        let mut yn = screen_vert(0.0, 1.0);
        yn.texcoord = Vec2::ZERO;

        let mip = calc_mip_level(&curr, &xn, &yn, Vec2::splat(64.0), 0.0, 4, true);
        assert_eq!(mip, 3.0); // clamped to mip_count - 1

        let off = calc_mip_level(&curr, &xn, &yn, Vec2::splat(64.0), 0.0, 4, false);
        assert_eq!(off, 0.0);
    }

    #[test]
    fn test_traversal_box_clips_to_band() {
        let a = screen_vert(-5.0, -5.0);
        let b = screen_vert(100.0, -5.0);
        let c = screen_vert(-5.0, 100.0);
        let band = Rect::new(0, 16, 64, 16);
        let (min_x, min_y, max_x, max_y) = traversal_box(&a, &b, &c, &band, 0).unwrap();
        assert_eq!((min_x, min_y), (0, 16));
        assert_eq!((max_x, max_y), (64, 32));
    }

    #[test]
    fn test_traversal_box_empty_outside_band() {
        let a = screen_vert(0.0, 0.0);
        let b = screen_vert(10.0, 0.0);
        let c = screen_vert(0.0, 10.0);
        let band = Rect::new(0, 100, 64, 16);
        assert!(traversal_box(&a, &b, &c, &band, 0).is_none());
    }
}
