// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sutherland–Hodgman polygon clipping.
//!
//! Triangles are clipped first against the near and far planes in
//! homogeneous clip space (`0 < z` and `z ≤ w`), then — after the
//! perspective divide and viewport transform — against the four screen
//! edges. Each plane can add at most one vertex, so a triangle grows to at
//! most 9 vertices; all scratch lives in fixed stack arrays.
//!
//! Intersection vertices are full componentwise affine combinations of
//! their edge endpoints, so every attribute is clipped together with the
//! position.

use crate::vertex::Vertex;

/// Maximum vertex count a clipped triangle can reach (3 + 6 splits).
pub const MAX_POLY_VERTS: usize = 9;

/// Scratch polygon for the clipping passes.
pub type ClipPoly = [Vertex; MAX_POLY_VERTS];

/// One Sutherland–Hodgman pass of `src[..count]` into `dst`.
///
/// For each directed edge (wrapping), emits the intersection when the
/// edge crosses the plane, then the endpoint when it is inside. `snap`
/// pins the introduced vertex exactly onto the boundary so round-off can
/// not reintroduce out-of-range coordinates.
fn clip_pass(
    src: &ClipPoly,
    count: usize,
    dst: &mut ClipPoly,
    inside: impl Fn(&Vertex) -> bool,
    intersect_t: impl Fn(&Vertex, &Vertex) -> f32,
    snap: impl Fn(&mut Vertex),
) -> usize {
    let mut out = 0;

    for i in 0..count {
        let p0 = &src[i];
        let p1 = &src[(i + 1) % count];

        let in0 = inside(p0);
        let in1 = inside(p1);

        if in0 != in1 {
            let t = intersect_t(p0, p1);
            let mut v = *p0 + (*p1 - *p0) * t;
            snap(&mut v);
            dst[out] = v;
            out += 1;
        }

        if in1 {
            dst[out] = *p1;
            out += 1;
        }
    }

    out
}

/// Clip against the near (`z > 0`) and far (`z ≤ w`) planes in
/// homogeneous space. Returns the new vertex count (possibly < 3).
pub fn clip_depth(verts: &mut ClipPoly, count: usize) -> usize {
    let mut tmp = ClipPoly::default();

    // Near: z > 0, crossing at t = -z0 / (z1 - z0).
    let count = clip_pass(
        verts,
        count,
        &mut tmp,
        |v| v.position.z > 0.0,
        |p0, p1| -p0.position.z / (p1.position.z - p0.position.z),
        |_| {},
    );

    // Far: z <= w, crossing at t = (w0 - z0) / ((z1 - z0) - (w1 - w0)).
    clip_pass(
        &tmp,
        count,
        verts,
        |v| v.position.z <= v.position.w,
        |p0, p1| {
            let (z0, w0) = (p0.position.z, p0.position.w);
            let (z1, w1) = (p1.position.z, p1.position.w);
            (w0 - z0) / ((z1 - z0) - (w1 - w0))
        },
        |_| {},
    )
}

/// Clip a screen-space polygon against `x ≥ 0`, `x ≤ width`, `y ≥ 0`,
/// `y ≤ height`. Returns the new vertex count (possibly < 3).
pub fn clip_screen(verts: &mut ClipPoly, count: usize, width: f32, height: f32) -> usize {
    let mut tmp = ClipPoly::default();

    let count = clip_pass(
        verts,
        count,
        &mut tmp,
        |v| v.position.x >= 0.0,
        |p0, p1| -p0.position.x / (p1.position.x - p0.position.x),
        |v| v.position.x = 0.0,
    );

    let count = clip_pass(
        &tmp,
        count,
        verts,
        |v| v.position.x <= width,
        |p0, p1| (width - p0.position.x) / (p1.position.x - p0.position.x),
        |v| v.position.x = width,
    );

    let count = clip_pass(
        verts,
        count,
        &mut tmp,
        |v| v.position.y >= 0.0,
        |p0, p1| -p0.position.y / (p1.position.y - p0.position.y),
        |v| v.position.y = 0.0,
    );

    clip_pass(
        &tmp,
        count,
        verts,
        |v| v.position.y <= height,
        |p0, p1| (height - p0.position.y) / (p1.position.y - p0.position.y),
        |v| v.position.y = height,
    )
}
