// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! 4× multisample edge-function rasterization.
//!
//! Coverage is tested at four fixed sub-pixel positions; the pixel shader
//! runs once per pixel when any sample is both covered and nearer than
//! the stored depth, and the per-sample color/depth writes are masked by
//! `coverage AND depth_pass`. Rows run to the traversal-box bound: with
//! partial per-pixel coverage the covered-sample count is not monotonic
//! along a row, so the single-sample early exit would drop pixels.

use glam::Vec2;

use crate::vertex::Vertex;

use super::{
    calc_mip_level, covered, extrapolate_plane, traversal_box, Edges, Facing, RasterParams,
    SampleLayout,
};

/// Sub-pixel sample positions of the rotated 4× grid.
pub(crate) const SAMPLE_OFFSETS: [[f32; 2]; 4] = [
    [0.375, -0.125],
    [-0.125, -0.375],
    [-0.375, 0.125],
    [0.125, 0.375],
];

/// Rasterize one triangle with 4× multisampling. `p.color` and `p.depth`
/// address 4-sample-per-pixel buffers in plain layout.
pub(crate) fn rasterize<L: SampleLayout>(
    p: &RasterParams<'_, L>,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    facing: Facing,
) {
    // Pad by one pixel: samples sit up to 0.375 away from the origin.
    let Some((min_x, min_y, max_x, max_y)) = traversal_box(v0, v1, v2, &p.band, 1) else {
        return;
    };

    let Some((v00, v01, v10)) = extrapolate_plane(
        v0,
        v1,
        v2,
        Vec2::new(min_x as f32, min_y as f32),
        Vec2::new(max_x as f32, min_y as f32),
        Vec2::new(min_x as f32, max_y as f32),
    ) else {
        return;
    };

    let x_delta = (v01 - v00) * (1.0 / (max_x - min_x) as f32);
    let y_delta = (v10 - v00) * (1.0 / (max_y - min_y) as f32);

    let edges = Edges::new(v0, v1, v2, min_x as f32, min_y as f32);

    // Edge-function offset of each sample relative to the pixel origin.
    let mut sample_adjust = [[0.0f32; 4]; 3];
    for k in 0..3 {
        for (i, [ox, oy]) in SAMPLE_OFFSETS.iter().enumerate() {
            sample_adjust[k][i] = edges.step_x[k] * ox + edges.step_y[k] * oy;
        }
    }

    // 1/w gradient, for per-sample depth.
    let dw_dx = x_delta.position.w;
    let dw_dy = y_delta.position.w;

    let mut e_row = edges.base;
    let mut row_vert = v00;

    for y in min_y..max_y {
        let mut e = e_row;
        let mut xv = row_vert;
        let row_offset = p.layout.row_offset(y);

        for x in min_x..max_x {
            let mut coverage = 0u8;
            for i in 0..4 {
                let es = [
                    e[0] + sample_adjust[0][i],
                    e[1] + sample_adjust[1][i],
                    e[2] + sample_adjust[2][i],
                ];
                if covered(&es, &edges.back_limit, facing) {
                    coverage |= 1 << i;
                }
            }

            if coverage != 0 {
                let base = (row_offset + p.layout.col_offset(x)) * 4;

                // Depth test per covered sample.
                let mut sample_w = [0.0f32; 4];
                let mut pass = 0u8;
                for (i, [ox, oy]) in SAMPLE_OFFSETS.iter().enumerate() {
                    if coverage & (1 << i) == 0 {
                        continue;
                    }
                    let w = xv.position.w + dw_dx * ox + dw_dy * oy;
                    // SAFETY: base + i addresses a sample of pixel (x, y)
                    // inside this worker's band.
                    if w > unsafe { *p.depth.add(base + i) } {
                        sample_w[i] = w;
                        pass |= 1 << i;
                    }
                }

                if pass != 0 {
                    // Shade once per pixel, at the pixel origin.
                    let mip_level = calc_mip_level(
                        &xv,
                        &(xv + x_delta),
                        &(xv + y_delta),
                        p.texture.size(),
                        p.texture.mipmap_bias(),
                        p.texture.mipmap_count(),
                        p.mipmaps_enabled,
                    );

                    let mut frag = xv / xv.position.w;
                    frag.normal = frag.normal.normalize_or_zero();

                    let mut discard = false;
                    let output = p
                        .shader
                        .process_pixel(&frag, mip_level, &mut discard)
                        .clamped();

                    if !discard {
                        let packed = output.to_packed();
                        for i in 0..4 {
                            if pass & (1 << i) != 0 {
                                // SAFETY: same bounds as the read above.
                                unsafe {
                                    *p.color.add(base + i) = packed;
                                    *p.depth.add(base + i) = sample_w[i];
                                }
                            }
                        }
                    }
                }
            }

            // No early exit: partially covered pixels recur along the row.
            xv += x_delta;
            for k in 0..3 {
                e[k] += edges.step_x[k];
            }
        }

        for k in 0..3 {
            e_row[k] += edges.step_y[k];
        }
        row_vert += y_delta;
    }
}
