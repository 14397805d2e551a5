// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Single-sample edge-function rasterization.
//!
//! Coverage comes from the signs of the three edge functions, stepped
//! incrementally across the traversal box. Because coverage of a convex
//! triangle along one row is a single run, each row skips to the first
//! covered sample and stops at the first uncovered one after entering
//! coverage. That early exit is only valid here — the MSAA path must run
//! the full row.

use glam::Vec2;

use crate::vertex::Vertex;

use super::{
    covered, extrapolate_plane, process_fragment, traversal_box, Edges, Facing, RasterParams,
    SampleLayout,
};

/// Rasterize one triangle's intersection with the worker band.
pub(crate) fn rasterize<L: SampleLayout>(
    p: &RasterParams<'_, L>,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    facing: Facing,
) {
    let Some((min_x, min_y, max_x, max_y)) = traversal_box(v0, v1, v2, &p.band, 0) else {
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

    let mut e_row = edges.base;
    let mut row_vert = v00;

    for y in min_y..max_y {
        let mut e = e_row;
        let mut x = min_x;

        // Skip until the first covered sample of the row.
        while x < max_x && !covered(&e, &edges.back_limit, facing) {
            for k in 0..3 {
                e[k] += edges.step_x[k];
            }
            x += 1;
        }

        if x < max_x {
            let row_offset = p.layout.row_offset(y);
            let mut xv = row_vert + x_delta * (x - min_x) as f32;

            // One contiguous covered run per row.
            while x < max_x && covered(&e, &edges.back_limit, facing) {
                let offset = row_offset + p.layout.col_offset(x);
                // SAFETY: (x, y) lies in the traversal box, which is
                // clamped to this worker's band.
                unsafe { process_fragment(p, &xv, &x_delta, &y_delta, offset) };

                xv += x_delta;
                for k in 0..3 {
                    e[k] += edges.step_x[k];
                }
                x += 1;
            }
        }

        for k in 0..3 {
            e_row[k] += edges.step_y[k];
        }
        row_vert += y_delta;
    }
}
