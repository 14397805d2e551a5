// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Classical scanline rasterization.
//!
//! The triangle splits at the middle-Y vertex into a flat-bottomed top
//! half and a flat-topped bottom half; each half walks its scanlines,
//! interpolating the full vertex down the left and right edges and
//! filling between them. Degenerate halves (zero height or width) are
//! silent skips.

use std::mem::swap;

use crate::vertex::Vertex;

use super::{process_fragment, RasterParams, SampleLayout};

/// Spans shorter than this collapse to nothing.
const MIN_SPAN: f32 = 1e-5;

/// Rasterize one triangle's intersection with the worker band. Culling
/// happened in the caller; the fill is winding-agnostic.
pub(crate) fn rasterize<L: SampleLayout>(
    p: &RasterParams<'_, L>,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
) {
    let mut top = *v0;
    let mut mid = *v1;
    let mut bot = *v2;

    if bot.position.y < mid.position.y {
        swap(&mut bot, &mut mid);
    }
    if bot.position.y < top.position.y {
        swap(&mut bot, &mut top);
    }
    if mid.position.y < top.position.y {
        swap(&mut mid, &mut top);
    }

    let height = bot.position.y - top.position.y;
    if height < MIN_SPAN {
        return;
    }

    // Split point: where the long edge crosses the middle vertex's row.
    let t = (mid.position.y - top.position.y) / height;
    let center = top + (bot - top) * t;

    if mid.position.y - top.position.y >= MIN_SPAN {
        if center.position.x < mid.position.x {
            fill_half(p, &top, &center, &mid, true);
        } else {
            fill_half(p, &top, &mid, &center, true);
        }
    }

    if bot.position.y - mid.position.y >= MIN_SPAN {
        if center.position.x < mid.position.x {
            fill_half(p, &center, &mid, &bot, false);
        } else {
            fill_half(p, &mid, &center, &bot, false);
        }
    }
}

/// Fill one half triangle. `is_top`: `v0` is the apex above the flat
/// edge `v1..v2`; otherwise `v0..v1` is the flat edge above the apex
/// `v2`. Left vertices come before right ones.
fn fill_half<L: SampleLayout>(
    p: &RasterParams<'_, L>,
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    is_top: bool,
) {
    let (p0l, p0r, p1l, p1r, h_edge) = if is_top {
        (*v0, *v0, *v1, *v2, *v2 - *v1)
    } else {
        (*v0, *v1, *v2, *v2, *v1 - *v0)
    };

    if h_edge.position.x.abs() < MIN_SPAN {
        return;
    }
    let x_delta = h_edge * (1.0 / h_edge.position.x);

    // Vertical interpolation direction: from the apex to its projection
    // onto the flat edge's line, normalized to unit y.
    let (apex, base) = if is_top { (v0, v1) } else { (v2, v0) };
    let offset = apex.position - base.position;
    let n = x_delta.position;
    let t = offset.dot(n) / n.dot(n);
    let foot = *base + x_delta * t;
    let v_edge = if is_top { foot - *apex } else { *apex - foot };
    if v_edge.position.y.abs() < MIN_SPAN {
        return;
    }
    let y_delta = v_edge * (1.0 / v_edge.position.y);

    // Edge steps normalize over the triangle's full row span; band
    // clamping below only restricts which rows get walked.
    let y0 = p0l.position.y as i32;
    let y1 = p1l.position.y.ceil() as i32;

    let span = (y1 - y0) as f32;
    let inv_span = if span > 0.0 { 1.0 / span } else { 0.0 };
    let left_step = (p1l - p0l) * inv_span;
    let right_step = (p1r - p0r) * inv_span;

    // Clamp to the worker band and advance the edge interpolants there.
    let y_start = y0.max(p.band.y);
    let y_end = y1.min(p.band.bottom() - 1);
    if y_start > y_end {
        return;
    }
    let skipped = (y_start - y0) as f32;
    let mut left = p0l + left_step * skipped;
    let mut right = p0r + right_step * skipped;

    for y in y_start..=y_end {
        let x0 = left.position.x as i32;
        let x_end = (right.position.x.ceil() as i32).min(p.band.right() - 1);
        let x_start = x0.max(p.band.x);

        if x_start <= x_end {
            let mut xv = left + x_delta * (x_start - x0) as f32;
            let row_offset = p.layout.row_offset(y);

            for x in x_start..=x_end {
                let offset = row_offset + p.layout.col_offset(x);
                // SAFETY: x and y are clamped to this worker's band.
                unsafe { process_fragment(p, &xv, &x_delta, &y_delta, offset) };
                xv += x_delta;
            }
        }

        left += left_step;
        right += right_step;
    }
}
