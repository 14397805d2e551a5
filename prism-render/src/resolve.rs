// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Antialiasing resolve: collapse the per-pixel sample block into the
//! display buffer with a box filter.
//!
//! Runs per worker on the worker's own band, right after that worker's
//! rasterization and before it signals idle. Both the tile-packed SSAA
//! layout and the plain MSAA layout keep one pixel's samples contiguous
//! at `(y*width + x) * samples`, so one loop serves every mode.

use prism_common::{Color32, Rect};

use crate::context::ContextState;

/// Box-average every pixel of `band` (display space) from the sample
/// buffer into the display buffer. No-op when AA is off.
pub(crate) fn resolve_band(state: &ContextState, band: Rect) {
    let samples_per_pixel = state.aa_mode.samples_per_pixel();
    if samples_per_pixel <= 1 || band.is_empty() {
        return;
    }

    let samples = state.samples.ptr() as *const u32;
    let display = state.color.ptr();
    let width = state.width;
    let n = samples_per_pixel as u32;

    for y in band.y..band.bottom() {
        for x in band.x..band.right() {
            let pixel = (y * width + x) as usize;
            let base = pixel * samples_per_pixel;

            let mut acc = [0u32; 4];
            for i in 0..samples_per_pixel {
                // SAFETY: base + i indexes a sample of a pixel in this
                // worker's band; the sample buffer holds
                // width * height * samples_per_pixel entries.
                let c = Color32::from_packed(unsafe { *samples.add(base + i) });
                acc[0] += c.r as u32;
                acc[1] += c.g as u32;
                acc[2] += c.b as u32;
                acc[3] += c.a as u32;
            }

            let avg = Color32::new(
                (acc[0] / n) as u8,
                (acc[1] / n) as u8,
                (acc[2] / n) as u8,
                (acc[3] / n) as u8,
            );
            // SAFETY: pixel lies in this worker's band of the display
            // buffer.
            unsafe { *display.add(pixel) = avg.to_packed() };
        }
    }
}
