// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The rendering context: configuration, buffers, and the per-frame
//! drive sequence `clear → draw → present`.
//!
//! `draw` walks the scene on the main thread (cull, transform, clip,
//! build draw calls), partitions the display into horizontal bands, hands
//! every worker one band, and blocks until all of them signal idle.
//! Workers rasterize every draw call's intersection with their band and
//! resolve their own AA samples before going idle, so after the barrier
//! the display buffer is complete.

use prism_common::{Color, Rect};

use crate::framebuffer::RenderBuffer;
use crate::pipeline::{self, FrameState};
use crate::scene::Scene;
use crate::worker::RenderWorker;

/// Triangle traversal algorithm.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RasterizationMode {
    Scanline,
    #[default]
    Halfspace,
}

/// Antialiasing mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AntiAliasingMode {
    #[default]
    Off,
    /// 4 coverage/depth samples, one shader invocation per pixel.
    Msaa4x,
    /// 2×2 supersampling: shading per sample at double resolution.
    Ssaa2x,
    /// 4×4 supersampling.
    Ssaa4x,
}

impl AntiAliasingMode {
    /// Samples stored per display pixel.
    pub fn samples_per_pixel(self) -> usize {
        match self {
            Self::Off => 1,
            Self::Msaa4x | Self::Ssaa2x => 4,
            Self::Ssaa4x => 16,
        }
    }

    /// Render-space scale relative to display space.
    pub(crate) fn supersample_factor(self) -> i32 {
        match self {
            Self::Off | Self::Msaa4x => 1,
            Self::Ssaa2x => 2,
            Self::Ssaa4x => 4,
        }
    }
}

/// Host surface hook: receives the finished frame as 32-bit BGRA rows,
/// top-down.
pub trait PresentTarget {
    fn blit(&mut self, pixels: &[u32], width: u32, height: u32);
}

/// Shared state workers read during a frame. Buffers are written through
/// raw pointers into band-disjoint ranges; everything else is immutable
/// while workers run.
pub struct ContextState {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) clear_color: Color,
    pub(crate) raster_mode: RasterizationMode,
    pub(crate) aa_mode: AntiAliasingMode,
    pub(crate) mipmaps_enabled: bool,
    /// Display buffer, BGRA, one sample per pixel.
    pub(crate) color: RenderBuffer<u32>,
    /// Per-sample depth (stores 1/w; cleared to 0, larger is nearer).
    pub(crate) depth: RenderBuffer<f32>,
    /// AA color samples; empty when AA is off.
    pub(crate) samples: RenderBuffer<u32>,
    pub(crate) frame: FrameState,
}

impl ContextState {
    pub(crate) fn render_width(&self) -> i32 {
        self.width * self.aa_mode.supersample_factor()
    }

    pub(crate) fn render_height(&self) -> i32 {
        self.height * self.aa_mode.supersample_factor()
    }
}

/// The renderer.
pub struct RenderContext {
    state: Box<ContextState>,
    workers: Vec<RenderWorker>,
}

impl RenderContext {
    /// Create a context rendering at `width`×`height` with a fixed pool
    /// of `worker_count` threads (at least one).
    pub fn new(width: u32, height: u32, worker_count: usize) -> Self {
        assert!(width > 0 && height > 0, "render target must not be empty");

        let worker_count = worker_count.max(1);
        let state = Box::new(ContextState {
            width: width as i32,
            height: height as i32,
            clear_color: Color::CLEAR,
            raster_mode: RasterizationMode::Halfspace,
            aa_mode: AntiAliasingMode::Off,
            mipmaps_enabled: true,
            color: RenderBuffer::with_size(width as i32, height as i32, 1),
            depth: RenderBuffer::with_size(width as i32, height as i32, 1),
            samples: RenderBuffer::new(),
            frame: FrameState::new(),
        });

        let workers = (0..worker_count).map(RenderWorker::spawn).collect();

        log::info!("render context: {width}x{height}, {worker_count} workers");

        Self { state, workers }
    }

    pub fn width(&self) -> u32 {
        self.state.width as u32
    }

    pub fn height(&self) -> u32 {
        self.state.height as u32
    }

    pub fn clear_color(&self) -> Color {
        self.state.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.state.clear_color = color;
    }

    pub fn rasterization_mode(&self) -> RasterizationMode {
        self.state.raster_mode
    }

    pub fn set_rasterization_mode(&mut self, mode: RasterizationMode) {
        self.state.raster_mode = mode;
    }

    pub fn antialiasing_mode(&self) -> AntiAliasingMode {
        self.state.aa_mode
    }

    /// Switch AA mode, resizing the sample and depth storage. Buffer
    /// contents are unspecified afterwards; clear before drawing.
    pub fn set_antialiasing_mode(&mut self, mode: AntiAliasingMode) {
        let state = &mut *self.state;
        state.aa_mode = mode;

        let spp = mode.samples_per_pixel() as i32;
        state.depth.resize(state.width, state.height, spp);
        if spp > 1 {
            state.samples.resize(state.width, state.height, spp);
        } else {
            state.samples.resize(0, 0, 0);
        }

        log::debug!("antialiasing mode {mode:?}, {spp} samples per pixel");
    }

    pub fn mipmaps_enabled(&self) -> bool {
        self.state.mipmaps_enabled
    }

    pub fn set_mipmaps_enabled(&mut self, enabled: bool) {
        self.state.mipmaps_enabled = enabled;
    }

    /// Fill the selected buffers: color (display and samples) with the
    /// clear color, depth with zero (infinitely far in 1/w).
    pub fn clear(&mut self, color: bool, depth: bool) {
        let state = &mut *self.state;
        if color {
            let packed = state.clear_color.to_packed();
            state.color.fill(packed);
            if !state.samples.is_empty() {
                state.samples.fill(packed);
            }
        }
        if depth {
            state.depth.fill(0.0);
        }
    }

    /// Render the scene: build draw calls, dispatch bands to the worker
    /// pool, and wait for frame completion.
    pub fn draw(&mut self, scene: &Scene) {
        let render_w = self.state.render_width() as f32;
        let render_h = self.state.render_height() as f32;
        pipeline::build_draw_calls(&mut self.state.frame, scene, render_w, render_h);

        let context_ptr: *const ContextState = &*self.state;
        for (worker, band) in self
            .workers
            .iter()
            .zip(bands(self.state.width, self.state.height, self.workers.len()))
        {
            worker.execute(context_ptr, band);
        }

        for worker in &self.workers {
            worker.wait();
        }

        self.state.frame.clear();
    }

    /// Hand the finished display buffer to the host surface.
    pub fn present(&mut self, target: &mut dyn PresentTarget) {
        target.blit(
            self.state.color.as_slice(),
            self.state.width as u32,
            self.state.height as u32,
        );
    }

    /// The display buffer, BGRA-packed, top-down row-major.
    pub fn display(&self) -> &[u32] {
        self.state.color.as_slice()
    }
}

/// Disjoint horizontal bands covering `[0, height)`: `height / count`
/// rows each, remainder absorbed by the last band.
fn bands(width: i32, height: i32, count: usize) -> Vec<Rect> {
    let count = (count.max(1) as i32).min(height.max(1));
    let segment = height / count;

    (0..count)
        .map(|i| {
            let y = segment * i;
            let h = if i == count - 1 { height - y } else { segment };
            Rect::new(0, y, width, h)
        })
        .collect()
}
