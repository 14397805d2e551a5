// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! prism — software 3D renderer demo.
//!
//! Renders the built-in demo scene on the CPU. By default it runs
//! headless, orbiting the camera for a number of frames and writing the
//! final frame to a BMP; with the `window` feature and `--window` it
//! opens a live SDL2 view instead.

mod demo;
mod shaders;
#[cfg(feature = "window")]
mod window;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use prism_common::Color;
use prism_render::{
    AntiAliasingMode, FilterMode, PresentTarget, RasterizationMode, RenderContext, Texture,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum AaOption {
    Off,
    Msaa4x,
    Ssaa2x,
    Ssaa4x,
}

impl From<AaOption> for AntiAliasingMode {
    fn from(v: AaOption) -> Self {
        match v {
            AaOption::Off => Self::Off,
            AaOption::Msaa4x => Self::Msaa4x,
            AaOption::Ssaa2x => Self::Ssaa2x,
            AaOption::Ssaa4x => Self::Ssaa4x,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum FilterOption {
    Point,
    Bilinear,
    Trilinear,
}

impl From<FilterOption> for FilterMode {
    fn from(v: FilterOption) -> Self {
        match v {
            FilterOption::Point => Self::Point,
            FilterOption::Bilinear => Self::Bilinear,
            FilterOption::Trilinear => Self::Trilinear,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum RasterOption {
    Scanline,
    Halfspace,
}

impl From<RasterOption> for RasterizationMode {
    fn from(v: RasterOption) -> Self {
        match v {
            RasterOption::Scanline => Self::Scanline,
            RasterOption::Halfspace => Self::Halfspace,
        }
    }
}

/// prism - CPU software 3D renderer
#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "Software 3D renderer demo")]
struct Args {
    /// Render target width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Render target height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Number of frames to render (camera orbits once)
    #[arg(short, long, default_value_t = 60)]
    frames: u32,

    /// Worker thread count (default: one per hardware thread)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Antialiasing mode
    #[arg(long, value_enum, default_value = "off")]
    aa: AaOption,

    /// Texture filter mode
    #[arg(long, value_enum, default_value = "bilinear")]
    filter: FilterOption,

    /// Rasterization algorithm
    #[arg(long, value_enum, default_value = "halfspace")]
    raster: RasterOption,

    /// Disable mipmapping
    #[arg(long)]
    no_mipmaps: bool,

    /// Disable lighting
    #[arg(long)]
    no_lighting: bool,

    /// Scene settings JSON applied over the built-in scene
    #[arg(long)]
    scene_settings: Option<PathBuf>,

    /// BMP/TGA file replacing the terrain's procedural texture
    #[arg(long)]
    ground_texture: Option<PathBuf>,

    /// Output BMP for the final frame (headless mode)
    #[arg(short, long, default_value = "frame.bmp")]
    output: PathBuf,

    /// Open a live window instead of rendering headless
    #[arg(long)]
    window: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Present target that keeps the last presented frame for encoding.
struct FrameCapture {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PresentTarget for FrameCapture {
    fn blit(&mut self, pixels: &[u32], width: u32, height: u32) {
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.width = width;
        self.height = height;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("prism - software 3D renderer");

    let threads = args.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let mut context = RenderContext::new(args.width, args.height, threads);
    context.set_clear_color(Color::new(0.35, 0.55, 0.8, 1.0));
    context.set_antialiasing_mode(args.aa.into());
    context.set_rasterization_mode(args.raster.into());
    context.set_mipmaps_enabled(!args.no_mipmaps);

    let aspect = args.width as f32 / args.height as f32;
    let mut scene = demo::build_scene(aspect, args.filter.into(), !args.no_lighting);

    if let Some(path) = &args.scene_settings {
        scene
            .apply_settings(path)
            .with_context(|| format!("failed to apply {}", path.display()))?;
        info!("applied scene settings from {}", path.display());
    }

    if let Some(path) = &args.ground_texture {
        let image = prism_image::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let texture = Arc::new(Texture::from_image(&image, args.filter.into()));
        if let Some(terrain) = scene.find_object_mut("terrain") {
            terrain.texture = texture;
        }
    }

    if args.window {
        return run_windowed(context, scene, &args);
    }

    run_headless(&mut context, &mut scene, &args)
}

fn run_headless(
    context: &mut RenderContext,
    scene: &mut prism_render::Scene,
    args: &Args,
) -> Result<()> {
    let frames = args.frames.max(1);
    let mut capture = FrameCapture {
        pixels: Vec::new(),
        width: 0,
        height: 0,
    };

    let start = Instant::now();
    for frame in 0..frames {
        let angle = frame as f32 / frames as f32 * 360.0;
        demo::orbit_camera(&mut scene.camera, angle, 7.0, 2.5);

        context.clear(true, true);
        context.draw(scene);
        context.present(&mut capture);
    }
    let elapsed = start.elapsed();

    info!(
        "{} frames in {:.2?} ({:.1} fps)",
        frames,
        elapsed,
        frames as f64 / elapsed.as_secs_f64().max(1e-9)
    );

    let pixels: Vec<prism_common::Color32> = capture
        .pixels
        .iter()
        .map(|&p| prism_common::Color32::from_packed(p))
        .collect();
    prism_image::bmp::save(&args.output, &pixels, capture.width, capture.height)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}

#[cfg(feature = "window")]
fn run_windowed(context: RenderContext, scene: prism_render::Scene, args: &Args) -> Result<()> {
    window::run(context, scene, args.frames)
}

#[cfg(not(feature = "window"))]
fn run_windowed(
    _context: RenderContext,
    _scene: prism_render::Scene,
    _args: &Args,
) -> Result<()> {
    anyhow::bail!("built without the `window` feature; rebuild with --features window")
}
