// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Live SDL2 presentation.
//!
//! Streams the BGRA display buffer into an SDL2 texture each frame and
//! letterboxes it into the window. Keys: Escape quits, F cycles AA,
//! M toggles mipmaps, T cycles the texture filter, space pauses the
//! orbit.

use anyhow::{anyhow, Context, Result};
use log::info;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect as SdlRect;

use prism_common::Rect;
use prism_render::{AntiAliasingMode, FilterMode, RenderContext, Scene};

use crate::demo;

pub fn run(mut context: RenderContext, mut scene: Scene, _frames: u32) -> Result<()> {
    let width = context.width();
    let height = context.height();

    let sdl = sdl2::init().map_err(|e| anyhow!("SDL2 init failed: {e}"))?;
    let video = sdl.video().map_err(|e| anyhow!("SDL2 video failed: {e}"))?;
    let sdl_window = video
        .window("prism", width, height)
        .position_centered()
        .resizable()
        .build()
        .context("failed to create window")?;
    let mut canvas = sdl_window
        .into_canvas()
        .build()
        .context("failed to create canvas")?;
    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator
        .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
        .context("failed to create streaming texture")?;
    let mut events = sdl
        .event_pump()
        .map_err(|e| anyhow!("SDL2 event pump failed: {e}"))?;

    info!("window open: Esc quits, F cycles AA, M mipmaps, T filter");

    let mut angle = 0.0f32;
    let mut paused = false;
    let mut filter = FilterMode::Bilinear;

    'main: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,

                Event::KeyDown {
                    keycode: Some(Keycode::F),
                    ..
                } => {
                    let next = match context.antialiasing_mode() {
                        AntiAliasingMode::Off => AntiAliasingMode::Msaa4x,
                        AntiAliasingMode::Msaa4x => AntiAliasingMode::Ssaa2x,
                        AntiAliasingMode::Ssaa2x => AntiAliasingMode::Ssaa4x,
                        AntiAliasingMode::Ssaa4x => AntiAliasingMode::Off,
                    };
                    info!("antialiasing: {next:?}");
                    context.set_antialiasing_mode(next);
                }

                Event::KeyDown {
                    keycode: Some(Keycode::M),
                    ..
                } => {
                    let enabled = !context.mipmaps_enabled();
                    info!("mipmaps: {enabled}");
                    context.set_mipmaps_enabled(enabled);
                }

                Event::KeyDown {
                    keycode: Some(Keycode::T),
                    ..
                } => {
                    filter = match filter {
                        FilterMode::Point => FilterMode::Bilinear,
                        FilterMode::Bilinear => FilterMode::Trilinear,
                        FilterMode::Trilinear => FilterMode::Point,
                    };
                    info!("texture filter: {filter:?}");
                    for object in &scene.objects {
                        object.texture.set_filter_mode(filter);
                    }
                }

                Event::KeyDown {
                    keycode: Some(Keycode::Space),
                    ..
                } => paused = !paused,

                _ => {}
            }
        }

        if !paused {
            angle = (angle + 0.5) % 360.0;
        }
        demo::orbit_camera(&mut scene.camera, angle, 7.0, 2.5);

        context.clear(true, true);
        context.draw(&scene);

        let pixels = context.display();
        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                for y in 0..height as usize {
                    let row = &pixels[y * width as usize..(y + 1) * width as usize];
                    let dst = &mut buffer[y * pitch..y * pitch + width as usize * 4];
                    for (x, &p) in row.iter().enumerate() {
                        dst[x * 4..x * 4 + 4].copy_from_slice(&p.to_le_bytes());
                    }
                }
            })
            .map_err(|e| anyhow!("texture lock failed: {e}"))?;

        let (win_w, win_h) = canvas.output_size().map_err(|e| anyhow!("{e}"))?;
        let dest = Rect::new(0, 0, width as i32, height as i32)
            .fit_into(&Rect::new(0, 0, win_w as i32, win_h as i32));

        canvas.clear();
        canvas
            .copy(
                &texture,
                None,
                Some(SdlRect::new(dest.x, dest.y, dest.w as u32, dest.h as u32)),
            )
            .map_err(|e| anyhow!("canvas copy failed: {e}"))?;
        canvas.present();
    }

    Ok(())
}
