// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Textures: a mipmap chain plus a filter mode and mip bias.
//!
//! Level 0 is the source image; every further level halves each dimension
//! (floor, clamped at 1) by box-filtering 2×2 / 2×1 / 1×2 blocks of its
//! predecessor. All levels live in one contiguous allocation indexed by
//! precomputed offsets. Texture coordinates are in `[0,1]²` with clamp
//! addressing.

use std::sync::atomic::{AtomicU8, Ordering};

use glam::Vec2;

use prism_common::{Color, Color32};
use prism_image::RawImage;

/// Texture filtering mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FilterMode {
    Point,
    Bilinear,
    Trilinear,
}

impl FilterMode {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Point,
            1 => Self::Bilinear,
            _ => Self::Trilinear,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Bilinear => 1,
            Self::Trilinear => 2,
        }
    }
}

/// One level of the mipmap chain: offset into the shared pixel store.
#[derive(Clone, Copy, Debug)]
struct MipLevel {
    offset: usize,
    width: i32,
    height: i32,
}

/// A 2D texture with mipmaps.
pub struct Texture {
    pixels: Vec<Color32>,
    levels: Vec<MipLevel>,
    width: u32,
    height: u32,
    channels: u32,
    /// Filter mode is runtime-switchable through shared handles.
    filter_mode: AtomicU8,
    mipmap_bias: f32,
}

impl Texture {
    /// Build a texture (and its full mip chain) from a decoded image.
    pub fn from_image(image: &RawImage, filter_mode: FilterMode) -> Self {
        Self::from_pixels(
            &image.pixels,
            image.width,
            image.height,
            image.channels,
            filter_mode,
        )
    }

    /// Build a texture from raw top-down row-major pixels.
    pub fn from_pixels(
        pixels: &[Color32],
        width: u32,
        height: u32,
        channels: u32,
        filter_mode: FilterMode,
    ) -> Self {
        assert!(width > 0 && height > 0, "texture must not be empty");
        assert_eq!(pixels.len(), (width * height) as usize);

        // Lay out the chain: each level half-dimensioned, clamped at 1.
        let mut levels = Vec::new();
        let mut total = 0usize;
        let (mut w, mut h) = (width as i32, height as i32);
        loop {
            levels.push(MipLevel {
                offset: total,
                width: w,
                height: h,
            });
            total += (w * h) as usize;

            if w == 1 && h == 1 {
                break;
            }
            if w > 1 {
                w >>= 1;
            }
            if h > 1 {
                h >>= 1;
            }
        }

        let mut store = vec![Color32::default(); total];
        let mut scratch = pixels.to_vec();
        for level in &levels {
            let count = (level.width * level.height) as usize;
            store[level.offset..level.offset + count].copy_from_slice(&scratch[..count]);
            mip_down(&mut scratch, level.width, level.height);
        }

        log::debug!(
            "texture {}x{}: {} mip levels, {} channels",
            width,
            height,
            levels.len(),
            channels
        );

        Self {
            pixels: store,
            levels,
            width,
            height,
            channels,
            filter_mode: AtomicU8::new(filter_mode.as_u8()),
            mipmap_bias: 0.0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the source image (3 or 4); 4 marks textures whose
    /// alpha carries meaning (cutout, self-illumination).
    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn level_size(&self, level: usize) -> Vec2 {
        let mip = &self.levels[level];
        Vec2::new(mip.width as f32, mip.height as f32)
    }

    pub fn mipmap_count(&self) -> usize {
        self.levels.len()
    }

    pub fn mipmap_bias(&self) -> f32 {
        self.mipmap_bias
    }

    pub fn set_mipmap_bias(&mut self, bias: f32) {
        self.mipmap_bias = bias;
    }

    pub fn filter_mode(&self) -> FilterMode {
        FilterMode::from_u8(self.filter_mode.load(Ordering::Relaxed))
    }

    pub fn set_filter_mode(&self, mode: FilterMode) {
        self.filter_mode.store(mode.as_u8(), Ordering::Relaxed);
    }

    /// Sample at `uv` (clamped to `[0,1]²`) and fractional mip level,
    /// using the texture's filter mode.
    pub fn sample(&self, uv: Vec2, mip_level: f32) -> Color {
        match self.filter_mode() {
            FilterMode::Point => self.sample_point(uv, mip_level),
            FilterMode::Bilinear => self.sample_bilinear(uv, mip_level),
            FilterMode::Trilinear => self.sample_trilinear(uv, mip_level),
        }
    }

    /// Nearest-texel fetch.
    pub fn sample_point(&self, uv: Vec2, mip_level: f32) -> Color {
        let mip = self.level(mip_level);
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);
        let x = ((mip.width - 1) as f32 * u + 0.5) as i32;
        let y = ((mip.height - 1) as f32 * v + 0.5) as i32;
        self.pixels[mip.offset + (y * mip.width + x) as usize].into()
    }

    /// Weighted 2×2 fetch with border clamping.
    pub fn sample_bilinear(&self, uv: Vec2, mip_level: f32) -> Color {
        let mip = self.level(mip_level);
        let x = uv.x.clamp(0.0, 1.0) * mip.width as f32;
        let y = uv.y.clamp(0.0, 1.0) * mip.height as f32;
        let ix = (x as i32).min(mip.width - 1);
        let iy = (y as i32).min(mip.height - 1);

        // Neighbor offsets collapse to 0 at the border (clamp addressing).
        let xoff = i32::from(ix < mip.width - 1) as usize;
        let yoff = (i32::from(iy < mip.height - 1) * mip.width) as usize;

        let u1 = x - ix as f32;
        let u0 = 1.0 - u1;
        let v1 = y - iy as f32;
        let v0 = 1.0 - v1;

        let base = mip.offset + (iy * mip.width + ix) as usize;
        let p00: Color = self.pixels[base].into();
        let p01: Color = self.pixels[base + xoff].into();
        let p10: Color = self.pixels[base + yoff].into();
        let p11: Color = self.pixels[base + yoff + xoff].into();

        p00 * (v0 * u0) + p01 * (v0 * u1) + p10 * (v1 * u0) + p11 * (v1 * u1)
    }

    /// Bilinear at the two bracketing levels, blended by the fraction.
    pub fn sample_trilinear(&self, uv: Vec2, mip_level: f32) -> Color {
        let mip0 = mip_level.floor();
        let mip1 = mip_level.ceil();

        if mip0 == mip1 {
            return self.sample_bilinear(uv, mip_level);
        }

        let t = mip_level - mip0;
        Color::lerp(
            self.sample_bilinear(uv, mip0),
            self.sample_bilinear(uv, mip1),
            t,
        )
    }

    fn level(&self, mip_level: f32) -> &MipLevel {
        debug_assert!(
            mip_level >= 0.0 && (mip_level as usize) < self.levels.len(),
            "mip level {mip_level} out of range"
        );
        let index = (mip_level as usize).min(self.levels.len() - 1);
        &self.levels[index]
    }
}

/// In-place box reduction of one level into the next smaller one.
fn mip_down(pixels: &mut [Color32], w: i32, h: i32) {
    #[inline]
    fn add(acc: &mut [u32; 4], c: Color32) {
        acc[0] += c.r as u32;
        acc[1] += c.g as u32;
        acc[2] += c.b as u32;
        acc[3] += c.a as u32;
    }

    if w > 1 && h > 1 {
        let dest_w = w >> 1;
        let dest_h = h >> 1;
        for y in 0..dest_h {
            for x in 0..dest_w {
                let src = ((y * 2) * w + x * 2) as usize;
                let mut acc = [0u32; 4];
                add(&mut acc, pixels[src]);
                add(&mut acc, pixels[src + 1]);
                add(&mut acc, pixels[src + w as usize]);
                add(&mut acc, pixels[src + w as usize + 1]);
                pixels[(y * dest_w + x) as usize] = Color32::new(
                    (acc[0] >> 2) as u8,
                    (acc[1] >> 2) as u8,
                    (acc[2] >> 2) as u8,
                    (acc[3] >> 2) as u8,
                );
            }
        }
    } else if w > 1 {
        let dest_w = w >> 1;
        for x in 0..dest_w {
            let src = (x * 2) as usize;
            let mut acc = [0u32; 4];
            add(&mut acc, pixels[src]);
            add(&mut acc, pixels[src + 1]);
            pixels[x as usize] = Color32::new(
                (acc[0] >> 1) as u8,
                (acc[1] >> 1) as u8,
                (acc[2] >> 1) as u8,
                (acc[3] >> 1) as u8,
            );
        }
    } else if h > 1 {
        let dest_h = h >> 1;
        for y in 0..dest_h {
            let src = (y * 2) as usize;
            let mut acc = [0u32; 4];
            add(&mut acc, pixels[src]);
            add(&mut acc, pixels[src + 1]);
            pixels[y as usize] = Color32::new(
                (acc[0] >> 1) as u8,
                (acc[1] >> 1) as u8,
                (acc[2] >> 1) as u8,
                (acc[3] >> 1) as u8,
            );
        }
    }
}
