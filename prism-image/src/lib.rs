// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Image file decoding for texture sources.
//!
//! Decoders deliver a tightly packed `Color32` array in top-down row-major
//! order, with no stride padding and no palette. Vertical orientation is
//! normalized here: the BMP decoder flips bottom-up files and the TGA
//! decoder flips files whose descriptor bit 5 is clear, so consumers never
//! re-flip.

use std::path::Path;

use thiserror::Error;

use prism_common::Color32;

pub mod bmp;
pub mod tga;

/// Errors that can occur while decoding an image file.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid image data: {0}")]
    Invalid(String),

    #[error("truncated image data")]
    Truncated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded image: tightly packed pixels, top-down row-major.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub pixels: Vec<Color32>,
    pub width: u32,
    pub height: u32,
    /// Channels stored in the source file, 3 or 4.
    pub channels: u32,
}

/// Load an image file, dispatching on the (lowercased) file extension.
/// Only 24 and 32 bit BMP and TGA files are supported.
pub fn load(path: impl AsRef<Path>) -> Result<RawImage, ImageError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let decode: fn(&[u8]) -> Result<RawImage, ImageError> = match ext.as_str() {
        "bmp" => bmp::decode,
        "tga" => tga::decode,
        other => return Err(ImageError::UnsupportedFormat(other.to_string())),
    };

    let data = std::fs::read(path)?;
    let image = decode(&data)?;

    log::debug!(
        "loaded {}: {}x{}, {} channels",
        path.display(),
        image.width,
        image.height,
        image.channels
    );
    Ok(image)
}
