// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Windows BMP decoding and a minimal writer.
//!
//! Supports uncompressed 24 and 32 bit BI_RGB bitmaps only. Rows in the
//! file are padded to 4-byte boundaries; positive-height files are stored
//! bottom-up and are flipped to top-down on decode.

use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use prism_common::Color32;

use crate::{ImageError, RawImage};

/// 'B', 'M' file type tag.
const BMP_MAGIC: u16 = u16::from_le_bytes([b'B', b'M']);

/// Size of BITMAPFILEHEADER in bytes.
const FILE_HEADER_SIZE: u32 = 14;

/// Size of BITMAPINFOHEADER in bytes.
const INFO_HEADER_SIZE: u32 = 40;

/// Decode a BMP file from memory.
pub fn decode(data: &[u8]) -> Result<RawImage, ImageError> {
    let mut cur = Cursor::new(data);

    let magic = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    if magic != BMP_MAGIC {
        return Err(ImageError::Invalid(
            "not a windows bitmap (missing BM tag)".into(),
        ));
    }
    let _file_size = cur.read_u32::<LittleEndian>().map_err(truncated)?;
    let _reserved = cur.read_u32::<LittleEndian>().map_err(truncated)?;
    let data_offset = cur.read_u32::<LittleEndian>().map_err(truncated)?;

    let header_size = cur.read_u32::<LittleEndian>().map_err(truncated)?;
    if header_size != INFO_HEADER_SIZE {
        return Err(ImageError::Invalid(format!(
            "unexpected info header size {header_size}"
        )));
    }
    let width = cur.read_i32::<LittleEndian>().map_err(truncated)?;
    let height = cur.read_i32::<LittleEndian>().map_err(truncated)?;
    let _planes = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let bit_count = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let compression = cur.read_u32::<LittleEndian>().map_err(truncated)?;

    if compression > 0 {
        return Err(ImageError::UnsupportedFormat(
            "compressed bitmaps are not supported".into(),
        ));
    }
    if bit_count != 24 && bit_count != 32 {
        return Err(ImageError::UnsupportedFormat(format!(
            "only 24 and 32 bit bitmaps are supported, got {bit_count}"
        )));
    }
    if width <= 0 || height == 0 {
        return Err(ImageError::Invalid(format!(
            "bad bitmap dimensions {width}x{height}"
        )));
    }

    // Negative height marks a top-down file.
    let bottom_up = height > 0;
    let w = width as usize;
    let h = height.unsigned_abs() as usize;

    let bytes_per_pixel = (bit_count / 8) as usize;
    let stride = w * bytes_per_pixel;
    let padding = (4 - stride % 4) % 4;

    let pixel_data = data
        .get(data_offset as usize..)
        .ok_or(ImageError::Truncated)?;
    if pixel_data.len() < (stride + padding) * h - padding {
        return Err(ImageError::Truncated);
    }

    let mut pixels = vec![Color32::default(); w * h];
    for row in 0..h {
        // File rows run bottom-up unless the height was negative.
        let dst_y = if bottom_up { h - 1 - row } else { row };
        let src = &pixel_data[row * (stride + padding)..];
        for x in 0..w {
            let p = &src[x * bytes_per_pixel..];
            let a = if bytes_per_pixel == 4 { p[3] } else { 255 };
            pixels[dst_y * w + x] = Color32::new(p[2], p[1], p[0], a);
        }
    }

    Ok(RawImage {
        pixels,
        width: w as u32,
        height: h as u32,
        channels: bytes_per_pixel as u32,
    })
}

/// Encode pixels as an uncompressed 24-bit bottom-up BMP.
pub fn encode(pixels: &[Color32], width: u32, height: u32) -> Vec<u8> {
    assert_eq!(pixels.len(), (width * height) as usize);

    let stride = width as usize * 3;
    let padding = (4 - stride % 4) % 4;
    let image_size = (stride + padding) * height as usize;
    let file_size = FILE_HEADER_SIZE + INFO_HEADER_SIZE + image_size as u32;

    let mut out = Vec::with_capacity(file_size as usize);
    out.extend_from_slice(&BMP_MAGIC.to_le_bytes());
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&(FILE_HEADER_SIZE + INFO_HEADER_SIZE).to_le_bytes());

    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(image_size as u32).to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes()); // x pixels/meter
    out.extend_from_slice(&0i32.to_le_bytes()); // y pixels/meter
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    let pad = [0u8; 3];
    for row in (0..height as usize).rev() {
        for x in 0..width as usize {
            let p = pixels[row * width as usize + x];
            out.extend_from_slice(&[p.b, p.g, p.r]);
        }
        out.extend_from_slice(&pad[..padding]);
    }

    out
}

/// Write pixels to disk as a 24-bit BMP.
pub fn save(
    path: impl AsRef<Path>,
    pixels: &[Color32],
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    std::fs::write(path, encode(pixels, width, height))?;
    Ok(())
}

fn truncated(_: std::io::Error) -> ImageError {
    ImageError::Truncated
}
