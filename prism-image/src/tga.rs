// SPDX-FileCopyrightText: 2025 prism contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Truevision TGA decoding.
//!
//! Supports true-color images, raw (type 2) and run-length encoded
//! (type 10), at 24 or 32 bits per pixel. Files whose image descriptor has
//! bit 5 clear use a bottom-left origin and are flipped to top-down.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use prism_common::Color32;

use crate::{ImageError, RawImage};

/// Uncompressed true-color image.
const TYPE_TRUE_COLOR: u8 = 2;

/// Run-length encoded true-color image.
const TYPE_TRUE_COLOR_RLE: u8 = 10;

/// Descriptor bit 5: origin at the upper-left corner.
const DESC_TOP_ORIGIN: u8 = 0x20;

struct TgaHeader {
    id_length: u8,
    image_type: u8,
    color_map_length: u16,
    color_map_bit_depth: u8,
    width: u16,
    height: u16,
    bit_depth: u8,
    descriptor: u8,
}

fn read_header(cur: &mut Cursor<&[u8]>) -> Result<TgaHeader, ImageError> {
    let id_length = cur.read_u8().map_err(truncated)?;
    let _color_map_type = cur.read_u8().map_err(truncated)?;
    let image_type = cur.read_u8().map_err(truncated)?;
    let _color_map_start = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let color_map_length = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let color_map_bit_depth = cur.read_u8().map_err(truncated)?;
    let _origin_x = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let _origin_y = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let width = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let height = cur.read_u16::<LittleEndian>().map_err(truncated)?;
    let bit_depth = cur.read_u8().map_err(truncated)?;
    let descriptor = cur.read_u8().map_err(truncated)?;

    Ok(TgaHeader {
        id_length,
        image_type,
        color_map_length,
        color_map_bit_depth,
        width,
        height,
        bit_depth,
        descriptor,
    })
}

/// Decode a TGA file from memory.
pub fn decode(data: &[u8]) -> Result<RawImage, ImageError> {
    let mut cur = Cursor::new(data);
    let hdr = read_header(&mut cur)?;

    if hdr.image_type != TYPE_TRUE_COLOR && hdr.image_type != TYPE_TRUE_COLOR_RLE {
        return Err(ImageError::UnsupportedFormat(format!(
            "only true-color TGA files are supported, got type {}",
            hdr.image_type
        )));
    }
    if hdr.bit_depth != 24 && hdr.bit_depth != 32 {
        return Err(ImageError::UnsupportedFormat(format!(
            "only 24 and 32 bit TGA files are supported, got {}",
            hdr.bit_depth
        )));
    }
    if hdr.width == 0 || hdr.height == 0 {
        return Err(ImageError::Invalid(format!(
            "bad TGA dimensions {}x{}",
            hdr.width, hdr.height
        )));
    }

    let bytes_per_pixel = (hdr.bit_depth / 8) as usize;

    // Skip image ID and any (unused) color map.
    let skip = hdr.id_length as u64
        + hdr.color_map_length as u64 * (hdr.color_map_bit_depth / 8) as u64;
    cur.set_position(cur.position() + skip);

    let total = hdr.width as usize * hdr.height as usize;
    let body = data
        .get(cur.position() as usize..)
        .ok_or(ImageError::Truncated)?;

    let mut pixels = if hdr.image_type == TYPE_TRUE_COLOR {
        decode_raw(body, total, bytes_per_pixel)?
    } else {
        decode_rle(body, total, bytes_per_pixel)?
    };

    // Bit 5 clear means bottom-left origin: flip to top-down.
    if hdr.descriptor & DESC_TOP_ORIGIN == 0 {
        flip_vertical(&mut pixels, hdr.width as usize, hdr.height as usize);
    }

    Ok(RawImage {
        pixels,
        width: hdr.width as u32,
        height: hdr.height as u32,
        channels: bytes_per_pixel as u32,
    })
}

fn decode_raw(
    body: &[u8],
    total: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<Color32>, ImageError> {
    if body.len() < total * bytes_per_pixel {
        return Err(ImageError::Truncated);
    }

    let mut pixels = Vec::with_capacity(total);
    for chunk in body[..total * bytes_per_pixel].chunks_exact(bytes_per_pixel) {
        pixels.push(unpack_bgra(chunk));
    }
    Ok(pixels)
}

fn decode_rle(
    body: &[u8],
    total: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<Color32>, ImageError> {
    let mut pixels = Vec::with_capacity(total);
    let mut pos = 0usize;

    while pixels.len() < total {
        let chunk_hdr = *body.get(pos).ok_or(ImageError::Truncated)?;
        pos += 1;

        let is_run = chunk_hdr & 0x80 != 0;
        let length = (chunk_hdr & 0x7F) as usize + 1;

        if is_run {
            let end = pos + bytes_per_pixel;
            let pixel = unpack_bgra(body.get(pos..end).ok_or(ImageError::Truncated)?);
            pos = end;
            for _ in 0..length {
                pixels.push(pixel);
            }
        } else {
            let end = pos + length * bytes_per_pixel;
            let literal = body.get(pos..end).ok_or(ImageError::Truncated)?;
            pos = end;
            for chunk in literal.chunks_exact(bytes_per_pixel) {
                pixels.push(unpack_bgra(chunk));
            }
        }
    }

    // A run may overshoot the pixel count; excess is discarded.
    pixels.truncate(total);
    Ok(pixels)
}

#[inline]
fn unpack_bgra(chunk: &[u8]) -> Color32 {
    let a = if chunk.len() == 4 { chunk[3] } else { 255 };
    Color32::new(chunk[2], chunk[1], chunk[0], a)
}

fn flip_vertical(pixels: &mut [Color32], width: usize, height: usize) {
    for y in 0..height / 2 {
        let (top, rest) = pixels.split_at_mut((height - 1 - y) * width);
        let top_row = &mut top[y * width..y * width + width];
        top_row.swap_with_slice(&mut rest[..width]);
    }
}

fn truncated(_: std::io::Error) -> ImageError {
    ImageError::Truncated
}
