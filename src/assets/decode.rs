use std::io::Cursor;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{WardrobeError, WardrobeResult};

/// Read pixel dimensions from encoded image bytes without decoding pixel data.
pub fn probe_dimensions(bytes: &[u8]) -> WardrobeResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WardrobeError::dimensions_unavailable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| WardrobeError::dimensions_unavailable(e.to_string()))
}

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> WardrobeResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Decode encoded image bytes into premultiplied RGBA8.
pub fn decode_premul(bytes: &[u8]) -> WardrobeResult<RgbaImage> {
    let mut img = decode_rgba(bytes)?;
    premultiply_rgba8_in_place(&mut img);
    Ok(img)
}

/// Encode straight-alpha RGBA8 as PNG.
pub fn encode_png(img: &RgbaImage) -> WardrobeResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Sniff the MIME type of encoded image bytes, defaulting to PNG.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::WebP) => "image/webp",
        Ok(image::ImageFormat::Gif) => "image/gif",
        _ => "image/png",
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
