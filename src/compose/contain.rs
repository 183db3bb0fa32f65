use image::{RgbaImage, imageops::FilterType};

/// Fit `src` inside exactly `width x height`, preserving aspect ratio.
///
/// The scaled image is centered on a fully transparent canvas. Input and output are
/// premultiplied so resampling does not bleed color out of transparent pixels.
pub fn contain(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return canvas;
    }

    let scale = f64::min(
        f64::from(width) / f64::from(sw),
        f64::from(height) / f64::from(sh),
    );
    let nw = ((f64::from(sw) * scale).round() as u32).clamp(1, width);
    let nh = ((f64::from(sh) * scale).round() as u32).clamp(1, height);

    let scaled = if (nw, nh) == (sw, sh) {
        src.clone()
    } else {
        image::imageops::resize(src, nw, nh, FilterType::Lanczos3)
    };

    let left = (width - nw) / 2;
    let top = (height - nh) / 2;
    image::imageops::replace(&mut canvas, &scaled, i64::from(left), i64::from(top));
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/compose/contain.rs"]
mod tests;
