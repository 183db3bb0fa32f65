use image::RgbaImage;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over: `src + dst * (1 - src.a)`, per channel, rounded.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let keep = 255 - u32::from(src[3]);
    std::array::from_fn(|c| {
        let below = (u32::from(dst[c]) * keep + 127) / 255;
        (u32::from(src[c]) + below).min(255) as u8
    })
}

/// Draw premultiplied `src` over premultiplied `dst` with its top-left corner at `(x, y)`.
///
/// Offsets may be negative or push the layer past the canvas; the overlap is clipped.
pub fn over_at(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + sw).min(dw);
    let y1 = (y + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for dy in y0..y1 {
        for dx in x0..x1 {
            let s = src.get_pixel((dx - x) as u32, (dy - y) as u32).0;
            let d = dst.get_pixel_mut(dx as u32, dy as u32);
            d.0 = over(d.0, s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
