use super::*;

#[test]
fn over_half_alpha_mixes_with_dst() {
    let dst = [0, 0, 200, 255];
    let src = [128, 0, 0, 128];
    assert_eq!(over(dst, src), [128, 0, 100, 255]);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_at_clips_negative_and_overflowing_offsets() {
    let mut dst = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
    let src = RgbaImage::from_pixel(3, 3, image::Rgba([255, 0, 0, 255]));

    over_at(&mut dst, &src, -2, 3);

    assert_eq!(dst.get_pixel(0, 3).0, [255, 0, 0, 255]);
    assert_eq!(dst.get_pixel(1, 3).0, [0, 0, 0, 255]);
    assert_eq!(dst.get_pixel(0, 2).0, [0, 0, 0, 255]);
}

#[test]
fn over_at_fully_outside_is_noop() {
    let mut dst = RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
    let before = dst.clone();
    let src = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
    over_at(&mut dst, &src, 5, 0);
    over_at(&mut dst, &src, 0, -2);
    assert_eq!(dst, before);
}
