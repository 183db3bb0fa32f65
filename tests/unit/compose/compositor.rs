use crate::model::outfit::SlotRect;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bunnywear_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &Path, width: u32, height: u32, px: [u8; 4]) {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(px));
    fsio::write_creating_dirs(path, &decode::encode_png(&img).unwrap()).unwrap();
}

fn fixture(name: &str) -> (PathBuf, Compositor) {
    let root = temp_dir(name);
    write_png(&root.join("base.png"), 16, 16, [0, 0, 255, 255]);
    write_png(&root.join("items/red.png"), 4, 4, [255, 0, 0, 255]);
    write_png(&root.join("items/green.png"), 2, 2, [0, 255, 0, 255]);

    let mut table = crate::layout::slots::SlotTable::new();
    table.insert("head".to_string(), SlotRect::sized(0, 0, 8, 8));
    table.insert("face".to_string(), SlotRect::anchor(2, 2));
    let layout = Arc::new(SlotLayout::from_table(table).unwrap());
    (root.clone(), Compositor::new(layout, root))
}

fn decode_out(png: &[u8]) -> RgbaImage {
    decode::decode_rgba(png).unwrap()
}

#[test]
fn output_keeps_base_dimensions() {
    let (root, comp) = fixture("compositor_dims");
    let items = vec![EquippedItem::new("r", "head", "/items/red.png", "Red")];
    let out = decode_out(&comp.composite(&root.join("base.png"), &items).unwrap());
    assert_eq!(out.dimensions(), (16, 16));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn sized_slot_scales_item_to_rect() {
    let (root, comp) = fixture("compositor_sized");
    let items = vec![EquippedItem::new("r", "head", "/items/red.png", "Red")];
    let out = decode_out(&comp.composite(&root.join("base.png"), &items).unwrap());

    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(7, 7).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(8, 8).0, [0, 0, 255, 255]);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn unsized_slot_uses_native_size() {
    let (root, comp) = fixture("compositor_native");
    let items = vec![EquippedItem::new("g", "face", "items/green.png", "Green")];
    let out = decode_out(&comp.composite(&root.join("base.png"), &items).unwrap());

    assert_eq!(out.get_pixel(2, 2).0, [0, 255, 0, 255]);
    assert_eq!(out.get_pixel(3, 3).0, [0, 255, 0, 255]);
    assert_eq!(out.get_pixel(4, 4).0, [0, 0, 255, 255]);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn later_items_draw_over_earlier_ones() {
    let (root, comp) = fixture("compositor_order");
    let base = root.join("base.png");
    let red_then_green = vec![
        EquippedItem::new("r", "head", "/items/red.png", "Red"),
        EquippedItem::new("g", "face", "/items/green.png", "Green"),
    ];
    let out = decode_out(&comp.composite(&base, &red_then_green).unwrap());
    assert_eq!(out.get_pixel(2, 2).0, [0, 255, 0, 255]);

    let green_then_red = red_then_green.into_iter().rev().collect::<Vec<_>>();
    let out = decode_out(&comp.composite(&base, &green_then_red).unwrap());
    assert_eq!(out.get_pixel(2, 2).0, [255, 0, 0, 255]);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn unknown_slot_and_missing_image_are_skipped() {
    let (root, comp) = fixture("compositor_skip");
    let base = root.join("base.png");
    let plain = comp
        .composite(&base, &[EquippedItem::new("r", "head", "/items/red.png", "Red")])
        .unwrap();
    let noisy = comp
        .composite(
            &base,
            &[
                EquippedItem::new("t", "tail", "/items/red.png", "Tail"),
                EquippedItem::new("r", "head", "/items/red.png", "Red"),
                EquippedItem::new("m", "face", "/items/missing.png", "Missing"),
                EquippedItem::new("x", "face", "../escape.png", "Escape"),
            ],
        )
        .unwrap();
    assert_eq!(decode_out(&plain), decode_out(&noisy));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn corrupt_item_image_is_skipped() {
    let (root, comp) = fixture("compositor_corrupt");
    std::fs::write(root.join("items/bad.png"), b"garbage").unwrap();
    let base = root.join("base.png");

    let out = comp
        .composite(&base, &[EquippedItem::new("b", "head", "/items/bad.png", "Bad")])
        .unwrap();
    let bare = comp.composite(&base, &[]).unwrap();
    assert_eq!(decode_out(&out), decode_out(&bare));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn unreadable_base_fails() {
    let (root, comp) = fixture("compositor_base");
    std::fs::write(root.join("broken.png"), b"not an image").unwrap();

    let err = comp.composite(&root.join("broken.png"), &[]).unwrap_err();
    assert!(matches!(err, WardrobeError::DimensionsUnavailable(_)));
    assert!(comp.composite(&root.join("absent.png"), &[]).is_err());
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn cached_composite_is_keyed_by_fingerprint() {
    let (root, comp) = fixture("compositor_cache");
    let cache = root.join("cache");
    let base = root.join("base.png");
    let items = vec![
        EquippedItem::new("hat1", "head", "/items/red.png", "Hat"),
        EquippedItem::new("boots1", "face", "/items/green.png", "Boots"),
    ];

    let first = comp
        .composite_cached(&cache, &base, "bunny-base", &items)
        .unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.key, "bunny-base_boots1,hat1");
    assert!(cache.join("bunny-base_boots1%2Chat1.png").is_file());

    let reversed = items.into_iter().rev().collect::<Vec<_>>();
    let second = comp
        .composite_cached(&cache, &base, "bunny-base", &reversed)
        .unwrap();
    assert!(second.cache_hit);
    assert_eq!(first.png, second.png);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn cache_entries_do_not_collide_on_url_characters() {
    let (root, comp) = fixture("compositor_cache_ids");
    let cache = root.join("cache");
    let base = root.join("base.png");

    let red = comp
        .composite_cached(
            &cache,
            &base,
            "b",
            &[EquippedItem::new("hat?red", "head", "/items/red.png", "Red hat")],
        )
        .unwrap();
    let blue = comp
        .composite_cached(
            &cache,
            &base,
            "b",
            &[EquippedItem::new("hat?blue", "head", "/items/missing.png", "Blue hat")],
        )
        .unwrap();

    assert_eq!(red.key, "b_hat?red");
    assert_eq!(blue.key, "b_hat?blue");
    assert!(!blue.cache_hit);
    assert_ne!(red.png, blue.png);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn traversal_like_item_ids_still_cache() {
    let (root, comp) = fixture("compositor_cache_dots");
    let cache = root.join("cache");
    let items = [EquippedItem::new("a/../b", "head", "/items/red.png", "Odd")];

    let first = comp
        .composite_cached(&cache, &root.join("base.png"), "b", &items)
        .unwrap();
    assert_eq!(first.key, "b_a/../b");
    assert!(!first.cache_hit);
    assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 1);

    let again = comp
        .composite_cached(&cache, &root.join("base.png"), "b", &items)
        .unwrap();
    assert!(again.cache_hit);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn empty_item_set_reproduces_translucent_base_exactly() {
    let (root, comp) = fixture("compositor_translucent");
    let mut base = RgbaImage::from_pixel(5, 3, image::Rgba([200, 100, 50, 77]));
    base.put_pixel(1, 1, image::Rgba([13, 250, 7, 3]));
    let base_path = root.join("translucent.png");
    fsio::write_creating_dirs(&base_path, &decode::encode_png(&base).unwrap()).unwrap();

    let bare = decode_out(&comp.composite(&base_path, &[]).unwrap());
    assert_eq!(bare, base);

    let skipped = comp
        .composite(&base_path, &[EquippedItem::new("t", "tail", "/items/red.png", "Tail")])
        .unwrap();
    assert_eq!(decode_out(&skipped), base);
    std::fs::remove_dir_all(&root).ok();
}
