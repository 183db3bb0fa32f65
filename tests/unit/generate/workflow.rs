use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::{
    WardrobeError,
    generate::client::{GeneratedImage, image_or_base},
};

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

fn write_png(path: &Path, px: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(px));
    fsio::write_creating_dirs(path, &decode::encode_png(&img).unwrap()).unwrap();
}

/// Returns the base image unchanged, recording what it was sent.
#[derive(Default)]
struct EchoGenerator {
    calls: AtomicUsize,
    last_items: Mutex<usize>,
}

impl ImageGenerator for EchoGenerator {
    fn generate(&self, request: &GenerationRequest) -> WardrobeResult<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_items.lock().unwrap() = request.items.len();
        Ok(image_or_base(None, &request.base))
    }
}

/// Answers with a solid image, counting calls.
#[derive(Default)]
struct PaintGenerator {
    calls: AtomicUsize,
}

impl ImageGenerator for PaintGenerator {
    fn generate(&self, _request: &GenerationRequest) -> WardrobeResult<GeneratedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([128, 0, 128, 255]));
        Ok(GeneratedImage {
            image: InlineImage::from_bytes(decode::encode_png(&img)?),
            fell_back: false,
        })
    }
}

struct FailingGenerator;

impl ImageGenerator for FailingGenerator {
    fn generate(&self, _request: &GenerationRequest) -> WardrobeResult<GeneratedImage> {
        Err(WardrobeError::generation("upstream down"))
    }
}

fn setup(name: &str) -> PathBuf {
    let root = temp_dir(name);
    write_png(&root.join("public/bunny.png"), [200, 200, 200, 255]);
    write_png(&root.join("public/items/hat.png"), [255, 0, 0, 255]);
    root
}

#[test]
fn generates_once_then_serves_from_gallery() {
    let root = setup("workflow_cache");
    let paint = Arc::new(PaintGenerator::default());
    let generator = OutfitGenerator::new(
        paint.clone(),
        root.join("public"),
        root.join("generated"),
        "/generated-bunnies",
    );
    let items = vec![
        EquippedItem::new("hat1", "head", "/items/hat.png", "Hat"),
        EquippedItem::new("boots1", "feet", "/items/missing.png", "Boots"),
    ];

    let first = generator
        .generate("/bunny.png", "bunny-base", Some("meadow"), &items)
        .unwrap();
    assert!(!first.cached);
    assert!(!first.fell_back);
    assert_eq!(first.outfit.key, "bunny_gemini_bunny-base_meadow_boots1,hat1");
    assert_eq!(first.outfit.scene.as_deref(), Some("meadow"));
    assert_eq!(first.outfit.equipped_items, vec!["Hat", "Boots"]);

    let reversed = items.into_iter().rev().collect::<Vec<_>>();
    let second = generator
        .generate("/bunny.png", "bunny-base", Some("meadow"), &reversed)
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.outfit.key, first.outfit.key);
    assert_eq!(paint.calls.load(Ordering::SeqCst), 1);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn fallback_is_served_but_not_stored() {
    let root = setup("workflow_fallback");
    let echo = Arc::new(EchoGenerator::default());
    let items = vec![
        EquippedItem::new("hat1", "head", "/items/hat.png", "Hat"),
        EquippedItem::new("boots1", "feet", "/items/missing.png", "Boots"),
    ];

    let first = OutfitGenerator::new(
        echo.clone(),
        root.join("public"),
        root.join("generated"),
        "/g",
    )
    .generate("/bunny.png", "bunny-base", None, &items)
    .unwrap();
    assert!(first.fell_back);
    assert!(!first.cached);
    assert_eq!(first.outfit.normal_url, "/bunny.png");
    assert_eq!(first.outfit.equipped_items, vec!["Hat", "Boots"]);
    assert_eq!(*echo.last_items.lock().unwrap(), 1);
    assert!(!root.join("generated").exists());

    let paint = Arc::new(PaintGenerator::default());
    let retry = OutfitGenerator::new(
        paint.clone(),
        root.join("public"),
        root.join("generated"),
        "/g",
    )
    .generate("/bunny.png", "bunny-base", None, &items)
    .unwrap();
    assert!(!retry.cached);
    assert!(!retry.fell_back);
    assert_eq!(paint.calls.load(Ordering::SeqCst), 1);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn keys_escaping_the_gallery_are_rejected_before_any_work() {
    let root = setup("workflow_escape");
    write_png(&root.join("private/normal.png"), [0, 0, 0, 255]);
    std::fs::write(root.join("private/metadata.json"), br#"{"secret":"s3cr3t"}"#).unwrap();
    let paint = Arc::new(PaintGenerator::default());
    let generator = OutfitGenerator::new(
        paint.clone(),
        root.join("public"),
        root.join("generated"),
        "/g",
    );

    let err = generator
        .generate("/bunny.png", "../private", None, &[])
        .unwrap_err();
    assert!(matches!(err, WardrobeError::Validation(_)));

    let slashed = [EquippedItem::new("a/b", "head", "/items/hat.png", "Hat")];
    let err = generator
        .generate("/bunny.png", "bunny-base", None, &slashed)
        .unwrap_err();
    assert!(matches!(err, WardrobeError::Validation(_)));
    assert_eq!(paint.calls.load(Ordering::SeqCst), 0);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn generator_failures_propagate_and_write_nothing() {
    let root = setup("workflow_fail");
    let generator = OutfitGenerator::new(
        Arc::new(FailingGenerator),
        root.join("public"),
        root.join("generated"),
        "/g",
    );
    let err = generator
        .generate("/bunny.png", "bunny-base", None, &[])
        .unwrap_err();
    assert!(matches!(err, WardrobeError::Generation(_)));
    assert!(!root.join("generated").exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_base_image_fails() {
    let root = setup("workflow_base");
    let generator = OutfitGenerator::new(
        Arc::new(EchoGenerator::default()),
        root.join("public"),
        root.join("generated"),
        "/g",
    );
    assert!(generator.generate("/nope.png", "b", None, &[]).is_err());
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn non_png_output_is_converted() {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .to_rgb8()
        .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .unwrap();
    let png = to_png(&jpeg).unwrap();
    assert!(matches!(
        image::guess_format(&png),
        Ok(image::ImageFormat::Png)
    ));
}
