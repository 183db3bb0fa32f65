use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    assets::{decode, fsio},
    compose::{blend, contain},
    foundation::error::{WardrobeError, WardrobeResult},
    identity::fingerprint,
    layout::slots::SlotLayout,
    model::outfit::EquippedItem,
};

/// Layers equipped items onto a base bunny image at their slot rectangles.
#[derive(Clone, Debug)]
pub struct Compositor {
    layout: Arc<SlotLayout>,
    public_root: PathBuf,
}

/// Result of [`Compositor::composite_cached`].
#[derive(Clone, Debug)]
pub struct CachedComposite {
    /// Fingerprint the composite is stored under.
    pub key: String,
    /// Encoded PNG.
    pub png: Vec<u8>,
    /// Whether the PNG came from the cache.
    pub cache_hit: bool,
}

struct Layer {
    image: RgbaImage,
    x: i64,
    y: i64,
}

impl Compositor {
    /// Item `image_url`s are resolved under `public_root`.
    pub fn new(layout: Arc<SlotLayout>, public_root: impl Into<PathBuf>) -> Self {
        Self {
            layout,
            public_root: public_root.into(),
        }
    }

    /// Slot placement table this compositor reads.
    pub fn layout(&self) -> &Arc<SlotLayout> {
        &self.layout
    }

    /// Root directory item image URLs resolve against.
    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Composite `items` over the image at `base_path` and return PNG bytes.
    ///
    /// Items with an unknown slot or an unreadable image are skipped. Layers are drawn in input
    /// order, so later items cover earlier ones. The output keeps the base image's dimensions.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub fn composite(&self, base_path: &Path, items: &[EquippedItem]) -> WardrobeResult<Vec<u8>> {
        let base_bytes = std::fs::read(base_path)
            .with_context(|| format!("read base image '{}'", base_path.display()))?;
        let (width, height) = decode::probe_dimensions(&base_bytes)?;

        let layers = items
            .par_iter()
            .filter_map(|item| self.prepare_layer(item))
            .collect::<Vec<_>>();
        tracing::debug!(drawn = layers.len(), skipped = items.len() - layers.len(), "prepared layers");

        // Premultiplying is lossy for translucent pixels; leave an undressed base untouched.
        let mut canvas = if layers.is_empty() {
            decode::decode_rgba(&base_bytes)?
        } else {
            decode::decode_premul(&base_bytes)?
        };
        if canvas.dimensions() != (width, height) {
            return Err(WardrobeError::dimensions_unavailable(format!(
                "decoded '{}' does not match its header dimensions",
                base_path.display()
            )));
        }
        if layers.is_empty() {
            return decode::encode_png(&canvas);
        }

        for layer in &layers {
            blend::over_at(&mut canvas, &layer.image, layer.x, layer.y);
        }
        decode::unpremultiply_rgba8_in_place(&mut canvas);
        decode::encode_png(&canvas)
    }

    /// Composite through a PNG cache at `<cache_root>/<encoded fingerprint>.png`.
    ///
    /// The cache key is the plain fingerprint of `base_id` and the item set, so any permutation
    /// of the same items hits the same entry. The file name is the percent-encoded key.
    pub fn composite_cached(
        &self,
        cache_root: &Path,
        base_path: &Path,
        base_id: &str,
        items: &[EquippedItem],
    ) -> WardrobeResult<CachedComposite> {
        let key = fingerprint::fingerprint(items, base_id);
        let cache_path = cache_root.join(fsio::key_file_name(&key, "png"));

        if let Some(png) = fsio::read_optional(&cache_path)? {
            tracing::debug!(%key, "composite cache hit");
            return Ok(CachedComposite {
                key,
                png,
                cache_hit: true,
            });
        }

        let png = self.composite(base_path, items)?;
        fsio::write_creating_dirs(&cache_path, &png)?;
        Ok(CachedComposite {
            key,
            png,
            cache_hit: false,
        })
    }

    fn prepare_layer(&self, item: &EquippedItem) -> Option<Layer> {
        let Some(rect) = self.layout.get(&item.slot) else {
            tracing::warn!(item = %item.item_id, slot = %item.slot, "unknown slot, skipping item");
            return None;
        };

        let image = match self.load_item_image(item) {
            Ok(Some(image)) => image,
            Ok(None) => {
                tracing::warn!(item = %item.item_id, url = %item.image_url, "item image missing, skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(item = %item.item_id, url = %item.image_url, error = %e, "item image unreadable, skipping");
                return None;
            }
        };

        let image = match rect.fit_size() {
            Some((w, h)) => contain::contain(&image, w, h),
            None => image,
        };
        Some(Layer {
            image,
            x: rect.x,
            y: rect.y,
        })
    }

    fn load_item_image(&self, item: &EquippedItem) -> WardrobeResult<Option<RgbaImage>> {
        let path = fsio::resolve_public(&self.public_root, &item.image_url)?;
        match fsio::read_optional(&path)? {
            Some(bytes) => Ok(Some(decode::decode_premul(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
