use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::{decode, fsio},
    foundation::error::WardrobeResult,
    gallery::{
        reader,
        writer::{self, GeneratedFrames},
    },
    generate::{
        client::{GenerationRequest, ImageGenerator, InlineImage},
        prompt,
    },
    identity::fingerprint,
    model::{
        generated::{GeneratedOutfit, MetadataItem, OutfitMetadata},
        outfit::EquippedItem,
    },
};

/// Outcome of [`OutfitGenerator::generate`].
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    /// Gallery record of the outfit.
    pub outfit: GeneratedOutfit,
    /// Served from an existing gallery folder without calling the generator.
    pub cached: bool,
    /// The generator returned no image; the outfit points at the untouched base image and
    /// nothing was stored, so the next request tries again.
    pub fell_back: bool,
}

/// Generates dressed-up bunnies and stores them in the gallery, keyed by outfit fingerprint.
#[derive(Clone)]
pub struct OutfitGenerator {
    generator: Arc<dyn ImageGenerator>,
    public_root: PathBuf,
    generated_root: PathBuf,
    url_prefix: String,
}

impl OutfitGenerator {
    /// Images are read from `public_root`; results are written under `generated_root`.
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        public_root: impl Into<PathBuf>,
        generated_root: impl Into<PathBuf>,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            public_root: public_root.into(),
            generated_root: generated_root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Return the stored outfit for this base/scene/item set, generating it on a miss.
    ///
    /// Keys that do not name a single gallery folder are rejected before the gallery is read or
    /// the generator is called.
    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    pub fn generate(
        &self,
        base_url: &str,
        base_id: &str,
        scene_id: Option<&str>,
        items: &[EquippedItem],
    ) -> WardrobeResult<GenerationOutcome> {
        let key = fingerprint::outfit_key(items, base_id, scene_id);
        writer::validate_key(&key)?;
        if let Some(outfit) = reader::read_outfit(&self.generated_root, &key, &self.url_prefix) {
            tracing::debug!(%key, "generated outfit cache hit");
            return Ok(GenerationOutcome {
                outfit,
                cached: true,
                fell_back: false,
            });
        }

        let base_path = fsio::resolve_public(&self.public_root, base_url)?;
        let base_bytes = std::fs::read(&base_path)
            .with_context(|| format!("read base image '{}'", base_path.display()))?;

        let request = GenerationRequest {
            prompt: prompt::build_prompt(items, scene_id),
            base: InlineImage::from_bytes(base_bytes),
            items: self.load_item_images(items),
        };
        let generated = self.generator.generate(&request)?;

        let metadata = OutfitMetadata {
            base_bunny: Some(base_id.to_string()),
            scene: scene_id.filter(|s| !s.is_empty()).map(str::to_string),
            equipped_items: items.iter().map(metadata_item).collect(),
        };

        if generated.fell_back {
            tracing::warn!(%key, "generator returned no image, serving the base image uncached");
            return Ok(GenerationOutcome {
                outfit: fallback_outfit(&key, base_url, &metadata)?,
                cached: false,
                fell_back: true,
            });
        }

        let frames = GeneratedFrames {
            normal: to_png(&generated.image.bytes)?,
            ..Default::default()
        };
        writer::save_generated(&self.generated_root, &key, &frames, &metadata)?;

        let outfit = reader::read_outfit(&self.generated_root, &key, &self.url_prefix)
            .with_context(|| format!("generated outfit '{key}' missing after save"))?;
        Ok(GenerationOutcome {
            outfit,
            cached: false,
            fell_back: false,
        })
    }

    fn load_item_images(&self, items: &[EquippedItem]) -> Vec<InlineImage> {
        items
            .par_iter()
            .map(|item| -> WardrobeResult<Option<InlineImage>> {
                let path = fsio::resolve_public(&self.public_root, &item.image_url)?;
                Ok(fsio::read_optional(&path)?.map(InlineImage::from_bytes))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .zip(items)
            .filter_map(|(loaded, item)| match loaded {
                Ok(Some(img)) => Some(img),
                Ok(None) => {
                    tracing::warn!(item = %item.item_id, "item image missing, leaving it out");
                    None
                }
                Err(e) => {
                    tracing::warn!(item = %item.item_id, error = %e, "item image unreadable, leaving it out");
                    None
                }
            })
            .collect()
    }

    /// Root the generated gallery is stored under.
    pub fn generated_root(&self) -> &Path {
        &self.generated_root
    }
}

fn metadata_item(item: &EquippedItem) -> MetadataItem {
    let mut extra = serde_json::Map::new();
    extra.insert("itemId".to_string(), item.item_id.clone().into());
    extra.insert("slot".to_string(), item.slot.clone().into());
    extra.insert("imageUrl".to_string(), item.image_url.clone().into());
    MetadataItem {
        name: item.name.clone(),
        extra,
    }
}

fn fallback_outfit(
    key: &str,
    base_url: &str,
    metadata: &OutfitMetadata,
) -> WardrobeResult<GeneratedOutfit> {
    Ok(GeneratedOutfit {
        key: key.to_string(),
        normal_url: base_url.to_string(),
        blink_url: None,
        scene_normal_url: None,
        scene_blink_url: None,
        has_blink_frame: false,
        has_scene_composition: false,
        has_scene_blink_frame: false,
        generated_at: chrono::Utc::now(),
        base_bunny: metadata.base_bunny.clone(),
        scene: metadata.scene.clone(),
        equipped_items: metadata.equipped_items.iter().map(|i| i.name.clone()).collect(),
        metadata: serde_json::to_value(metadata)?,
    })
}

fn to_png(bytes: &[u8]) -> WardrobeResult<Vec<u8>> {
    if matches!(image::guess_format(bytes), Ok(image::ImageFormat::Png)) {
        return Ok(bytes.to_vec());
    }
    decode::encode_png(&decode::decode_rgba(bytes)?)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/workflow.rs"]
mod tests;
