use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::{
    assets::fsio,
    foundation::error::WardrobeResult,
    gallery::{BLINK_FRAME, METADATA_FILE, NORMAL_FRAME, SCENE_BLINK_FRAME, SCENE_NORMAL_FRAME},
    model::generated::{GeneratedOutfit, OutfitMetadata},
};

/// Reconstruct every generated outfit under `root`, most recently generated first.
///
/// A missing root lists as empty. Folders without a normal frame are left out. Optional frames
/// and metadata are probed independently and never fail the listing.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn list_generated(root: &Path, url_prefix: &str) -> WardrobeResult<Vec<GeneratedOutfit>> {
    let Some(entries) = fsio::read_dir_optional(root)? else {
        tracing::debug!("generated root missing");
        return Ok(vec![]);
    };

    let folders = entries
        .into_iter()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| Some((e.file_name().into_string().ok()?, e.path())))
        .collect::<Vec<(String, PathBuf)>>();

    let mut out = folders
        .par_iter()
        .filter_map(|(key, dir)| read_folder(key, dir, url_prefix))
        .collect::<Vec<_>>();
    out.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    Ok(out)
}

/// Reconstruct the single outfit stored under `<root>/<key>`, if it has a normal frame.
pub fn read_outfit(root: &Path, key: &str, url_prefix: &str) -> Option<GeneratedOutfit> {
    read_folder(key, &root.join(key), url_prefix)
}

/// Parse a metadata side-car into its raw object and typed view.
///
/// Any read or parse failure yields `({}, OutfitMetadata::default())`.
pub fn read_metadata(path: &Path) -> (serde_json::Value, OutfitMetadata) {
    let empty = || (serde_json::Value::Object(Default::default()), OutfitMetadata::default());

    let bytes = match fsio::read_optional(path) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return empty(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "metadata unreadable");
            return empty();
        }
    };
    let raw = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(raw @ serde_json::Value::Object(_)) => raw,
        Ok(_) => return empty(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "metadata is not json");
            return empty();
        }
    };
    match serde_json::from_value::<OutfitMetadata>(raw.clone()) {
        Ok(meta) => (raw, meta),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "metadata has unexpected shape");
            empty()
        }
    }
}

fn read_folder(key: &str, dir: &Path, url_prefix: &str) -> Option<GeneratedOutfit> {
    let modified = match fsio::modified_optional(&dir.join(NORMAL_FRAME)) {
        Ok(Some(t)) => t,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(folder = key, error = %e, "normal frame unreadable, skipping folder");
            return None;
        }
    };

    let prefix = url_prefix.trim_end_matches('/');
    let frame_url = |file: &str| format!("{prefix}/{key}/{file}");
    let probe = |file: &str| fsio::is_file(&dir.join(file)).then(|| frame_url(file));

    let blink_url = probe(BLINK_FRAME);
    let scene_normal_url = probe(SCENE_NORMAL_FRAME);
    let scene_blink_url = probe(SCENE_BLINK_FRAME);
    let (metadata, meta) = read_metadata(&dir.join(METADATA_FILE));

    Some(GeneratedOutfit {
        key: key.to_string(),
        normal_url: frame_url(NORMAL_FRAME),
        has_blink_frame: blink_url.is_some(),
        has_scene_composition: scene_normal_url.is_some(),
        has_scene_blink_frame: scene_blink_url.is_some(),
        blink_url,
        scene_normal_url,
        scene_blink_url,
        generated_at: DateTime::<Utc>::from(modified),
        base_bunny: meta.base_bunny,
        scene: meta.scene,
        equipped_items: meta.equipped_items.into_iter().map(|i| i.name).collect(),
        metadata,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/gallery/reader.rs"]
mod tests;
