use std::path::{Path, PathBuf};

use crate::{
    assets::fsio,
    foundation::error::{WardrobeError, WardrobeResult},
    gallery::{BLINK_FRAME, METADATA_FILE, NORMAL_FRAME, SCENE_BLINK_FRAME, SCENE_NORMAL_FRAME},
    model::generated::OutfitMetadata,
};

/// Encoded frames of one generated outfit.
#[derive(Clone, Debug, Default)]
pub struct GeneratedFrames {
    /// Mandatory normal frame.
    pub normal: Vec<u8>,
    /// Blink frame.
    pub blink: Option<Vec<u8>>,
    /// Scene composition.
    pub scene_normal: Option<Vec<u8>>,
    /// Scene composition blink frame.
    pub scene_blink: Option<Vec<u8>>,
}

/// Write an outfit folder `<root>/<key>` and return its path.
///
/// Existing files are overwritten. The normal frame is written last: a folder only becomes
/// visible to [`crate::list_generated`] once it is complete.
pub fn save_generated(
    root: &Path,
    key: &str,
    frames: &GeneratedFrames,
    metadata: &OutfitMetadata,
) -> WardrobeResult<PathBuf> {
    validate_key(key)?;
    let dir = root.join(key);

    let optional = [
        (BLINK_FRAME, &frames.blink),
        (SCENE_NORMAL_FRAME, &frames.scene_normal),
        (SCENE_BLINK_FRAME, &frames.scene_blink),
    ];
    for (file, bytes) in optional {
        if let Some(bytes) = bytes {
            fsio::write_creating_dirs(&dir.join(file), bytes)?;
        }
    }
    fsio::write_creating_dirs(
        &dir.join(METADATA_FILE),
        &serde_json::to_vec_pretty(metadata)?,
    )?;
    fsio::write_creating_dirs(&dir.join(NORMAL_FRAME), &frames.normal)?;

    tracing::info!(key, "saved generated outfit");
    Ok(dir)
}

/// Reject keys that would not name exactly one folder directly under the gallery root.
pub fn validate_key(key: &str) -> WardrobeResult<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(WardrobeError::validation(format!(
            "invalid outfit key '{key}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/gallery/writer.rs"]
mod tests;
