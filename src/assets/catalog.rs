use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    assets::fsio,
    foundation::error::{WardrobeError, WardrobeResult},
};

/// Extensions accepted for listing and uploads.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// One image file under the public root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// File name.
    pub name: String,
    /// Public URL (`/<dir>/<name>`).
    pub url: String,
    /// Size in bytes.
    pub size: u64,
}

/// List image files directly inside `<public_root>/<dir>`, sorted by name.
///
/// A missing directory lists as empty.
pub fn list_images(public_root: &Path, dir: &str) -> WardrobeResult<Vec<AssetEntry>> {
    let rel = fsio::normalize_rel_path(dir)?;
    let Some(entries) = fsio::read_dir_optional(&public_root.join(&rel))? else {
        return Ok(vec![]);
    };

    let mut out = entries
        .into_iter()
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            let name = entry.file_name().to_str()?.to_string();
            has_image_extension(&name).then(|| AssetEntry {
                url: format!("/{rel}/{name}"),
                name,
                size: meta.len(),
            })
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Store an uploaded image at `<public_root>/<dir>/<file_name>`, overwriting any existing file.
pub fn save_upload(
    public_root: &Path,
    dir: &str,
    file_name: &str,
    bytes: &[u8],
) -> WardrobeResult<AssetEntry> {
    validate_file_name(file_name)?;
    if bytes.is_empty() {
        return Err(WardrobeError::validation("upload body is empty"));
    }
    let rel = fsio::normalize_rel_path(dir)?;
    fsio::write_creating_dirs(&public_root.join(&rel).join(file_name), bytes)?;
    tracing::info!(dir = %rel, file = file_name, bytes = bytes.len(), "stored upload");

    Ok(AssetEntry {
        name: file_name.to_string(),
        url: format!("/{rel}/{file_name}"),
        size: bytes.len() as u64,
    })
}

fn validate_file_name(name: &str) -> WardrobeResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(WardrobeError::validation(format!(
            "invalid file name '{name}'"
        )));
    }
    if !has_image_extension(name) {
        return Err(WardrobeError::validation(format!(
            "unsupported file type '{name}'"
        )));
    }
    Ok(())
}

fn has_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
