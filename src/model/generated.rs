use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side-car `metadata.json` stored next to each generated outfit's frames.
///
/// Every field is optional; a missing or malformed file degrades to [`Default`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitMetadata {
    /// Base character identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_bunny: Option<String>,
    /// Scene identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Items worn in the generated images.
    #[serde(default)]
    pub equipped_items: Vec<MetadataItem>,
}

/// One item entry inside [`OutfitMetadata`]. Only `name` is required by readers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Display name of the item.
    pub name: String,
    /// Any other fields the writer recorded (ids, slots, urls).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One generated outfit set, reconstructed from a gallery folder on every read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutfit {
    /// Folder name; for generated sets this is the scene-qualified fingerprint.
    pub key: String,
    /// URL of the mandatory normal frame.
    pub normal_url: String,
    /// URL of the blink frame, when present.
    pub blink_url: Option<String>,
    /// URL of the scene composition, when present.
    pub scene_normal_url: Option<String>,
    /// URL of the scene composition's blink frame, when present.
    pub scene_blink_url: Option<String>,
    /// Whether a blink frame exists.
    pub has_blink_frame: bool,
    /// Whether a scene composition exists.
    pub has_scene_composition: bool,
    /// Whether a scene blink frame exists.
    pub has_scene_blink_frame: bool,
    /// Last-modified time of the normal frame.
    pub generated_at: DateTime<Utc>,
    /// Base character identifier from metadata.
    pub base_bunny: Option<String>,
    /// Scene identifier from metadata.
    pub scene: Option<String>,
    /// Names of the equipped items from metadata.
    pub equipped_items: Vec<String>,
    /// Raw metadata object (`{}` when absent or unparseable).
    pub metadata: serde_json::Value,
}
