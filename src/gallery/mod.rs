pub(crate) mod reader;
pub(crate) mod writer;

/// Mandatory frame; a folder without it is not a generated outfit.
pub const NORMAL_FRAME: &str = "normal.png";
/// Optional blink frame.
pub const BLINK_FRAME: &str = "blink.png";
/// Optional scene composition.
pub const SCENE_NORMAL_FRAME: &str = "scene_normal.png";
/// Optional scene composition blink frame.
pub const SCENE_BLINK_FRAME: &str = "scene_blink.png";
/// Side-car metadata record.
pub const METADATA_FILE: &str = "metadata.json";
/// Default public URL prefix of the generated-content root.
pub const DEFAULT_URL_PREFIX: &str = "/generated-bunnies";
