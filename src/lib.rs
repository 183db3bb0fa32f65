//! Bunnywear dresses a virtual bunny in clothing items.
//!
//! The crate has three independent pieces of outfit logic, plus the glue that serves them:
//!
//! 1. **Fingerprinting**: an order-independent key for an item set ([`fingerprint`],
//!    [`scene_fingerprint`]), used to cache composites and generated images.
//! 2. **Compositing**: [`Compositor`] layers item images onto fixed slot rectangles of a base
//!    image, configured by a runtime-updatable [`SlotLayout`].
//! 3. **Gallery**: [`list_generated`] reconstructs generated outfit sets from a directory tree.
//!
//! Around them sit the filesystem boundary ([`read_optional`], [`write_creating_dirs`]), the
//! asset catalog used by listing/upload routes, the generative image client
//! ([`ImageGenerator`], [`GeminiClient`]) and a blocking HTTP server ([`bind`], [`dispatch`]).
//!
//! Per-item and per-file failures are contained: a missing item image or an unknown slot drops
//! that item, a folder without a normal frame drops that folder. Only failures that leave
//! nothing meaningful to return propagate as [`WardrobeError`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod foundation;
mod gallery;
mod generate;
mod identity;
mod layout;
mod model;
mod server;

pub use assets::catalog::{AssetEntry, IMAGE_EXTENSIONS, list_images, save_upload};
pub use assets::decode::{decode_premul, decode_rgba, encode_png, probe_dimensions, sniff_mime};
pub use assets::fsio::{
    is_file, key_file_name, modified_optional, normalize_rel_path, read_dir_optional, read_optional,
    resolve_public, write_creating_dirs,
};
pub use compose::blend::{PremulRgba8, over, over_at};
pub use compose::compositor::{CachedComposite, Compositor};
pub use compose::contain::contain;
pub use foundation::error::{WardrobeError, WardrobeResult};
pub use gallery::reader::{list_generated, read_metadata, read_outfit};
pub use gallery::writer::{GeneratedFrames, save_generated};
pub use gallery::{
    BLINK_FRAME, DEFAULT_URL_PREFIX, METADATA_FILE, NORMAL_FRAME, SCENE_BLINK_FRAME,
    SCENE_NORMAL_FRAME,
};
pub use generate::client::{
    GeminiClient, GeminiConfig, GeneratedImage, GenerationRequest, ImageGenerator, InlineImage,
    extract_inline_image, image_or_base, request_body,
};
pub use generate::prompt::build_prompt;
pub use generate::workflow::{GenerationOutcome, OutfitGenerator};
pub use identity::fingerprint::{
    SCENE_KEY_PREFIX, fingerprint, items_key, outfit_key, scene_fingerprint,
};
pub use layout::slots::{SlotLayout, SlotTable};
pub use model::generated::{GeneratedOutfit, MetadataItem, OutfitMetadata};
pub use model::outfit::{EquippedItem, Slot, SlotRect};
pub use server::response::ApiResponse;
pub use server::routes::{ApiRequest, Method, dispatch};
pub use server::state::{AppState, ServerConfig};
pub use server::{BoundServer, bind};
