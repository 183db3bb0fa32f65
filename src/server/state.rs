use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    compose::compositor::Compositor,
    foundation::error::{WardrobeError, WardrobeResult},
    gallery::DEFAULT_URL_PREFIX,
    generate::{
        client::{GeminiClient, GeminiConfig, ImageGenerator},
        workflow::OutfitGenerator,
    },
    layout::slots::SlotLayout,
};

/// Everything the HTTP layer needs to know about its environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Directory public URLs (`/items/..`, `/bunnies/..`) resolve against.
    pub public_root: PathBuf,
    /// Directory holding generated outfit folders.
    pub generated_root: PathBuf,
    /// Directory holding cached composites.
    pub cache_root: PathBuf,
    /// Public URL prefix of `generated_root`.
    pub generated_url_prefix: String,
    /// Optional JSON slot table replacing the built-in one.
    pub slot_table: Option<PathBuf>,
    /// Request worker threads.
    pub workers: usize,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Generative image API settings.
    pub gemini: GeminiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            public_root: PathBuf::from("public"),
            generated_root: PathBuf::from("public/generated-bunnies"),
            cache_root: PathBuf::from("public/composites"),
            generated_url_prefix: DEFAULT_URL_PREFIX.to_string(),
            slot_table: None,
            workers: 4,
            max_body_bytes: 20 * 1024 * 1024,
            gemini: GeminiConfig::default(),
        }
    }
}

/// Shared, request-independent state handed to every route.
pub struct AppState {
    /// Effective configuration.
    pub config: ServerConfig,
    /// Slot placements, shared with the compositor.
    pub layout: Arc<SlotLayout>,
    /// Slot compositor.
    pub compositor: Compositor,
    /// `None` when no generative client is configured.
    pub generator: Option<OutfitGenerator>,
}

impl AppState {
    /// Build state from configuration, constructing the Gemini client when a key is present.
    pub fn from_config(config: ServerConfig) -> WardrobeResult<Self> {
        let layout = match &config.slot_table {
            Some(path) => SlotLayout::load_json(path)?,
            None => SlotLayout::with_defaults(),
        };
        let generator: Option<Arc<dyn ImageGenerator>> =
            match GeminiClient::from_config(config.gemini.clone()) {
                Ok(client) => Some(Arc::new(client) as Arc<dyn ImageGenerator>),
                Err(WardrobeError::NotConfigured(msg)) => {
                    tracing::warn!("generation disabled: {msg}");
                    None
                }
                Err(e) => return Err(e),
            };
        Ok(Self::new(config, Arc::new(layout), generator))
    }

    /// Assemble state from parts.
    pub fn new(
        config: ServerConfig,
        layout: Arc<SlotLayout>,
        generator: Option<Arc<dyn ImageGenerator>>,
    ) -> Self {
        let compositor = Compositor::new(Arc::clone(&layout), config.public_root.clone());
        let generator = generator.map(|g| {
            OutfitGenerator::new(
                g,
                config.public_root.clone(),
                config.generated_root.clone(),
                config.generated_url_prefix.clone(),
            )
        });
        Self {
            config,
            layout,
            compositor,
            generator,
        }
    }
}
