use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    assets::decode,
    foundation::error::{WardrobeError, WardrobeResult},
};

/// Encoded image embedded in a generation request or response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Wrap encoded bytes, sniffing their MIME type.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: decode::sniff_mime(&bytes).to_string(),
            bytes,
        }
    }
}

/// Prompt plus the base bunny and item images to dress it in.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// Instruction text.
    pub prompt: String,
    /// Base character image.
    pub base: InlineImage,
    /// Item images, in equip order.
    pub items: Vec<InlineImage>,
}

/// Image returned by an [`ImageGenerator`].
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    /// The generated image, or the untouched base image on fallback.
    pub image: InlineImage,
    /// `true` when the response held no usable image and the base image was returned.
    pub fell_back: bool,
}

/// Generative image collaborator.
pub trait ImageGenerator: Send + Sync {
    /// Produce a dressed-up image for `request`. Never retries.
    fn generate(&self, request: &GenerationRequest) -> WardrobeResult<GeneratedImage>;
}

/// Settings for [`GeminiClient`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key; `None` or blank means the client is not configured.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash-image-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client; fails with [`WardrobeError::NotConfigured`] without an API key.
    pub fn from_config(config: GeminiConfig) -> WardrobeResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| WardrobeError::not_configured("generative image api key is not set"))?
            .to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| WardrobeError::generation(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl ImageGenerator for GeminiClient {
    #[tracing::instrument(skip_all, fields(model = %self.config.model, items = request.items.len()))]
    fn generate(&self, request: &GenerationRequest) -> WardrobeResult<GeneratedImage> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .map_err(|e| WardrobeError::generation(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| WardrobeError::generation(format!("read response body: {e}")))?;
        if !status.is_success() {
            return Err(WardrobeError::generation(format!(
                "api returned {status}: {}",
                api_error_message(&text).unwrap_or_else(|| text.chars().take(200).collect())
            )));
        }

        let parsed = serde_json::from_str::<serde_json::Value>(&text).ok();
        Ok(image_or_base(parsed.as_ref(), &request.base))
    }
}

/// JSON body for a `generateContent` call: the prompt, then the base image, then item images.
pub fn request_body(request: &GenerationRequest) -> serde_json::Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    for img in std::iter::once(&request.base).chain(&request.items) {
        parts.push(json!({
            "inline_data": {
                "mime_type": img.mime_type,
                "data": STANDARD.encode(&img.bytes),
            }
        }));
    }
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
    })
}

/// First decodable image part of a `generateContent` response.
pub fn extract_inline_image(response: &serde_json::Value) -> Option<InlineImage> {
    let candidates = response.get("candidates")?.as_array()?;
    candidates
        .iter()
        .filter_map(|c| c.pointer("/content/parts")?.as_array())
        .flatten()
        .filter_map(|part| part.get("inlineData").or_else(|| part.get("inline_data")))
        .find_map(|data| {
            let mime = data
                .get("mimeType")
                .or_else(|| data.get("mime_type"))?
                .as_str()?;
            if !mime.starts_with("image/") {
                return None;
            }
            let bytes = STANDARD.decode(data.get("data")?.as_str()?).ok()?;
            image::guess_format(&bytes).ok()?;
            Some(InlineImage {
                mime_type: mime.to_string(),
                bytes,
            })
        })
}

/// Use the response image when there is one, otherwise fall back to `base`.
pub fn image_or_base(response: Option<&serde_json::Value>, base: &InlineImage) -> GeneratedImage {
    match response.and_then(extract_inline_image) {
        Some(image) => GeneratedImage {
            image,
            fell_back: false,
        },
        None => {
            tracing::warn!("generation response held no image, returning base image");
            GeneratedImage {
                image: base.clone(),
                fell_back: true,
            }
        }
    }
}

fn api_error_message(text: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(text).ok()?;
    Some(value.pointer("/error/message")?.as_str()?.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/generate/client.rs"]
mod tests;
