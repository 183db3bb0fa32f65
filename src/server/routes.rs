//! Route table. Routes are plain functions of [`AppState`] and [`ApiRequest`] so they can be
//! exercised without a socket.

use serde::Deserialize;

use crate::{
    assets::{catalog, fsio},
    foundation::error::{WardrobeError, WardrobeResult},
    gallery::reader,
    identity::fingerprint,
    model::outfit::{EquippedItem, SlotRect},
    server::{response::ApiResponse, state::AppState},
};

/// HTTP methods the routes distinguish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// Anything else.
    Other,
}

/// Transport-independent request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// Request method.
    pub method: Method,
    /// Path without query string.
    pub path: String,
    /// Decoded query parameters in order.
    pub query: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl ApiRequest {
    /// Split a raw request target (`/api/assets?dir=items`) into path and query.
    pub fn new(method: Method, target: &str, body: Vec<u8>) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method,
            path: path.to_string(),
            query: url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            body,
        }
    }

    /// First value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn required_param(&self, name: &str) -> WardrobeResult<&str> {
        self.query_param(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| WardrobeError::validation(format!("missing query parameter '{name}'")))
    }

    fn json<T: for<'de> Deserialize<'de>>(&self) -> WardrobeResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintBody {
    #[serde(default)]
    items: Vec<EquippedItem>,
    base_id: String,
    #[serde(default)]
    scene_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositeBody {
    base_image: String,
    base_id: String,
    #[serde(default)]
    items: Vec<EquippedItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    base_image: String,
    base_id: String,
    #[serde(default)]
    scene_id: Option<String>,
    #[serde(default)]
    items: Vec<EquippedItem>,
}

/// Route one request. Every propagated failure becomes a generic JSON failure response.
pub fn dispatch(state: &AppState, req: &ApiRequest) -> ApiResponse {
    match route(state, req) {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(method = ?req.method, path = %req.path, error = %e, "request failed");
            ApiResponse::from_error(&e)
        }
    }
}

fn route(state: &AppState, req: &ApiRequest) -> WardrobeResult<ApiResponse> {
    let segments = req
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    match (req.method, segments.as_slice()) {
        (Method::Get, ["api", "slots"]) => ApiResponse::json(200, &state.layout.snapshot()),
        (Method::Put, ["api", "slots", slot]) => {
            let rect: SlotRect = req.json()?;
            state.layout.set(slot, rect)?;
            ApiResponse::json(200, &state.layout.snapshot())
        }
        (Method::Post, ["api", "fingerprint"]) => {
            let body: FingerprintBody = req.json()?;
            let key = fingerprint::outfit_key(&body.items, &body.base_id, body.scene_id.as_deref());
            ApiResponse::json(200, &serde_json::json!({ "key": key }))
        }
        (Method::Post, ["api", "composite"]) => composite(state, req),
        (Method::Get, ["api", "generated"]) => {
            let outfits = reader::list_generated(
                &state.config.generated_root,
                &state.config.generated_url_prefix,
            )?;
            ApiResponse::json(200, &outfits)
        }
        (Method::Post, ["api", "generate"]) => generate(state, req),
        (Method::Get, ["api", "assets"]) => {
            let entries = catalog::list_images(&state.config.public_root, req.required_param("dir")?)?;
            ApiResponse::json(200, &entries)
        }
        (Method::Post, ["api", "upload"]) => {
            let entry = catalog::save_upload(
                &state.config.public_root,
                req.required_param("dir")?,
                req.required_param("name")?,
                &req.body,
            )?;
            ApiResponse::json(201, &entry)
        }
        _ => Ok(ApiResponse::not_found()),
    }
}

fn composite(state: &AppState, req: &ApiRequest) -> WardrobeResult<ApiResponse> {
    let body: CompositeBody = req.json()?;
    let base_path = fsio::resolve_public(&state.config.public_root, &body.base_image)?;
    let out = state.compositor.composite_cached(
        &state.config.cache_root,
        &base_path,
        &body.base_id,
        &body.items,
    )?;
    Ok(ApiResponse::png(out.png)
        .with_header("X-Outfit-Key", out.key)
        .with_header("X-Cache", if out.cache_hit { "hit" } else { "miss" }))
}

fn generate(state: &AppState, req: &ApiRequest) -> WardrobeResult<ApiResponse> {
    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| WardrobeError::not_configured("generative image api is not configured"))?;
    let body: GenerateBody = req.json()?;
    let outcome = generator.generate(
        &body.base_image,
        &body.base_id,
        body.scene_id.as_deref(),
        &body.items,
    )?;
    Ok(ApiResponse::json(200, &outcome.outfit)?
        .with_header("X-Cache", if outcome.cached { "hit" } else { "miss" })
        .with_header("X-Fallback", outcome.fell_back.to_string()))
}
