use serde::Serialize;

use crate::foundation::error::{WardrobeError, WardrobeResult};

/// Content types the routes produce.
pub mod types {
    /// JSON bodies.
    pub const JSON: &str = "application/json";
    /// Composited images.
    pub const PNG: &str = "image/png";
}

/// Transport-independent response produced by [`crate::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Extra headers.
    pub headers: Vec<(&'static str, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> WardrobeResult<Self> {
        Ok(Self {
            status,
            content_type: types::JSON,
            headers: vec![],
            body: serde_json::to_vec(value)?,
        })
    }

    /// PNG body.
    pub fn png(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: types::PNG,
            headers: vec![],
            body,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Generic JSON failure `{ "error": "<message>" }`.
    pub fn failure(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: types::JSON,
            headers: vec![],
            body: serde_json::json!({ "error": message }).to_string().into_bytes(),
        }
    }

    /// Map a propagated error to a failure response.
    pub fn from_error(err: &WardrobeError) -> Self {
        let status = match err {
            WardrobeError::Validation(_) | WardrobeError::Serde(_) => 400,
            WardrobeError::NotConfigured(_) => 503,
            WardrobeError::DimensionsUnavailable(_)
            | WardrobeError::Generation(_)
            | WardrobeError::Other(_) => 500,
        };
        Self::failure(status, &err.to_string())
    }

    /// 404 for unmatched routes.
    pub fn not_found() -> Self {
        Self::failure(404, "not found")
    }

    /// Parse the body back as JSON; used by tests and the CLI.
    pub fn json_body(&self) -> WardrobeResult<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/response.rs"]
mod tests;
