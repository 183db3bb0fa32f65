/// Convenience result type used across the crate.
pub type WardrobeResult<T> = Result<T, WardrobeError>;

/// Top-level error taxonomy used by outfit APIs.
///
/// Per-item and per-file probing failures never surface here; they are logged and the item or
/// folder is omitted. Only failures that prevent producing any meaningful result propagate.
#[derive(thiserror::Error, Debug)]
pub enum WardrobeError {
    /// Invalid caller-provided data (payloads, paths, slot rectangles).
    #[error("validation error: {0}")]
    Validation(String),

    /// The base image could not be decoded far enough to know its pixel dimensions.
    #[error("dimensions unavailable: {0}")]
    DimensionsUnavailable(String),

    /// An external dependency (the generative image API) has no usable configuration.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Transport or HTTP-level failure talking to the generative image API.
    #[error("generation error: {0}")]
    Generation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WardrobeError {
    /// Build a [`WardrobeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WardrobeError::DimensionsUnavailable`] value.
    pub fn dimensions_unavailable(msg: impl Into<String>) -> Self {
        Self::DimensionsUnavailable(msg.into())
    }

    /// Build a [`WardrobeError::NotConfigured`] value.
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    /// Build a [`WardrobeError::Generation`] value.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Build a [`WardrobeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for WardrobeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
