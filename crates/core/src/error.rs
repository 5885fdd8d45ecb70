//! Error types for Trip Insight.

use thiserror::Error;

/// Result type alias using Trip Insight's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Trip Insight.
///
/// Per-image problems never surface here; the normalizer turns them into
/// [`crate::types::FailureRecord`]s. Everything in this enum aborts the
/// current request.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Client Errors
    // =========================================================================
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Storage credentials are not configured: {0}")]
    StorageCredentials(String),

    #[error("Storage client error: {code} - {message}")]
    StorageAccess { code: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Model Gateway Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    // =========================================================================
    // Template Errors
    // =========================================================================
    #[error("Template rendering error: {0}")]
    Template(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller is at fault (as opposed to the service or a
    /// collaborator).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}
