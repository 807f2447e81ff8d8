//! Error types for vitae-rig.

use std::fmt;

/// Result type alias for rig operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while assembling or running a chat engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider error (API call failed, stream broke, etc.)
    #[error("provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    /// RAG retrieval error.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The requested index is not loaded.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a provider error.
    pub fn provider(provider: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a retrieval error.
    pub fn retrieval(message: impl fmt::Display) -> Self {
        Self::Retrieval(message.to_string())
    }

    /// Creates an embedding error.
    pub fn embedding(message: impl fmt::Display) -> Self {
        Self::Embedding(message.to_string())
    }

    /// Creates an index-not-found error.
    pub fn index_not_found(name: impl fmt::Display) -> Self {
        Self::IndexNotFound(name.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let error = Error::provider("openai", "rate limited");
        assert_eq!(error.to_string(), "provider error: openai: rate limited");
        assert!(error.is_retryable());
    }

    #[test]
    fn index_not_found_is_not_retryable() {
        let error = Error::index_not_found("resume");
        assert!(error.to_string().contains("resume"));
        assert!(!error.is_retryable());
    }
}
