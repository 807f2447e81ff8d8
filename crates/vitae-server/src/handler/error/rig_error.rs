//! Chat engine error to HTTP error conversion implementation.
//!
//! Engine failures never leak their cause to the client: the cause is logged
//! and kept as context, the response is a generic server error.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::utility::tracing_targets::TRACING_TARGET_CHAT;

impl From<vitae_rig::Error> for HttpError<'static> {
    fn from(error: vitae_rig::Error) -> Self {
        use vitae_rig::Error as RigError;

        match &error {
            RigError::IndexNotFound(name) => {
                tracing::error!(
                    target: TRACING_TARGET_CHAT,
                    index = %name,
                    "Configured index is not loaded"
                );
            }
            RigError::Provider { provider, message } => {
                tracing::error!(
                    target: TRACING_TARGET_CHAT,
                    provider = %provider,
                    error = %message,
                    retryable = error.is_retryable(),
                    "Model provider request failed"
                );
            }
            RigError::Retrieval(_) | RigError::Embedding(_) => {
                tracing::error!(
                    target: TRACING_TARGET_CHAT,
                    error = %error,
                    "Context retrieval failed"
                );
            }
            _ => {
                tracing::error!(
                    target: TRACING_TARGET_CHAT,
                    error = %error,
                    "Chat engine failed"
                );
            }
        }

        ErrorKind::InternalServerError.with_context(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn rig_errors_become_internal_errors() {
        let error = HttpError::from(vitae_rig::Error::index_not_found("resume"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.kind().status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.context(), Some("index not found: resume"));
    }

    #[test]
    fn provider_cause_is_not_the_detail() {
        let error = HttpError::from(vitae_rig::Error::provider("openai", "invalid api key"));
        assert!(!error.detail().contains("invalid api key"));
    }
}
