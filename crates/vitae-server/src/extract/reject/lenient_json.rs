//! JSON extractor that tolerates clients mislabelling their payloads.
//!
//! Browser clients commonly post JSON as `text/plain` to avoid CORS
//! preflights, and some serialize the payload twice. [`LenientJson`] reads
//! the body regardless of its `Content-Type` and unwraps one level of string
//! encoding.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::TRACING_TARGET_EXTRACT;

/// JSON body extractor ignoring the request `Content-Type`.
///
/// A body that decodes to a JSON string is decoded a second time, so both
/// `{"messages":[]}` and `"{\"messages\":[]}"` are accepted.
///
/// # Rejections
///
/// - 400 when the body is not valid JSON
/// - 422 when the JSON does not match `T`
/// - 413 when the body exceeds the configured limit
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct LenientJson<T>(pub T);

impl<T> LenientJson<T> {
    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> LenientJson<T>
where
    T: DeserializeOwned,
{
    /// Decodes a request body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error<'static>> {
        let value: Value = serde_json::from_slice(bytes).map_err(syntax_error)?;

        let inner = match value {
            Value::String(encoded) => {
                tracing::debug!(
                    target: TRACING_TARGET_EXTRACT,
                    "Decoding string-encoded JSON body"
                );
                serde_json::from_str(&encoded).map_err(|e| {
                    if e.is_data() {
                        schema_error(e)
                    } else {
                        syntax_error(e)
                    }
                })?
            }
            value => serde_json::from_value(value).map_err(schema_error)?,
        };

        Ok(Self(inner))
    }
}

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        Self::from_bytes(&bytes)
    }
}

impl From<BytesRejection> for Error<'static> {
    fn from(rejection: BytesRejection) -> Self {
        let message = rejection.body_text();
        if message.contains("length limit") {
            ErrorKind::PayloadTooLarge.with_context(sanitize_error_message(&message))
        } else {
            ErrorKind::BadRequest
                .with_message("Failed to read request body")
                .with_context(format!(
                    "Request body processing failed: {}",
                    sanitize_error_message(&message)
                ))
        }
    }
}

fn syntax_error(error: serde_json::Error) -> Error<'static> {
    ErrorKind::BadRequest
        .with_message("Invalid JSON syntax in request body")
        .with_context(format!(
            "JSON parsing failed: {}",
            sanitize_error_message(&error.to_string())
        ))
}

fn schema_error(error: serde_json::Error) -> Error<'static> {
    ErrorKind::UnprocessableEntity.with_context(format!(
        "JSON deserialization failed: {}",
        sanitize_error_message(&error.to_string())
    ))
}

/// Sanitizes error messages to prevent information leakage while keeping them useful.
fn sanitize_error_message(message: &str) -> String {
    // Limit to first 3 lines to prevent excessive verbosity.
    let lines = message.lines().take(3).collect::<Vec<_>>();
    // Limit message length.
    lines.join(" ").chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Payload {
        count: u32,
    }

    #[test]
    fn decodes_plain_json() -> anyhow::Result<()> {
        let LenientJson(payload) = LenientJson::<Payload>::from_bytes(br#"{"count":2}"#)?;
        assert_eq!(payload, Payload { count: 2 });
        Ok(())
    }

    #[test]
    fn decodes_string_encoded_json() -> anyhow::Result<()> {
        let LenientJson(payload) = LenientJson::<Payload>::from_bytes(br#""{\"count\":2}""#)?;
        assert_eq!(payload, Payload { count: 2 });
        Ok(())
    }

    #[test]
    fn syntax_errors_are_bad_requests() {
        let error = LenientJson::<Payload>::from_bytes(b"{count:").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.detail(), "Invalid JSON syntax in request body");

        let error = LenientJson::<Payload>::from_bytes(br#""{count""#).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn schema_errors_are_unprocessable() {
        let error = LenientJson::<Payload>::from_bytes(br#"{"count":"two"}"#).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnprocessableEntity);
        assert_eq!(error.detail(), "Invalid request data format");
    }

    #[test]
    fn sanitize_truncates_long_messages() {
        let message = "x".repeat(500);
        assert_eq!(sanitize_error_message(&message).len(), 200);
    }
}
