//! Streaming chat handler.
//!
//! The answer is written to the response body fragment by fragment as the
//! model produces it. A spawned task forwards fragments through a channel of
//! capacity one, so the model is only asked for the next fragment once the
//! previous one has been taken by the client. When the client goes away the
//! task stops without draining the model stream.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use vitae_rig::chat::{ChatService, FragmentStream};

use crate::extract::{AuthState, LenientJson};
use crate::handler::request::ChatRequest;
use crate::handler::{Error, Result};
use crate::service::ServiceState;
use crate::utility::tracing_targets::TRACING_TARGET_CHAT;

/// Content type of the streamed answer.
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Streams an answer to the last user message of the conversation.
#[tracing::instrument(skip_all, fields(subject = %auth_state.subject()))]
async fn chat(
    State(chat_service): State<ChatService>,
    auth_state: AuthState,
    LenientJson(request): LenientJson<ChatRequest>,
) -> Result<Response> {
    let (query, history) = request.into_query()?;

    tracing::debug!(
        target: TRACING_TARGET_CHAT,
        history = history.len(),
        query_len = query.len(),
        "Starting chat"
    );

    // TODO: pick the index from `auth_state.subject()` once indexes are stored per identity.
    let mut engine = chat_service.create_engine().map_err(start_failure)?;
    let fragments = engine
        .stream_chat(&query, history)
        .await
        .map_err(start_failure)?;

    Ok(stream_response(fragments))
}

fn start_failure(error: vitae_rig::Error) -> Error<'static> {
    Error::from(error).with_message("Failed to start chat")
}

/// Wraps the fragments into a chunked `text/plain` response.
fn stream_response(fragments: FragmentStream) -> Response {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(forward_fragments(fragments, tx).in_current_span());

    let body = Body::from_stream(ReceiverStream::new(rx));
    ([(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], body).into_response()
}

/// Moves fragments from the model stream into the response channel.
///
/// Waits for channel capacity before each poll of the stream. Stops as soon
/// as the receiver is gone, and after forwarding the first error.
async fn forward_fragments<S>(mut fragments: S, tx: mpsc::Sender<vitae_rig::Result<Bytes>>)
where
    S: Stream<Item = vitae_rig::Result<String>> + Unpin,
{
    let mut forwarded = 0_usize;

    loop {
        let permit = match tx.reserve().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::info!(target: TRACING_TARGET_CHAT, forwarded, "Client disconnected");
                return;
            }
        };

        if tx.is_closed() {
            tracing::info!(target: TRACING_TARGET_CHAT, forwarded, "Client disconnected");
            return;
        }

        match fragments.next().await {
            Some(Ok(fragment)) => {
                permit.send(Ok(Bytes::from(fragment)));
                forwarded += 1;
            }
            Some(Err(error)) => {
                tracing::error!(
                    target: TRACING_TARGET_CHAT,
                    error = %error,
                    forwarded,
                    "Answer stream failed"
                );
                permit.send(Err(error));
                return;
            }
            None => {
                tracing::debug!(target: TRACING_TARGET_CHAT, forwarded, "Answer completed");
                return;
            }
        }
    }
}

/// Returns a [`Router`] with the chat route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/chat", post(chat))
}
