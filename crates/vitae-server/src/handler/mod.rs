//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust,ignore
//! use vitae_server::handler::routes;
//! use vitae_server::service::ServiceState;
//!
//! let router = routes("/api").with_state(state);
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod chat;
mod error;
mod monitors;
mod request;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{ChatRequest, ChatRequestMessage};
pub use crate::handler::response::{ErrorResponse, MonitorStatus};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes nested under `api_prefix`.
///
/// An empty prefix (or `/`) mounts the routes at the root. Unknown routes
/// answer with a JSON 404.
pub fn routes(api_prefix: &str) -> Router<ServiceState> {
    let api = Router::new()
        .merge(chat::routes())
        .merge(monitors::routes());

    let router = match api_prefix.trim_end_matches('/') {
        "" => api,
        prefix => Router::new().nest(prefix, api),
    };

    router.fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum_test::TestServer;
    use futures::StreamExt;
    use vitae_rig::chat::{ChatMessage, ChatService, ChatSettings, FragmentStream};
    use vitae_rig::provider::{LanguageModel, TextEmbedder};
    use vitae_rig::rag::{EmbeddedIndex, IndexStore, IndexedNode};

    use crate::handler::routes;
    use crate::service::{AuthVerifier, JwtVerifier, ServiceState, TEST_SECRET, hs256_token};

    /// Model answering every conversation with the same fragments.
    pub struct ScriptedModel {
        fragments: Vec<&'static str>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        pub fn new(fragments: Vec<&'static str>) -> Self {
            Self {
                fragments,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Returns the conversations the model was called with.
        pub fn calls(&self) -> anyhow::Result<Vec<Vec<ChatMessage>>> {
            let calls = self.calls.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(calls.clone())
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn stream_chat(&self, messages: Vec<ChatMessage>) -> vitae_rig::Result<FragmentStream> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(messages);
            }

            let fragments = self.fragments.iter().map(|f| Ok(f.to_string()));
            Ok(futures::stream::iter(fragments.collect::<Vec<_>>()).boxed())
        }
    }

    /// Embeds texts by the keywords they mention.
    struct KeywordEmbedder;

    #[async_trait]
    impl TextEmbedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> vitae_rig::Result<Vec<f64>> {
            let text = text.to_lowercase();
            Ok(["experience", "rust", "team"]
                .iter()
                .map(|keyword| if text.contains(keyword) { 1.0 } else { 0.0 })
                .collect())
        }
    }

    fn node(id: &str, text: &str, embedding: [f64; 3]) -> IndexedNode {
        IndexedNode {
            id: id.to_owned(),
            text: text.to_owned(),
            embedding: embedding.to_vec(),
            metadata: Default::default(),
        }
    }

    /// Running server with its valid token and the model behind it.
    pub struct TestContext {
        pub server: TestServer,
        pub token: String,
        pub model: Arc<ScriptedModel>,
    }

    /// Returns a server answering from the `resume` index.
    pub async fn create_test_server() -> anyhow::Result<TestContext> {
        create_test_server_with_index("resume").await
    }

    /// Returns a server configured to answer from `index_name`.
    ///
    /// Only the `resume` index is loaded.
    pub async fn create_test_server_with_index(index_name: &str) -> anyhow::Result<TestContext> {
        let nodes = vec![
            node("n1", "Five years of experience with Rust services.", [1.0, 1.0, 0.0]),
            node("n2", "Led a team of four engineers.", [0.0, 0.0, 1.0]),
        ];
        let index = EmbeddedIndex::new("resume", nodes, Arc::new(KeywordEmbedder))?;

        let mut store = IndexStore::new();
        store.insert(Arc::new(index));

        let model = Arc::new(ScriptedModel::new(vec!["I ", "have ", "5 years."]));
        let settings = ChatSettings::builder().with_index_name(index_name).build()?;
        let chat = ChatService::new(Arc::new(store), model.clone(), settings);

        let verifier = AuthVerifier::new(JwtVerifier::hs256(TEST_SECRET)?);
        let state = ServiceState::new(chat, verifier);

        let server = TestServer::new(routes("/api").with_state(state))?;
        let token = hs256_token("recruiter")?;

        Ok(TestContext {
            server,
            token,
            model,
        })
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let TestContext { server, .. } = create_test_server().await?;

        let response = server.get("/api/unknown").await;
        response.assert_status_not_found();
        response.assert_json(&serde_json::json!({
            "name": "not_found",
            "detail": "Resource not found."
        }));
        Ok(())
    }

    #[tokio::test]
    async fn routes_live_under_the_prefix() -> anyhow::Result<()> {
        let TestContext { server, .. } = create_test_server().await?;
        server.get("/health").await.assert_status_not_found();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        Ok(())
    }
}
