//! Service health check handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use vitae_rig::chat::ChatService;

use crate::handler::response::MonitorStatus;
use crate::service::ServiceState;
use crate::utility::tracing_targets::TRACING_TARGET_CHAT;

/// Reports whether the chat index is loaded.
///
/// Answers 200 when healthy and 503 otherwise. Not authenticated.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(chat_service): State<ChatService>,
) -> (StatusCode, Json<MonitorStatus>) {
    let is_healthy = chat_service.is_ready();

    if !is_healthy {
        tracing::warn!(
            target: TRACING_TARGET_CHAT,
            index = %chat_service.settings().index_name,
            "Health check failed: index not loaded"
        );
    }

    let status = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(MonitorStatus::new(is_healthy)))
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::handler::test::{TestContext, create_test_server, create_test_server_with_index};

    #[tokio::test]
    async fn healthy_when_index_loaded() -> anyhow::Result<()> {
        let TestContext { server, .. } = create_test_server().await?;

        let response = server.get("/api/health").await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["isHealthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        Ok(())
    }

    #[tokio::test]
    async fn unhealthy_without_index() -> anyhow::Result<()> {
        let TestContext { server, .. } = create_test_server_with_index("portfolio").await?;

        let response = server.get("/api/health").await;
        response.assert_status_service_unavailable();
        assert_eq!(response.json::<Value>()["isHealthy"], false);
        Ok(())
    }
}
