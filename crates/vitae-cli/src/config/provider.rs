//! Chat service construction from the model configuration.

use std::sync::Arc;

use anyhow::Context;
use vitae_rig::chat::{ChatService, ChatSettings};
use vitae_rig::provider::RigConfig;
use vitae_rig::rag::IndexStore;

use crate::TRACING_TARGET_SERVER_STARTUP;

/// Creates the chat service: model clients, then the persisted indexes.
///
/// # Errors
///
/// Returns an error if a model client cannot be created or the index
/// directory cannot be read.
pub async fn create_chat_service(config: &RigConfig) -> anyhow::Result<ChatService> {
    let llm = config
        .completion_provider()
        .context("failed to create completion model")?;
    let embedder = config
        .embedding_provider()
        .context("failed to create embedding model")?;

    let store = IndexStore::load_dir(&config.index_storage_dir, Arc::new(embedder))
        .await
        .with_context(|| {
            format!(
                "failed to load indexes from {}",
                config.index_storage_dir.display()
            )
        })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        indexes = ?store.names().collect::<Vec<_>>(),
        dir = %config.index_storage_dir.display(),
        "Indexes loaded"
    );

    let settings = ChatSettings::builder()
        .with_index_name(config.index_name.clone())
        .build()
        .context("invalid chat settings")?;

    Ok(ChatService::new(Arc::new(store), Arc::new(llm), settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> RigConfig {
        RigConfig {
            openai_api_key: Some("sk-test".to_owned()),
            embedding_dimensions: 2,
            index_storage_dir: dir.to_path_buf(),
            ..RigConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_the_configured_index() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("resume.json"),
            r#"{"nodes": [{"id": "n1", "text": "Five years of Rust.", "embedding": [1.0, 0.0]}]}"#,
        )?;

        let service = create_chat_service(&config(dir.path())).await?;
        assert!(service.is_ready());
        assert_eq!(service.settings().index_name, "resume");
        Ok(())
    }

    #[tokio::test]
    async fn missing_index_file_is_not_fatal() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let service = create_chat_service(&config(dir.path())).await?;
        assert!(!service.is_ready());
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_directory_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("missing");

        assert!(create_chat_service(&config(&missing)).await.is_err());
        Ok(())
    }
}
