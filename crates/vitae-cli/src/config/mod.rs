//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, TLS, shutdown
//! ├── middleware: MiddlewareConfig # CORS, recovery/timeouts
//! ├── service: ServiceConfig       # API prefix, token verification keys
//! └── rig: RigConfig               # Model provider, embeddings, index storage
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! vitae --auth-secret-key "..." --openai-api-key "sk-..." --port 8080
//!
//! # Or via environment variables
//! AUTH_SECRET_KEY="..." OPENAI_API_KEY="sk-..." PORT=8080 vitae
//! ```

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
pub use provider::create_chat_service;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vitae_rig::provider::RigConfig;
use vitae_server::service::ServiceConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "vitae")]
#[command(about = "Resume chat server answering questions over an embedded index")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Route prefix and bearer token verification.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Language model, embeddings and index storage.
    #[clap(flatten)]
    pub rig: RigConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        self.rig
            .validate()
            .context("invalid model configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            api_prefix = %self.service.api_prefix,
            symmetric_key = self.service.auth_secret_key.is_some(),
            public_key = ?self.service.auth_public_pem_filepath,
            issuer = ?self.service.auth_issuer,
            audience = ?self.service.auth_audience,
            "Service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            provider = ?self.rig.llm_provider,
            completion_model = %self.rig.completion_model,
            embedding_model = %self.rig.embedding_model,
            index_dir = %self.rig.index_storage_dir.display(),
            index = %self.rig.index_name,
            "Model configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "tls").then_some("tls"),
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "ollama").then_some("ollama"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_minimal_command_line() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "vitae",
            "--auth-secret-key",
            "test-secret",
            "--openai-api-key",
            "sk-test",
            "--port",
            "8080",
        ])?;

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.service.api_prefix, "/api");
        assert_eq!(cli.middleware.recovery.request_timeout, 30);
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn validation_requires_a_verification_key() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["vitae", "--openai-api-key", "sk-test"])?;
        assert!(cli.validate().is_err());
        Ok(())
    }
}
