#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use vitae_rig::chat::ChatService;
use vitae_server::handler::routes;
use vitae_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
};
use vitae_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, MiddlewareConfig, create_chat_service};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "vitae_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "vitae_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "vitae_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.validate()?;
    cli.log();

    let chat = create_chat_service(&cli.rig)
        .await
        .context("failed to create chat service")?;
    let state = create_service_state(&cli.service, chat).await?;
    let router = create_router(state, &cli.service, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Creates the service state from configuration.
async fn create_service_state(
    config: &ServiceConfig,
    chat: ChatService,
) -> anyhow::Result<ServiceState> {
    if !chat.is_ready() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            index = %chat.settings().index_name,
            "Configured index is not loaded, chat requests will fail"
        );
    }

    ServiceState::from_config(config, chat)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - body limit, CORS and security headers
/// 4. Routes (innermost) - actual request handlers
fn create_router(
    state: ServiceState,
    service: &ServiceConfig,
    middleware: &MiddlewareConfig,
) -> Router {
    routes(&service.api_prefix)
        .with_state(state)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}
