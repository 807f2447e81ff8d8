//! HTTP/HTTPS server startup and lifecycle management.
//!
//! With the `tls` feature and both PEM paths configured the server speaks
//! HTTPS, otherwise plain HTTP.

mod error;
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;
mod shutdown;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use self::http_server::serve_http;
#[cfg(feature = "tls")]
use self::https_server::serve_https;
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;

/// Starts the server, picking the protocol from the configuration.
///
/// # Errors
///
/// Returns an error if TLS certificates cannot be loaded, the address
/// cannot be bound, or the server fails while running.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) =
        (config.tls_cert_path.clone(), config.tls_key_path.clone())
    {
        return serve_https(app, config, cert_path, key_path).await;
    }

    serve_http(app, config).await
}
