//! HTTPS server on rustls.

use std::path::{Path, PathBuf};

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult, shutdown_signal};
use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;

/// Loads the PEM pair and serves `app` over TLS until a shutdown signal.
pub async fn serve_https(
    app: Router,
    server_config: ServerConfig,
    cert_path: PathBuf,
    key_path: PathBuf,
) -> ServerResult<()> {
    validate_tls_file(&cert_path, "Certificate")?;
    validate_tls_file(&key_path, "Private key")?;

    let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
        .await
        .map_err(|err| ServerError::TlsCertificate(err.to_string()))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS certificates loaded"
    );

    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal(shutdown_timeout).await;
        shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
    });

    serve_with_shutdown(&server_config, || async move {
        axum_server::bind_rustls(server_addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    })
    .await
}

/// Checks that a PEM file exists and is not empty.
fn validate_tls_file(path: &Path, file_type: &str) -> ServerResult<()> {
    let metadata = std::fs::metadata(path).map_err(|err| {
        ServerError::TlsCertificate(format!(
            "Cannot read {file_type} file {}: {err}",
            path.display()
        ))
    })?;

    if !metadata.is_file() {
        return Err(ServerError::TlsCertificate(format!(
            "{file_type} path is not a file: {}",
            path.display()
        )));
    }

    if metadata.len() == 0 {
        return Err(ServerError::TlsCertificate(format!(
            "{file_type} file is empty: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_and_empty_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let missing = dir.path().join("cert.pem");
        let result = validate_tls_file(&missing, "Certificate");
        assert!(matches!(result, Err(ServerError::TlsCertificate(ref msg)) if msg.contains("Cannot read")));

        std::fs::write(&missing, b"")?;
        let result = validate_tls_file(&missing, "Certificate");
        assert!(matches!(result, Err(ServerError::TlsCertificate(ref msg)) if msg.contains("empty")));

        let result = validate_tls_file(dir.path(), "Certificate");
        assert!(matches!(result, Err(ServerError::TlsCertificate(ref msg)) if msg.contains("not a file")));
        Ok(())
    }
}
