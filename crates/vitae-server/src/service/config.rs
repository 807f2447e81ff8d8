use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::service::{AuthVerifier, JwtVerifier};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Default prefix of every API route.
    pub const API_PREFIX: &str = "/api";
}

/// App [`state`] configuration.
///
/// Exactly one of [`auth_secret_key`] and [`auth_public_pem_filepath`] must
/// be set.
///
/// [`state`]: crate::service::ServiceState
/// [`auth_secret_key`]: ServiceConfig::auth_secret_key
/// [`auth_public_pem_filepath`]: ServiceConfig::auth_public_pem_filepath
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Prefix of every API route.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "API_PREFIX", default_value = defaults::API_PREFIX)
    )]
    #[builder(default = "defaults::API_PREFIX.to_owned()")]
    pub api_prefix: String,

    /// Shared secret verifying HS256 tokens.
    #[cfg_attr(feature = "config", arg(long, env = "AUTH_SECRET_KEY", hide_env_values = true))]
    #[serde(skip_serializing)]
    #[builder(default)]
    pub auth_secret_key: Option<String>,

    /// File path to the Ed25519 public key verifying EdDSA tokens.
    #[cfg_attr(feature = "config", arg(long, env = "AUTH_PUBLIC_PEM_FILEPATH"))]
    #[builder(default)]
    pub auth_public_pem_filepath: Option<PathBuf>,

    /// Required `iss` claim.
    #[cfg_attr(feature = "config", arg(long, env = "AUTH_ISSUER"))]
    #[builder(default)]
    pub auth_issuer: Option<String>,

    /// Required `aud` claim.
    #[cfg_attr(feature = "config", arg(long, env = "AUTH_AUDIENCE"))]
    #[builder(default)]
    pub auth_audience: Option<String>,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Checks the configuration parsed from the command line.
    pub fn validate(&self) -> Result<()> {
        check_prefix(&self.api_prefix).map_err(Error::config)?;
        check_keys(
            self.auth_secret_key.as_deref(),
            self.auth_public_pem_filepath.as_ref(),
        )
        .map_err(Error::config)
    }

    /// Builds the token verifier from the configured key.
    pub async fn load_verifier(&self) -> Result<AuthVerifier> {
        self.validate()?;

        let mut verifier = match (&self.auth_secret_key, &self.auth_public_pem_filepath) {
            (Some(secret), None) => JwtVerifier::hs256(secret)?,
            (None, Some(path)) => JwtVerifier::from_pem_file(path).await?,
            _ => return Err(Error::config("exactly one verification key must be set")),
        };

        if let Some(issuer) = &self.auth_issuer {
            verifier = verifier.with_issuer(issuer);
        }

        if let Some(audience) = &self.auth_audience {
            verifier = verifier.with_audience(audience);
        }

        Ok(AuthVerifier::new(verifier))
    }
}

impl ServiceConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(prefix) = &self.api_prefix {
            check_prefix(prefix)?;
        }

        let secret = self.auth_secret_key.clone().flatten();
        let path = self.auth_public_pem_filepath.clone().flatten();
        check_keys(secret.as_deref(), path.as_ref())
    }
}

fn check_prefix(prefix: &str) -> Result<(), String> {
    if !prefix.is_empty() && !prefix.starts_with('/') {
        return Err("API prefix must be empty or start with '/'".to_owned());
    }

    if prefix.len() > 1 && prefix.ends_with('/') {
        return Err("API prefix must not end with '/'".to_owned());
    }

    Ok(())
}

fn check_keys(secret: Option<&str>, path: Option<&PathBuf>) -> Result<(), String> {
    match (secret, path) {
        (Some(_), Some(_)) => Err(
            "AUTH_SECRET_KEY and AUTH_PUBLIC_PEM_FILEPATH are mutually exclusive".to_owned(),
        ),
        (None, None) => {
            Err("one of AUTH_SECRET_KEY or AUTH_PUBLIC_PEM_FILEPATH must be set".to_owned())
        }
        (Some(secret), None) if secret.is_empty() => {
            Err("AUTH_SECRET_KEY cannot be empty".to_owned())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_a_key() {
        assert!(ServiceConfig::builder().build().is_err());
    }

    #[test]
    fn builder_rejects_both_keys() {
        let result = ServiceConfig::builder()
            .with_auth_secret_key("secret")
            .with_auth_public_pem_filepath("./public.pem")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_defaults() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_secret_key("secret")
            .build()?;
        assert_eq!(config.api_prefix, "/api");
        assert!(config.auth_issuer.is_none());
        Ok(())
    }

    #[test]
    fn builder_rejects_bad_prefix() {
        for prefix in ["api", "/api/"] {
            let result = ServiceConfig::builder()
                .with_api_prefix(prefix)
                .with_auth_secret_key("secret")
                .build();
            assert!(result.is_err(), "{prefix} should be rejected");
        }
    }

    #[test]
    fn secret_is_not_serialized() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_secret_key("secret")
            .build()?;
        let json = serde_json::to_string(&config)?;
        assert!(!json.contains("secret"));
        Ok(())
    }

    #[tokio::test]
    async fn loads_hs256_verifier() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_secret_key(crate::service::TEST_SECRET)
            .build()?;
        let verifier = config.load_verifier().await?;

        let token = crate::service::hs256_token("alice")?;
        assert_eq!(verifier.verify(&token).await?.sub, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn missing_pem_file_fails_startup() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_auth_public_pem_filepath("/nonexistent/public.pem")
            .build()?;
        assert!(config.load_verifier().await.is_err());
        Ok(())
    }
}
