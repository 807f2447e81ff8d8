//! Application state and dependency injection.

use vitae_rig::chat::ChatService;

use crate::Result;
use crate::service::{AuthVerifier, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub chat: ChatService,
    pub verifier: AuthVerifier,
}

impl ServiceState {
    /// Creates the state from already assembled services.
    pub fn new(chat: ChatService, verifier: AuthVerifier) -> Self {
        Self { chat, verifier }
    }

    /// Initializes application state from configuration.
    ///
    /// Loads the verification key; the chat service is assembled by the
    /// caller from the model provider configuration.
    pub async fn from_config(config: &ServiceConfig, chat: ChatService) -> Result<Self> {
        let verifier = config.load_verifier().await?;
        Ok(Self::new(chat, verifier))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(chat: ChatService);
impl_di!(verifier: AuthVerifier);
