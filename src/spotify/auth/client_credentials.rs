use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    AuthConfig, Authenticator, ClientAuthentication, TokenProvider, endpoint::request_tokens,
};
use crate::{
    Result,
    management::{MemoryTokenStore, TokenStore},
    spotify::{
        capability::AppOnly,
        http::{ReqwestTransport, Transport},
    },
    types::Tokens,
};

/// App-only tokens from the client credentials grant.
///
/// There is no user to send back through the browser, so a rejected token is
/// recovered by asking for a new one with `invalidating_previous`.
pub struct ClientCredentialsAuthenticator {
    config: AuthConfig,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    cache: Mutex<Option<Tokens>>,
}

impl ClientCredentialsAuthenticator {
    /// Name used for a persistent store of app tokens.
    pub const STORE_NAME: &'static str = "client-credentials";

    /// Tokens stay in memory.
    pub fn new(config: AuthConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_store(config: AuthConfig, store: Arc<dyn TokenStore>) -> Self {
        Self::with_transport(config, store, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: AuthConfig,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            cache: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns a valid app token: from memory, then from the store, then
    /// from the token endpoint. `invalidating_previous` skips both caches.
    pub async fn app_access_token(&self, invalidating_previous: bool) -> Result<Tokens> {
        let mut cache = self.cache.lock().await;
        self.app_access_token_locked(&mut cache, invalidating_previous).await
    }

    async fn app_access_token_locked(
        &self,
        cache: &mut Option<Tokens>,
        invalidating_previous: bool,
    ) -> Result<Tokens> {
        if !invalidating_previous {
            if let Some(tokens) = cache.as_ref().filter(|t| !t.is_expired()) {
                debug!("Using cached app token");
                return Ok(tokens.clone());
            }
            if let Some(tokens) = self.store.load().await?.filter(|t| !t.is_expired()) {
                debug!("Using stored app token");
                *cache = Some(tokens.clone());
                return Ok(tokens);
            }
        }

        let mut tokens = request_tokens(
            self.transport.as_ref(),
            &self.config,
            &[("grant_type", "client_credentials")],
            ClientAuthentication::Basic,
        )
        .await?;
        // this grant never issues refresh tokens
        tokens.refresh_token = None;

        self.store.save(&tokens).await?;
        *cache = Some(tokens.clone());
        Ok(tokens)
    }

    pub async fn reset(&self) -> Result<()> {
        self.cache.lock().await.take();
        self.store.clear().await
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsAuthenticator {
    async fn access_token(&self) -> Result<String> {
        Ok(self.app_access_token(false).await?.access_token)
    }

    async fn reauthorize(&self, rejected: &str) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let renewed = cache
            .as_ref()
            .is_some_and(|t| t.access_token != rejected && !t.is_expired());
        if renewed {
            debug!("App token already renewed");
            return Ok(());
        }
        self.app_access_token_locked(&mut cache, true).await.map(|_| ())
    }
}

impl Authenticator for ClientCredentialsAuthenticator {
    type Capability = AppOnly;
}
