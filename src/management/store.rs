use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Result, types::Tokens};

/// Persistence for an authenticator's tokens.
///
/// `save` must replace any previous value in one step, a concurrent `load`
/// never observes a half written document.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(&self, tokens: &Tokens) -> Result<()>;

    async fn load(&self) -> Result<Option<Tokens>>;

    async fn clear(&self) -> Result<()>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<Tokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, tokens: &Tokens) -> Result<()> {
        *self.tokens.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Tokens>> {
        Ok(self.tokens.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        self.tokens.lock().await.take();
        Ok(())
    }
}
