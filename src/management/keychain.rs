use std::sync::Arc;

use async_trait::async_trait;
use keyring::Entry;

use super::TokenStore;
use crate::{Error, Result, types::Tokens};

/// Tokens kept as one JSON secret in the OS credential store
/// (Keychain, Credential Manager, Secret Service).
#[derive(Clone)]
pub struct KeychainTokenStore {
    entry: Arc<Entry>,
}

impl KeychainTokenStore {
    pub fn new(service: &str, account: &str) -> Result<Self> {
        let entry = Entry::new(service, account).map_err(|e| Error::Keychain(e.to_string()))?;
        Ok(Self {
            entry: Arc::new(entry),
        })
    }

    /// Checks that a backend answers at all. A missing entry counts as usable.
    pub async fn probe(&self) -> bool {
        let entry = Arc::clone(&self.entry);
        matches!(
            tokio::task::spawn_blocking(move || entry.get_password()).await,
            Ok(Ok(_)) | Ok(Err(keyring::Error::NoEntry))
        )
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> keyring::Result<T> + Send + 'static,
    {
        let entry = Arc::clone(&self.entry);
        tokio::task::spawn_blocking(move || f(&entry))
            .await
            .map_err(|e| Error::Keychain(e.to_string()))?
            .map_err(|e| Error::Keychain(e.to_string()))
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    async fn save(&self, tokens: &Tokens) -> Result<()> {
        let json = serde_json::to_string(tokens).map_err(Error::EncodingFailed)?;
        self.blocking(move |entry| entry.set_password(&json)).await
    }

    async fn load(&self) -> Result<Option<Tokens>> {
        let secret = self
            .blocking(|entry| match entry.get_password() {
                Ok(secret) => Ok(Some(secret)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e),
            })
            .await?;

        match secret {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(Error::DecodingFailed),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}
