//! Token persistence.
//!
//! [`TokenStore`] is the seam every authenticator persists through. Three
//! backends ship with the crate, in order of preference:
//!
//! - `KeychainTokenStore`: OS credential storage, behind the `keychain` feature
//! - [`FileTokenStore`]: a JSON file in an owner-only directory
//! - [`MemoryTokenStore`]: process lifetime only
//!
//! [`default_store`] picks the first one the platform supports.

mod file;
#[cfg(feature = "keychain")]
mod keychain;
mod store;

use std::sync::Arc;

pub use file::{DIR_MODE, FILE_MODE, FileTokenStore};
#[cfg(feature = "keychain")]
pub use keychain::KeychainTokenStore;
pub use store::{MemoryTokenStore, TokenStore};

/// Service name used for keychain entries.
pub const KEYCHAIN_SERVICE: &str = "sporl";

/// Returns the preferred store available on this platform for `name`
/// (e.g. `"pkce"`, `"authorization-code"`).
pub async fn default_store(name: &str) -> Arc<dyn TokenStore> {
    #[cfg(feature = "keychain")]
    {
        if let Ok(store) = KeychainTokenStore::new(KEYCHAIN_SERVICE, name) {
            if store.probe().await {
                tracing::debug!("Using keychain token store for {}", name);
                return Arc::new(store);
            }
        }
        tracing::debug!("Keychain unavailable, falling back to file store");
    }

    if dirs::data_local_dir().is_some() {
        tracing::debug!("Using file token store for {}", name);
        return Arc::new(FileTokenStore::default_for(name));
    }

    tracing::debug!("No data directory, tokens for {} stay in memory", name);
    Arc::new(MemoryTokenStore::new())
}
