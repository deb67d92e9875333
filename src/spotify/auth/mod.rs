//! OAuth token lifecycle for the three Spotify flows.
//!
//! ```text
//! NoToken --make_authorization_url--> Authorizing(state)
//!    ^                                   |        |
//!    +------ state mismatch / reset -----+        | handle_callback
//!                                                 v
//!            Refreshing(tokens) <--expired-- Authorized(tokens)
//!                   |                             ^
//!                   +-----------------------------+
//! ```
//!
//! [`AuthorizationCodeAuthenticator`] and [`PkceAuthenticator`] drive the
//! browser based flows. [`ClientCredentialsAuthenticator`] fetches app-only
//! tokens. All of them hand out bearer tokens through [`TokenProvider`].

mod client_credentials;
mod config;
mod endpoint;
mod user;

use async_trait::async_trait;
use url::Url;

pub use client_credentials::ClientCredentialsAuthenticator;
pub use config::{AuthConfig, SPOTIFY_AUTHORIZE_URL, SPOTIFY_TOKEN_URL, Scope};
pub use endpoint::{ClientAuthentication, basic_authorization};
pub use user::{
    AuthorizationCode, AuthorizationCodeAuthenticator, Pkce, PkceAuthenticator, UserAuthenticator,
    UserGrant,
};

use crate::{Result, spotify::capability::Capability, types::Tokens};

/// Where an authenticator stands in its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    NoToken,
    Authorizing,
    Authorized,
}

/// Source of bearer tokens for the request executor.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A token that is not expired, refreshing first when needed.
    async fn access_token(&self) -> Result<String>;

    /// Called once after the API rejected `rejected` with 401. Does
    /// nothing when the current token already differs from it, so
    /// concurrent rejections renew only once.
    async fn reauthorize(&self, rejected: &str) -> Result<()>;
}

/// A token provider bound to the capability of the tokens it issues.
pub trait Authenticator: TokenProvider {
    type Capability: Capability;
}

/// The browser half of the user flows, used by the callback server.
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn make_authorization_url(&self) -> Result<Url>;

    async fn handle_callback(&self, callback_url: &str) -> Result<Tokens>;

    fn redirect_uri(&self) -> Option<&Url>;
}
