//! # Spotify Integration Module
//!
//! The request-authorization core every Spotify resource call depends on.
//!
//! ## Architecture
//!
//! ```text
//! Resource services (albums, playlists, search, ...)
//!          ↓
//! SpotifyClient<C>            (client)      capability-typed façade
//!     ├── Authenticator       (auth)        token cache, refresh, OAuth flows
//!     └── RequestExecutor     (http)        interceptors, bearer header, retries
//!              ↓
//!          Transport          (http)        reqwest by default
//!              ↓
//!        Spotify Web API / Accounts service
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - Authorization code, PKCE and client credentials flows. Each
//!   authenticator serializes its session behind an async mutex, persists
//!   tokens through a [`crate::management::TokenStore`] and refreshes
//!   expired access tokens on demand.
//! - [`http`] - Request execution. Rate limited requests (429) honor
//!   `Retry-After`, transient failures back off exponentially, both with
//!   independent budgets.
//! - [`client`] - [`client::SpotifyClient`], generic over a
//!   [`capability::Capability`] so app-only clients cannot reach
//!   user-scoped endpoints.
//! - [`capability`] - The marker types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = AuthConfig::client_credentials(client_id, client_secret)?;
//! let auth = Arc::new(ClientCredentialsAuthenticator::new(config));
//! let client: AppClient = SpotifyClient::new(auth)?;
//! let album: serde_json::Value = client.get_json("albums/4aawyAB9vmqN3uQ7FjRGTy").await?;
//! ```

pub mod auth;
pub mod capability;
pub mod client;
pub mod http;
