//! Type-level tags telling user-authorized clients apart from app-only ones.
//!
//! A `SpotifyClient<AppOnly>` can only be built from a client-credentials
//! authenticator and never gets the methods gated on [`UserScoped`].

mod sealed {
    pub trait Sealed {}
}

pub trait Capability: sealed::Sealed + Send + Sync + 'static {}

/// Capabilities allowed to call endpoints acting on behalf of a user.
pub trait UserScoped: Capability {}

/// Tokens obtained through the authorization code or PKCE flow.
#[derive(Debug, Clone, Copy)]
pub enum UserAuthorized {}

/// Tokens obtained through the client credentials flow.
#[derive(Debug, Clone, Copy)]
pub enum AppOnly {}

impl sealed::Sealed for UserAuthorized {}
impl sealed::Sealed for AppOnly {}

impl Capability for UserAuthorized {}
impl Capability for AppOnly {}

impl UserScoped for UserAuthorized {}
