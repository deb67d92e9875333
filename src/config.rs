//! Configuration from environment variables and a `.env` file.
//!
//! Values are looked up in this order:
//! 1. Environment variables
//! 2. `.env` in the local data directory
//! 3. Defaults, for the Spotify endpoints and the server address
//!
//! Getters return [`Error::Config`] for missing required values instead of
//! panicking, so library users decide how to report them.

use std::{env, path::PathBuf};

use tracing::debug;

use crate::{
    Error, Result,
    spotify::{
        auth::{AuthConfig, SPOTIFY_AUTHORIZE_URL, SPOTIFY_TOKEN_URL, Scope},
        client::SPOTIFY_API_URL,
    },
};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Location of the `.env` file:
/// - Linux: `~/.local/share/sporl/.env`
/// - macOS: `~/Library/Application Support/sporl/.env`
/// - Windows: `%LOCALAPPDATA%/sporl/.env`
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporl/.env");
    path
}

/// Loads the `.env` file into the process environment, creating its
/// directory when needed. A missing file is not an error, variables may
/// come from the environment alone.
pub async fn load_env() -> Result<()> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(Error::FileAccessFailed)?;
    }

    if !path.is_file() {
        debug!("No .env file at {}", path.display());
        return Ok(());
    }

    dotenv::from_path(&path)
        .map_err(|e| Error::Config(format!("cannot load {}: {e}", path.display())))?;
    Ok(())
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{key} must be set"))),
    }
}

fn with_default(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// `SERVER_ADDRESS`, where the callback server binds.
pub fn server_addr() -> String {
    with_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Keep this out of logs and version control.
pub fn spotify_client_secret() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Must match a redirect URI registered for the application.
pub fn spotify_redirect_uri() -> Result<String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

/// Space separated scopes, e.g. `user-read-private user-read-email`.
/// Unset means no scopes.
pub fn spotify_scope() -> String {
    with_default("SPOTIFY_API_AUTH_SCOPE", "")
}

pub fn spotify_apiauth_url() -> String {
    with_default("SPOTIFY_API_AUTH_URL", SPOTIFY_AUTHORIZE_URL)
}

pub fn spotify_apiurl() -> String {
    with_default("SPOTIFY_API_URL", SPOTIFY_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    with_default("SPOTIFY_API_TOKEN_URL", SPOTIFY_TOKEN_URL)
}

fn scopes() -> Result<Vec<Scope>> {
    Ok(Scope::parse_set(&spotify_scope())?.into_iter().collect())
}

pub fn pkce_auth_config() -> Result<AuthConfig> {
    AuthConfig::pkce(spotify_client_id()?, &spotify_redirect_uri()?, scopes()?)?
        .with_endpoints(&spotify_apiauth_url(), &spotify_apitoken_url())
}

pub fn authorization_code_auth_config() -> Result<AuthConfig> {
    AuthConfig::authorization_code(
        spotify_client_id()?,
        spotify_client_secret()?,
        &spotify_redirect_uri()?,
        scopes()?,
    )?
    .with_endpoints(&spotify_apiauth_url(), &spotify_apitoken_url())
}

pub fn client_credentials_auth_config() -> Result<AuthConfig> {
    AuthConfig::client_credentials(spotify_client_id()?, spotify_client_secret()?)?
        .with_endpoints(&spotify_apiauth_url(), &spotify_apitoken_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_value() {
        let err = required("SPORL_TEST_NEVER_SET").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("SPORL_TEST_NEVER_SET")));
    }

    #[test]
    fn test_default_for_unset_value() {
        assert_eq!(with_default("SPORL_TEST_NEVER_SET", "fallback"), "fallback");
    }

    #[test]
    fn test_env_path_is_in_sporl_dir() {
        assert!(env_path().ends_with("sporl/.env"));
    }
}
