//! Error types for sporl
//!
//! Every failure path of the library ends up in [`Error`]. Variants keep the
//! structured payload (status code, response body, wrapped cause) so callers
//! can branch on them instead of parsing messages.

use std::time::Duration;

use thiserror::Error;

use crate::spotify::http::TransportError;

/// Result type alias for sporl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sporl
#[derive(Error, Debug)]
pub enum Error {
    /// A flow was used with a configuration it cannot work with.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx response from the token endpoint or a resource call.
    /// The body is kept verbatim.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("No tokens available, complete the authorization flow first")]
    NotAuthorized,

    #[error("Callback URL does not contain an authorization code")]
    MissingCode,

    #[error("Callback URL does not contain a state parameter")]
    MissingState,

    /// The callback state does not match the pending authorization request.
    #[error("State mismatch in authorization callback")]
    StateMismatch,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Failed to encode tokens: {0}")]
    EncodingFailed(#[source] serde_json::Error),

    #[error("Failed to decode stored tokens: {0}")]
    DecodingFailed(#[source] serde_json::Error),

    #[error("File access failed: {0}")]
    FileAccessFailed(#[source] std::io::Error),

    #[error("Keychain error: {0}")]
    Keychain(String),

    /// Rate-limit retries exhausted, or the server asked for a longer wait
    /// than the client is allowed to sleep.
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Interceptor rejected request: {0}")]
    Interceptor(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid JSON in response: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Callback server failed: {0}")]
    Server(#[source] std::io::Error),
}

impl Error {
    /// Status code of an HTTP-level failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
