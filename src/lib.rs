//! Spotify Web API client core.
//!
//! Token lifecycle for the authorization code, PKCE and client credentials
//! flows, a request executor that injects bearer tokens and recovers from
//! rate limiting and network failures, and a capability-typed client used by
//! the resource services.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Environment based configuration
//! - `error` - The crate wide error type
//! - `management` - Token persistence (keychain, file, memory)
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Authenticators, request execution and the client façade
//! - `types` - Tokens, pages and other data structures
//! - `utils` - PKCE helpers and header parsing
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sporl::{config, spotify::{auth::ClientCredentialsAuthenticator, client::{AppClient, SpotifyClient}}};
//!
//! #[tokio::main]
//! async fn main() -> sporl::Result<()> {
//!     config::load_env().await?;
//!     let auth = Arc::new(ClientCredentialsAuthenticator::new(config::client_credentials_auth_config()?));
//!     let client: AppClient = SpotifyClient::new(auth)?;
//!     let album: serde_json::Value = client.get_json("albums/4aawyAB9vmqN3uQ7FjRGTy").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints a status line with a blue bullet.
///
/// ```ignore
/// info!("Token expires in {} minutes", minutes);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a status line with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints the message with a red marker and exits with status 1.
///
/// Only for the binary: library code returns [`Error`] instead.
///
/// ```ignore
/// error!("Authorization failed: {}", err);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a status line with a yellow marker for recoverable problems.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
