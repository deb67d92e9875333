//! # CLI Module
//!
//! Command implementations for the `sporl` binary. Each command builds the
//! authenticator it needs from [`crate::config`], persists through
//! [`crate::management::default_store`] and reports through the colored
//! output macros. Fatal errors end the process via `error!`.
//!
//! - [`auth`] - browser based authorization (PKCE or authorization code)
//!   with the local callback server
//! - [`token_status`], [`token_clear`] - inspect or remove stored tokens
//! - [`app_token`] - client credentials token
//! - [`me`] - profile of the authorized user

mod auth;
mod me;
mod token;

use clap::ValueEnum;

pub use auth::auth;
pub use me::me;
pub use token::{app_token, token_clear, token_status};

/// User flow selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthFlow {
    /// Authorization code with PKCE, no client secret needed
    #[default]
    Pkce,
    /// Authorization code with client secret
    Code,
}
