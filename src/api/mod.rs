//! # API Module
//!
//! HTTP handlers for the local server that receives the OAuth redirect.
//!
//! - [`callback`] - Completes an authorization code or PKCE flow. The raw
//!   query string is appended to the configured redirect URI and passed to
//!   [`crate::spotify::auth::AuthorizationFlow::handle_callback`], which
//!   validates the state and exchanges the code.
//! - [`health`] - Reports status and version.
//!
//! ```rust,ignore
//! use sporl::server::{CallbackState, router};
//!
//! let state = CallbackState::new(authenticator);
//! let app = router(state);
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
