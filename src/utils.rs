use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Unreserved URI characters allowed in a PKCE code verifier (RFC 7636 §4.1).
pub const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Number of random bytes drawn for a code verifier. One character per byte.
pub const CODE_VERIFIER_LENGTH: usize = 128;

/// Number of random bytes drawn for a CSRF state value.
pub const STATE_LENGTH: usize = 32;

/// Draws `len` bytes from the OS random source and maps each one onto
/// [`VERIFIER_CHARSET`].
pub fn random_unreserved_string(len: usize) -> Result<String> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::RandomnessUnavailable(e.to_string()))?;

    Ok(bytes
        .iter()
        .map(|b| VERIFIER_CHARSET[*b as usize % VERIFIER_CHARSET.len()] as char)
        .collect())
}

pub fn generate_code_verifier() -> Result<String> {
    random_unreserved_string(CODE_VERIFIER_LENGTH)
}

pub fn generate_state() -> Result<String> {
    random_unreserved_string(STATE_LENGTH)
}

/// S256 transform: `BASE64URL(SHA256(verifier))` without padding.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Parses a `Retry-After` header value given in whole seconds.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
