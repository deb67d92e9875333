use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{Result, utils};

/// OAuth tokens as cached in memory and persisted by a token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Tokens {
    /// Builds tokens from a token endpoint response. `expires_in` is turned
    /// into an absolute timestamp relative to `received_at`.
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: Duration::try_seconds(response.expires_in)
                .and_then(|lifetime| received_at.checked_add_signed(lifetime))
                .unwrap_or(received_at),
            scope: response.scope,
            token_type: response.token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Granted scopes, split from the space separated `scope` field.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// JSON body returned by the accounts service token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Verifier, challenge and CSRF state for one PKCE authorization attempt.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl PkcePair {
    pub fn generate() -> Result<Self> {
        let verifier = utils::generate_code_verifier()?;
        let challenge = utils::generate_code_challenge(&verifier);
        let state = utils::generate_state()?;
        Ok(Self {
            verifier,
            challenge,
            state,
        })
    }
}

/// Spotify paging object. Offset pages and cursor pages both carry `next`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

/// Subset of the `/me` profile object used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Tabled)]
pub struct TokenTableRow {
    pub flow: String,
    pub status: String,
    pub expires: String,
    pub refresh: String,
    pub scopes: String,
}
