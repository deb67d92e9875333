use std::sync::Arc;

use chrono::{Local, Utc};
use tabled::Table;

use crate::{
    config, error, info,
    management::{self, TokenStore},
    spotify::auth::{AuthorizationCode, ClientCredentialsAuthenticator, Pkce, UserGrant},
    success,
    types::{TokenTableRow, Tokens},
    warning,
};

const STORE_NAMES: [&str; 3] = [
    Pkce::STORE_NAME,
    AuthorizationCode::STORE_NAME,
    ClientCredentialsAuthenticator::STORE_NAME,
];

/// Lists the stored tokens of every flow without revealing them.
pub async fn token_status() {
    let mut rows = Vec::new();

    for name in STORE_NAMES {
        let store = management::default_store(name).await;
        match store.load().await {
            Ok(Some(tokens)) => rows.push(status_row(name, &tokens)),
            Ok(None) => rows.push(TokenTableRow {
                flow: name.to_string(),
                status: "none".to_string(),
                expires: "-".to_string(),
                refresh: "-".to_string(),
                scopes: "-".to_string(),
            }),
            Err(e) => warning!("Failed to load {} tokens. Err: {}", name, e),
        }
    }

    let table = Table::new(rows);
    println!("{}", table);
}

fn status_row(name: &str, tokens: &Tokens) -> TokenTableRow {
    let status = if tokens.is_expired() {
        "expired".to_string()
    } else {
        let left = tokens.expires_at - Utc::now();
        format!("valid ({} min)", left.num_minutes())
    };

    let scopes = tokens.scopes();
    TokenTableRow {
        flow: name.to_string(),
        status,
        expires: tokens
            .expires_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        refresh: if tokens.refresh_token.is_some() { "yes" } else { "no" }.to_string(),
        scopes: if scopes.is_empty() {
            "-".to_string()
        } else {
            scopes.join(" ")
        },
    }
}

/// Removes the stored tokens of every flow.
pub async fn token_clear() {
    for name in STORE_NAMES {
        let store = management::default_store(name).await;
        if let Err(e) = store.clear().await {
            error!("Failed to clear {} tokens. Err: {}", name, e);
        }
    }
    success!("Stored tokens removed");
}

/// Prints an app-only access token, requesting a new one when none is
/// cached or `force` is set.
pub async fn app_token(force: bool) {
    let config = match config::client_credentials_auth_config() {
        Ok(config) => config,
        Err(e) => error!("Cannot configure client credentials flow. Err: {}", e),
    };

    let store = management::default_store(ClientCredentialsAuthenticator::STORE_NAME).await;
    let authenticator = Arc::new(ClientCredentialsAuthenticator::with_store(config, store));

    match authenticator.app_access_token(force).await {
        Ok(tokens) => {
            info!(
                "Valid until {}",
                tokens.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            println!("{}", tokens.access_token);
        }
        Err(e) => error!("Failed to get app token. Err: {}", e),
    }
}
