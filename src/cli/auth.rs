use std::{sync::Arc, time::Duration};

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Instant;

use crate::{
    Result, config, error, info, management,
    server::{CallbackState, start_api_server},
    spotify::auth::{AuthConfig, AuthorizationCode, Pkce, UserAuthenticator, UserGrant},
    success,
    types::Tokens,
    warning,
};

use super::AuthFlow;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs a browser based authorization and stores the resulting tokens.
pub async fn auth(flow: AuthFlow) {
    match flow {
        AuthFlow::Pkce => match config::pkce_auth_config() {
            Ok(config) => run::<Pkce>(config).await,
            Err(e) => error!("Cannot configure PKCE flow. Err: {}", e),
        },
        AuthFlow::Code => match config::authorization_code_auth_config() {
            Ok(config) => run::<AuthorizationCode>(config).await,
            Err(e) => error!("Cannot configure authorization code flow. Err: {}", e),
        },
    }
}

async fn run<G: UserGrant>(config: AuthConfig) {
    let store = management::default_store(G::STORE_NAME).await;
    let authenticator = Arc::new(UserAuthenticator::<G>::new(config, store));
    let state = CallbackState::new(authenticator.clone());

    let server_state = Arc::clone(&state);
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(Arc::clone(&server_state)).await {
            *server_state.result.lock().await = Some(Err(e));
        }
    });

    let auth_url = match authenticator.make_authorization_url().await {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization URL. Err: {}", e),
    };

    info!("Opening browser for Spotify authorization");
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_callback(&state).await;
    server.abort();

    match outcome {
        Some(Ok(tokens)) => success!(
            "Authentication successful! Token valid until {}",
            tokens.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        Some(Err(e)) => error!("Authentication failed. Err: {}", e),
        None => error!("Authentication timed out."),
    }
}

async fn wait_for_callback(state: &CallbackState) -> Option<Result<Tokens>> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization callback...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < CALLBACK_TIMEOUT {
        if let Some(result) = state.take_result().await {
            pb.finish_and_clear();
            return Some(result);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    pb.finish_and_clear();
    None
}
