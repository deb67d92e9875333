use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::sync::Mutex;
use tracing::info;

use crate::{Error, Result, api, config, spotify::auth::AuthorizationFlow, types::Tokens};

/// Shared between the callback handler and the command waiting for it.
pub struct CallbackState {
    pub flow: Arc<dyn AuthorizationFlow>,
    pub result: Mutex<Option<Result<Tokens>>>,
}

impl CallbackState {
    pub fn new(flow: Arc<dyn AuthorizationFlow>) -> Arc<Self> {
        Arc::new(Self {
            flow,
            result: Mutex::new(None),
        })
    }

    /// Takes the outcome of the callback once it arrived.
    pub async fn take_result(&self) -> Option<Result<Tokens>> {
        self.result.lock().await.take()
    }
}

pub fn router(state: Arc<CallbackState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Serves the callback routes on [`config::server_addr`] until the task is
/// aborted.
pub async fn start_api_server(state: Arc<CallbackState>) -> Result<()> {
    let addr = SocketAddr::from_str(&config::server_addr())
        .map_err(|e| Error::Config(format!("invalid SERVER_ADDRESS: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::Server)?;
    info!("Callback server listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(Error::Server)
}
