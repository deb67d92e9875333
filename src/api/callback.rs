use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};
use tracing::warn;

use crate::{Error, Result, server::CallbackState, types::Tokens};

/// Receives the authorization redirect and hands the full callback URL to
/// the pending flow. The outcome is left in [`CallbackState`] for the
/// waiting command.
pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(state): Extension<Arc<CallbackState>>,
) -> Html<&'static str> {
    let result = complete(&state, query).await;

    let page = match &result {
        Ok(_) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(Error::AuthorizationDenied(_)) => Html("<h4>Access was denied.</h4>"),
        Err(e) => {
            warn!("Authorization callback failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    };

    *state.result.lock().await = Some(result);
    page
}

async fn complete(state: &CallbackState, query: Option<String>) -> Result<Tokens> {
    let mut url = state
        .flow
        .redirect_uri()
        .cloned()
        .ok_or_else(|| Error::Config("this flow requires a redirect URI".to_string()))?;
    url.set_query(query.as_deref());

    state.flow.handle_callback(url.as_str()).await
}
