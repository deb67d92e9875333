use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{debug, info};

use super::AuthConfig;
use crate::{
    Error, Result,
    spotify::http::{HttpRequest, Transport},
    types::{TokenResponse, Tokens},
};

/// How the client proves its identity to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthentication {
    /// `Authorization: Basic base64(client_id:client_secret)`.
    Basic,
    /// `client_id` in the form body, no secret (PKCE).
    Public,
}

pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

/// POSTs a form to the token endpoint and turns the answer into [`Tokens`].
pub(crate) async fn request_tokens(
    transport: &dyn Transport,
    config: &AuthConfig,
    fields: &[(&str, &str)],
    client_auth: ClientAuthentication,
) -> Result<Tokens> {
    let mut form: Vec<(&str, &str)> = fields.to_vec();
    if client_auth == ClientAuthentication::Public {
        form.push(("client_id", config.client_id()));
    }

    let mut request = HttpRequest::post(config.token_endpoint().clone()).form(&form);

    if client_auth == ClientAuthentication::Basic {
        let secret = config.client_secret().ok_or_else(|| {
            Error::UnexpectedResponse("this flow requires a client secret".to_string())
        })?;
        let value = HeaderValue::from_str(&basic_authorization(config.client_id(), secret))
            .map_err(|e| Error::Config(format!("client credentials are not header safe: {e}")))?;
        request.headers.insert(AUTHORIZATION, value);
    }

    let grant = fields
        .iter()
        .find(|(key, _)| *key == "grant_type")
        .map_or("unknown", |(_, value)| *value);
    info!("Requesting tokens ({}) from {}", grant, config.token_endpoint());

    let response = transport.send(request).await?;
    let received_at = Utc::now();

    if !response.status.is_success() {
        return Err(Error::Http {
            status: response.status.as_u16(),
            body: response.text(),
        });
    }

    let parsed: TokenResponse = serde_json::from_slice(&response.body)
        .map_err(|e| Error::UnexpectedResponse(format!("malformed token response: {e}")))?;
    debug!("Token endpoint granted {} seconds", parsed.expires_in);

    Ok(Tokens::from_response(parsed, received_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_authorization_header() {
        // base64("cid:csec")
        assert_eq!(basic_authorization("cid", "csec"), "Basic Y2lkOmNzZWM=");
    }
}
