use std::sync::Arc;

use crate::{
    Result, config, error, info, management,
    spotify::{
        auth::{AuthConfig, AuthorizationCode, Pkce, UserAuthenticator, UserGrant},
        client::{SpotifyClient, UserClient},
    },
    types::UserProfile,
    warning,
};

use super::AuthFlow;

/// Shows the profile of the user who authorized `flow`.
pub async fn me(flow: AuthFlow) {
    let profile = match flow {
        AuthFlow::Pkce => match config::pkce_auth_config() {
            Ok(config) => fetch_profile::<Pkce>(config).await,
            Err(e) => error!("Cannot configure PKCE flow. Err: {}", e),
        },
        AuthFlow::Code => match config::authorization_code_auth_config() {
            Ok(config) => fetch_profile::<AuthorizationCode>(config).await,
            Err(e) => error!("Cannot configure authorization code flow. Err: {}", e),
        },
    };

    match profile {
        Ok(profile) => {
            info!(
                "{} ({})",
                profile.display_name.as_deref().unwrap_or("-"),
                profile.id
            );
            if let Some(email) = profile.email {
                info!("E-Mail: {}", email);
            }
            if let Some(product) = profile.product {
                info!("Plan: {}", product);
            }
        }
        Err(crate::Error::NotAuthorized) => {
            warning!("No tokens stored. Please run `sporl auth` first.")
        }
        Err(e) => error!("Failed to fetch profile. Err: {}", e),
    }
}

async fn fetch_profile<G: UserGrant>(auth_config: AuthConfig) -> Result<UserProfile> {
    let store = management::default_store(G::STORE_NAME).await;
    let authenticator = Arc::new(UserAuthenticator::<G>::new(auth_config, store));

    let client: UserClient = SpotifyClient::builder(authenticator)
        .api_base(config::spotify_apiurl())
        .build()?;
    client.current_user().await
}
