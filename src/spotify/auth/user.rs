use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::{
    AuthConfig, AuthPhase, Authenticator, AuthorizationFlow, ClientAuthentication, TokenProvider,
    endpoint::request_tokens,
};
use crate::{
    Error, Result,
    management::TokenStore,
    spotify::{
        capability::UserAuthorized,
        http::{ReqwestTransport, Transport},
    },
    types::{PkcePair, Tokens},
    utils,
};

mod sealed {
    pub trait Sealed {}
}

/// Distinguishes the two browser based flows sharing [`UserAuthenticator`].
pub trait UserGrant: sealed::Sealed + Send + Sync + 'static {
    /// Whether the flow binds the code to a PKCE verifier.
    const PKCE: bool;
    /// How the client authenticates against the token endpoint.
    const CLIENT_AUTH: ClientAuthentication;
    /// Name used for the default token store of this flow.
    const STORE_NAME: &'static str;
}

/// Authorization code flow with a confidential client secret.
#[derive(Debug)]
pub enum AuthorizationCode {}

/// Authorization code flow with PKCE, no client secret.
#[derive(Debug)]
pub enum Pkce {}

impl sealed::Sealed for AuthorizationCode {}
impl sealed::Sealed for Pkce {}

impl UserGrant for AuthorizationCode {
    const PKCE: bool = false;
    const CLIENT_AUTH: ClientAuthentication = ClientAuthentication::Basic;
    const STORE_NAME: &'static str = "authorization-code";
}

impl UserGrant for Pkce {
    const PKCE: bool = true;
    const CLIENT_AUTH: ClientAuthentication = ClientAuthentication::Public;
    const STORE_NAME: &'static str = "pkce";
}

pub type AuthorizationCodeAuthenticator = UserAuthenticator<AuthorizationCode>;
pub type PkceAuthenticator = UserAuthenticator<Pkce>;

/// The one authorization attempt in flight.
struct PendingAuthorization {
    state: String,
    verifier: Option<String>,
}

#[derive(Default)]
struct Session {
    tokens: Option<Tokens>,
    pending: Option<PendingAuthorization>,
    restored: bool,
}

/// Authenticator for flows where a user grants access in the browser.
///
/// All session state sits behind one async mutex. A token check that turns
/// into a refresh holds the lock until the new tokens are stored, so
/// concurrent callers wait for that refresh instead of starting their own.
pub struct UserAuthenticator<G: UserGrant> {
    config: AuthConfig,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    session: Mutex<Session>,
    _grant: PhantomData<G>,
}

impl<G: UserGrant> UserAuthenticator<G> {
    pub fn new(config: AuthConfig, store: Arc<dyn TokenStore>) -> Self {
        Self::with_transport(config, store, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: AuthConfig,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
            session: Mutex::new(Session::default()),
            _grant: PhantomData,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn store_name() -> &'static str {
        G::STORE_NAME
    }

    /// Builds the URL the user opens in a browser. Generates a fresh state
    /// (and PKCE verifier) and replaces any pending attempt.
    pub async fn make_authorization_url(&self) -> Result<Url> {
        let redirect_uri = self.required_redirect_uri()?;

        let (state, verifier, challenge) = if G::PKCE {
            let pair = PkcePair::generate()?;
            (pair.state, Some(pair.verifier), Some(pair.challenge))
        } else {
            (utils::generate_state()?, None, None)
        };

        let mut url = self.config.authorization_endpoint().clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", self.config.client_id())
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri.as_str())
                .append_pair("scope", &self.config.scope_string())
                .append_pair("state", &state)
                .append_pair("show_dialog", if self.config.show_dialog() { "true" } else { "false" });
            if let Some(challenge) = &challenge {
                query
                    .append_pair("code_challenge", challenge)
                    .append_pair("code_challenge_method", "S256");
            }
        }

        let mut session = self.session.lock().await;
        if session.pending.is_some() {
            debug!("Discarding previous pending authorization");
        }
        session.pending = Some(PendingAuthorization { state, verifier });
        Ok(url)
    }

    /// Validates the redirect, exchanges the code and persists the tokens.
    pub async fn handle_callback(&self, callback_url: &str) -> Result<Tokens> {
        let url = Url::parse(callback_url)?;
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        let mut session = self.session.lock().await;

        let state = params.get("state").ok_or(Error::MissingState)?;
        let matches = session
            .pending
            .as_ref()
            .is_some_and(|pending| &pending.state == state);
        if !matches {
            warn!("Authorization callback state does not match the pending request");
            session.pending = None;
            return Err(Error::StateMismatch);
        }

        // the state is single use from here on
        let pending = session.pending.take();

        if let Some(reason) = params.get("error") {
            return Err(Error::AuthorizationDenied(reason.clone()));
        }
        let code = params.get("code").ok_or(Error::MissingCode)?;

        let redirect_uri = self.required_redirect_uri()?.to_string();
        let mut fields = vec![
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let verifier = pending.and_then(|p| p.verifier);
        if G::PKCE {
            let verifier = verifier
                .as_deref()
                .ok_or_else(|| Error::UnexpectedResponse("no PKCE verifier pending".to_string()))?;
            fields.push(("code_verifier", verifier));
        }

        let tokens =
            request_tokens(self.transport.as_ref(), &self.config, &fields, G::CLIENT_AUTH).await?;
        self.store.save(&tokens).await?;
        session.tokens = Some(tokens.clone());
        session.restored = true;
        info!("Authorization complete ({})", G::STORE_NAME);

        Ok(tokens)
    }

    /// Exchanges the current refresh token for new tokens. The old refresh
    /// token is kept when the response does not rotate it.
    pub async fn refresh_access_token(&self) -> Result<Tokens> {
        let mut session = self.session.lock().await;
        self.refresh_locked(&mut session).await
    }

    /// Current tokens, restoring them from the store on first use.
    pub async fn tokens(&self) -> Result<Option<Tokens>> {
        let mut session = self.session.lock().await;
        self.restore(&mut session).await?;
        Ok(session.tokens.clone())
    }

    /// Drops pending state, cached tokens and the stored copy.
    pub async fn reset(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        session.pending = None;
        session.tokens = None;
        session.restored = true;
        self.store.clear().await
    }

    /// In-memory phase of the state machine. Stored tokens not yet
    /// restored count as [`AuthPhase::NoToken`].
    pub async fn phase(&self) -> AuthPhase {
        let session = self.session.lock().await;
        match (&session.pending, &session.tokens) {
            (Some(_), _) => AuthPhase::Authorizing,
            (None, Some(_)) => AuthPhase::Authorized,
            (None, None) => AuthPhase::NoToken,
        }
    }

    fn required_redirect_uri(&self) -> Result<&Url> {
        self.config
            .redirect_uri()
            .ok_or_else(|| Error::Config("this flow requires a redirect URI".to_string()))
    }

    async fn restore(&self, session: &mut Session) -> Result<()> {
        if session.restored {
            return Ok(());
        }
        if session.tokens.is_none() {
            session.tokens = self.store.load().await?;
            if session.tokens.is_some() {
                debug!("Restored tokens from store ({})", G::STORE_NAME);
            }
        }
        session.restored = true;
        Ok(())
    }

    async fn refresh_locked(&self, session: &mut Session) -> Result<Tokens> {
        self.restore(session).await?;

        let refresh_token = session
            .tokens
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or(Error::MissingRefreshToken)?;

        let fields = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let mut tokens =
            request_tokens(self.transport.as_ref(), &self.config, &fields, G::CLIENT_AUTH).await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }

        self.store.save(&tokens).await?;
        session.tokens = Some(tokens.clone());
        info!("Refreshed access token ({})", G::STORE_NAME);

        Ok(tokens)
    }
}

#[async_trait]
impl<G: UserGrant> TokenProvider for UserAuthenticator<G> {
    async fn access_token(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        self.restore(&mut session).await?;

        let current = session
            .tokens
            .as_ref()
            .map(|t| (t.is_expired(), t.access_token.clone()));
        match current {
            None => Err(Error::NotAuthorized),
            Some((false, access_token)) => Ok(access_token),
            Some((true, _)) => {
                debug!("Access token expired, refreshing");
                let tokens = self.refresh_locked(&mut session).await?;
                Ok(tokens.access_token)
            }
        }
    }

    async fn reauthorize(&self, rejected: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        self.restore(&mut session).await?;

        let renewed = session
            .tokens
            .as_ref()
            .is_some_and(|t| t.access_token != rejected && !t.is_expired());
        if renewed {
            debug!("Access token already renewed");
            return Ok(());
        }
        self.refresh_locked(&mut session).await.map(|_| ())
    }
}

impl<G: UserGrant> Authenticator for UserAuthenticator<G> {
    type Capability = UserAuthorized;
}

#[async_trait]
impl<G: UserGrant> AuthorizationFlow for UserAuthenticator<G> {
    async fn make_authorization_url(&self) -> Result<Url> {
        UserAuthenticator::make_authorization_url(self).await
    }

    async fn handle_callback(&self, callback_url: &str) -> Result<Tokens> {
        UserAuthenticator::handle_callback(self, callback_url).await
    }

    fn redirect_uri(&self) -> Option<&Url> {
        self.config.redirect_uri()
    }
}
