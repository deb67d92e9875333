use std::{collections::BTreeSet, fmt, str::FromStr};

use url::Url;

use crate::{Error, Result};

pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Authorization scopes understood by the Spotify accounts service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    UgcImageUpload,
    UserReadPlaybackState,
    UserModifyPlaybackState,
    UserReadCurrentlyPlaying,
    AppRemoteControl,
    Streaming,
    PlaylistReadPrivate,
    PlaylistReadCollaborative,
    PlaylistModifyPrivate,
    PlaylistModifyPublic,
    UserFollowModify,
    UserFollowRead,
    UserReadPlaybackPosition,
    UserTopRead,
    UserReadRecentlyPlayed,
    UserLibraryModify,
    UserLibraryRead,
    UserReadEmail,
    UserReadPrivate,
}

impl Scope {
    pub const ALL: [Scope; 19] = [
        Scope::UgcImageUpload,
        Scope::UserReadPlaybackState,
        Scope::UserModifyPlaybackState,
        Scope::UserReadCurrentlyPlaying,
        Scope::AppRemoteControl,
        Scope::Streaming,
        Scope::PlaylistReadPrivate,
        Scope::PlaylistReadCollaborative,
        Scope::PlaylistModifyPrivate,
        Scope::PlaylistModifyPublic,
        Scope::UserFollowModify,
        Scope::UserFollowRead,
        Scope::UserReadPlaybackPosition,
        Scope::UserTopRead,
        Scope::UserReadRecentlyPlayed,
        Scope::UserLibraryModify,
        Scope::UserLibraryRead,
        Scope::UserReadEmail,
        Scope::UserReadPrivate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::UgcImageUpload => "ugc-image-upload",
            Scope::UserReadPlaybackState => "user-read-playback-state",
            Scope::UserModifyPlaybackState => "user-modify-playback-state",
            Scope::UserReadCurrentlyPlaying => "user-read-currently-playing",
            Scope::AppRemoteControl => "app-remote-control",
            Scope::Streaming => "streaming",
            Scope::PlaylistReadPrivate => "playlist-read-private",
            Scope::PlaylistReadCollaborative => "playlist-read-collaborative",
            Scope::PlaylistModifyPrivate => "playlist-modify-private",
            Scope::PlaylistModifyPublic => "playlist-modify-public",
            Scope::UserFollowModify => "user-follow-modify",
            Scope::UserFollowRead => "user-follow-read",
            Scope::UserReadPlaybackPosition => "user-read-playback-position",
            Scope::UserTopRead => "user-top-read",
            Scope::UserReadRecentlyPlayed => "user-read-recently-played",
            Scope::UserLibraryModify => "user-library-modify",
            Scope::UserLibraryRead => "user-library-read",
            Scope::UserReadEmail => "user-read-email",
            Scope::UserReadPrivate => "user-read-private",
        }
    }

    /// Parses a space separated scope string, e.g. from the environment.
    pub fn parse_set(value: &str) -> Result<BTreeSet<Scope>> {
        value.split_whitespace().map(str::parse).collect()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scope::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown scope '{s}'")))
    }
}

/// Immutable description of one OAuth client and the flow it runs.
#[derive(Clone)]
pub struct AuthConfig {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: Option<Url>,
    scopes: BTreeSet<Scope>,
    show_dialog: bool,
    authorization_endpoint: Url,
    token_endpoint: Url,
}

impl AuthConfig {
    /// PKCE flow: no client secret.
    pub fn pkce(
        client_id: impl Into<String>,
        redirect_uri: &str,
        scopes: impl IntoIterator<Item = Scope>,
    ) -> Result<Self> {
        Self::build(client_id.into(), None, Some(redirect_uri), scopes)
    }

    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: &str,
        scopes: impl IntoIterator<Item = Scope>,
    ) -> Result<Self> {
        Self::build(
            client_id.into(),
            Some(client_secret.into()),
            Some(redirect_uri),
            scopes,
        )
    }

    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::build(client_id.into(), Some(client_secret.into()), None, [])
    }

    fn build(
        client_id: String,
        client_secret: Option<String>,
        redirect_uri: Option<&str>,
        scopes: impl IntoIterator<Item = Scope>,
    ) -> Result<Self> {
        if client_id.is_empty() {
            return Err(Error::Config("client id must not be empty".to_string()));
        }

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri: redirect_uri.map(Url::parse).transpose()?,
            scopes: scopes.into_iter().collect(),
            show_dialog: false,
            authorization_endpoint: Url::parse(SPOTIFY_AUTHORIZE_URL)?,
            token_endpoint: Url::parse(SPOTIFY_TOKEN_URL)?,
        })
    }

    /// Forces the consent dialog even when the user already approved the app.
    pub fn with_show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = show_dialog;
        self
    }

    /// Points the flow at other accounts endpoints (tests, proxies).
    pub fn with_endpoints(mut self, authorization_endpoint: &str, token_endpoint: &str) -> Result<Self> {
        self.authorization_endpoint = Url::parse(authorization_endpoint)?;
        self.token_endpoint = Url::parse(token_endpoint)?;
        Ok(self)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> Option<&Url> {
        self.redirect_uri.as_ref()
    }

    pub fn scopes(&self) -> &BTreeSet<Scope> {
        &self.scopes
    }

    pub fn scope_string(&self) -> String {
        self.scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn show_dialog(&self) -> bool {
        self.show_dialog
    }

    pub fn authorization_endpoint(&self) -> &Url {
        &self.authorization_endpoint
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("show_dialog", &self.show_dialog)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .finish()
    }
}
