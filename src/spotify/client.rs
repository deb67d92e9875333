use std::{future::Future, sync::Arc};

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    Error, Result,
    spotify::{
        auth::Authenticator,
        capability::{AppOnly, Capability, UserAuthorized, UserScoped},
        http::{
            CancelToken, HttpRequest, HttpResponse, Interceptor, ReqwestTransport, RequestExecutor,
            RetryConfig, Transport,
        },
    },
    types::{Page, UserProfile},
};

pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1/";

/// Client acting for a user (authorization code or PKCE).
pub type UserClient = SpotifyClient<UserAuthorized>;
/// Client acting for the application only (client credentials).
pub type AppClient = SpotifyClient<AppOnly>;

/// Upper bound for [`collect_pages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCap {
    Unlimited,
    Items(usize),
    Pages(usize),
}

/// Entry point for resource services: authorization, interceptors and retry
/// handling applied to every request.
///
/// The capability parameter comes from the authenticator the client is built
/// with, so user-scoped helpers only exist on clients holding user tokens.
pub struct SpotifyClient<C: Capability> {
    authenticator: Arc<dyn Authenticator<Capability = C>>,
    executor: RequestExecutor,
    api_base: Url,
}

impl<C: Capability> SpotifyClient<C> {
    pub fn new<A>(authenticator: Arc<A>) -> Result<Self>
    where
        A: Authenticator<Capability = C> + 'static,
    {
        Self::builder(authenticator).build()
    }

    pub fn builder<A>(authenticator: Arc<A>) -> SpotifyClientBuilder<C>
    where
        A: Authenticator<Capability = C> + 'static,
    {
        let authenticator: Arc<dyn Authenticator<Capability = C>> = authenticator;
        SpotifyClientBuilder {
            authenticator,
            transport: None,
            retry: RetryConfig::default(),
            api_base: SPOTIFY_API_URL.to_string(),
        }
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator<Capability = C>> {
        &self.authenticator
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.executor.retry_config()
    }

    /// Resolves `path` against the API base. Absolute URLs (e.g. `next`
    /// links) pass through unchanged.
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("https://") || path.starts_with("http://") {
            return Ok(Url::parse(path)?);
        }
        Ok(self.api_base.join(path.trim_start_matches('/'))?)
    }

    pub async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.executor
            .perform(self.authenticator.as_ref(), request)
            .await
    }

    pub async fn perform_cancellable(
        &self,
        request: HttpRequest,
        cancel: &CancelToken,
    ) -> Result<HttpResponse> {
        self.executor
            .perform_cancellable(self.authenticator.as_ref(), request, cancel)
            .await
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = HttpRequest::get(self.url(path)?);
        self.perform(request).await?.json()
    }

    pub async fn add_interceptor(&self, interceptor: impl Interceptor + 'static) {
        self.executor.add_interceptor(Arc::new(interceptor)).await;
    }

    pub async fn remove_all_interceptors(&self) {
        self.executor.remove_all_interceptors().await;
    }

    pub async fn interceptor_count(&self) -> usize {
        self.executor.interceptor_count().await
    }

    /// Fetches `path` and every page behind its `next` links.
    pub async fn all_pages<T: DeserializeOwned>(&self, path: &str, cap: PageCap) -> Result<Vec<T>> {
        let first = self.url(path)?;
        collect_pages(cap, |next| {
            let url = match next {
                Some(next) => Url::parse(&next).map_err(Error::from),
                None => Ok(first.clone()),
            };
            async move {
                let response = self.perform(HttpRequest::get(url?)).await?;
                response.json::<Page<T>>()
            }
        })
        .await
    }
}

impl<C: UserScoped> SpotifyClient<C> {
    /// Profile of the user who authorized the client.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.get_json("me").await
    }
}

/// Calls `fetch` with the previous page's `next` link (None for the first
/// page) until a page has no `next` or `cap` is reached. A zero cap fetches
/// nothing.
pub async fn collect_pages<T, F, Fut>(cap: PageCap, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    if matches!(cap, PageCap::Items(0) | PageCap::Pages(0)) {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut next: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(next.take()).await?;
        pages += 1;
        items.extend(page.items);

        match cap {
            PageCap::Items(max) if items.len() >= max => {
                items.truncate(max);
                break;
            }
            PageCap::Pages(max) if pages >= max => break,
            _ => {}
        }

        match page.next {
            Some(url) => next = Some(url),
            None => break,
        }
    }

    Ok(items)
}

pub struct SpotifyClientBuilder<C: Capability> {
    authenticator: Arc<dyn Authenticator<Capability = C>>,
    transport: Option<Arc<dyn Transport>>,
    retry: RetryConfig,
    api_base: String,
}

impl<C: Capability> SpotifyClientBuilder<C> {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn build(self) -> Result<SpotifyClient<C>> {
        let mut base = self.api_base;
        if !base.ends_with('/') {
            base.push('/');
        }
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()) as Arc<dyn Transport>);

        Ok(SpotifyClient {
            authenticator: self.authenticator,
            executor: RequestExecutor::new(transport, self.retry),
            api_base: Url::parse(&base)?,
        })
    }
}
