use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info, warn};

use super::{
    CancelToken, HttpRequest, HttpResponse, Interceptor, RetryConfig, Transport, cancel::guard,
};
use crate::{Error, Result, spotify::auth::TokenProvider, utils};

/// Runs requests through interceptors, authorization and the retry policy.
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    retry: RetryConfig,
    interceptors: RwLock<Vec<Arc<dyn Interceptor>>>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryConfig) -> Self {
        Self {
            transport,
            retry,
            interceptors: RwLock::new(Vec::new()),
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub async fn add_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.write().await.push(interceptor);
    }

    pub async fn remove_all_interceptors(&self) {
        self.interceptors.write().await.clear();
    }

    pub async fn interceptor_count(&self) -> usize {
        self.interceptors.read().await.len()
    }

    pub async fn perform<P>(&self, auth: &P, request: HttpRequest) -> Result<HttpResponse>
    where
        P: TokenProvider + ?Sized,
    {
        self.run(auth, request, None).await
    }

    /// Like [`Self::perform`], but stops at the next wait or send once
    /// `cancel` fires. Token renewal is never interrupted.
    pub async fn perform_cancellable<P>(
        &self,
        auth: &P,
        request: HttpRequest,
        cancel: &CancelToken,
    ) -> Result<HttpResponse>
    where
        P: TokenProvider + ?Sized,
    {
        self.run(auth, request, Some(cancel)).await
    }

    async fn run<P>(
        &self,
        auth: &P,
        request: HttpRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<HttpResponse>
    where
        P: TokenProvider + ?Sized,
    {
        let recovery = &self.retry.network_recovery;
        let mut rate_limit_retries = 0u32;
        let mut network_retries = 0u32;
        let mut reauthorized = false;

        loop {
            check_cancelled(cancel)?;

            let interceptors = self.interceptors.read().await.clone();
            let mut outgoing = request.clone();
            for interceptor in &interceptors {
                outgoing = interceptor.intercept(outgoing).await?;
            }

            // a refresh may rotate the refresh token, so it always completes
            let token = auth.access_token().await?;
            check_cancelled(cancel)?;
            outgoing.bearer(&token)?;

            debug!("{} {}", outgoing.method, outgoing.url);
            let outcome = guard(cancel, self.transport.send(outgoing)).await?;

            let response = match outcome {
                Ok(response) => response,
                Err(err) if err.is_transient() => {
                    network_retries += 1;
                    if network_retries > recovery.max_retries() {
                        return Err(err.into());
                    }
                    let delay = recovery.delay(network_retries);
                    warn!(
                        "Transient failure ({}), retry {}/{} in {:?}",
                        err,
                        network_retries,
                        recovery.max_retries(),
                        delay
                    );
                    guard(cancel, sleep(delay)).await?;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status;
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .header("retry-after")
                    .and_then(utils::parse_retry_after)
                    .map(Duration::from_secs);

                if retry_after.is_some_and(|wait| wait > self.retry.max_retry_after) {
                    warn!(
                        "Retry-After of {:?} exceeds the allowed {:?}",
                        retry_after, self.retry.max_retry_after
                    );
                    return Err(Error::RateLimited { retry_after });
                }

                rate_limit_retries += 1;
                if rate_limit_retries > self.retry.max_rate_limit_retries {
                    return Err(Error::RateLimited { retry_after });
                }

                let wait = retry_after.unwrap_or(self.retry.default_retry_after);
                warn!(
                    "Rate limited, retry {}/{} in {:?}",
                    rate_limit_retries, self.retry.max_rate_limit_retries, wait
                );
                guard(cancel, sleep(wait)).await?;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED && !reauthorized {
                reauthorized = true;
                info!("Access token rejected, reauthorizing");
                auth.reauthorize(&token).await?;
                continue;
            }

            if recovery.retries_status(status) {
                network_retries += 1;
                if network_retries > recovery.max_retries() {
                    return Err(http_error(&response));
                }
                let delay = recovery.delay(network_retries);
                warn!(
                    "Server answered {}, retry {}/{} in {:?}",
                    status,
                    network_retries,
                    recovery.max_retries(),
                    delay
                );
                guard(cancel, sleep(delay)).await?;
                continue;
            }

            return Err(http_error(&response));
        }
    }
}

fn check_cancelled(cancel: Option<&CancelToken>) -> Result<()> {
    if cancel.is_some_and(CancelToken::is_cancelled) {
        return Err(Error::Cancelled);
    }
    Ok(())
}

fn http_error(response: &HttpResponse) -> Error {
    Error::Http {
        status: response.status.as_u16(),
        body: response.text(),
    }
}
