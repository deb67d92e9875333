use async_trait::async_trait;

use super::HttpRequest;
use crate::Result;

/// Rewrites an outgoing request before authorization is attached.
///
/// Interceptors run in registration order on every attempt. An error aborts
/// the call without reaching the transport.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, request: HttpRequest) -> Result<HttpRequest>;
}

/// Adapter turning a synchronous closure into an [`Interceptor`].
pub struct FnInterceptor<F>(F);

pub fn interceptor_fn<F>(f: F) -> FnInterceptor<F>
where
    F: Fn(HttpRequest) -> Result<HttpRequest> + Send + Sync,
{
    FnInterceptor(f)
}

#[async_trait]
impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(HttpRequest) -> Result<HttpRequest> + Send + Sync,
{
    async fn intercept(&self, request: HttpRequest) -> Result<HttpRequest> {
        (self.0)(request)
    }
}
