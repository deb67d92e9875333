//! HTTP execution layer.
//!
//! Every resource call goes through [`RequestExecutor`]:
//!
//! ```text
//! interceptors (in order) -> Authorization: Bearer -> Transport::send
//!        ^                                                   |
//!        +---- 429: sleep Retry-After (rate-limit budget) ---+
//!        +---- 5xx / timeout / reset / DNS: backoff --------+
//!        +---- 401: reauthorize once -----------------------+
//! ```

mod cancel;
mod executor;
mod interceptor;
mod retry;
mod transport;

pub use cancel::CancelToken;
pub use executor::RequestExecutor;
pub use interceptor::{FnInterceptor, Interceptor, interceptor_fn};
pub use retry::{BackoffPolicy, NetworkRecovery, RetryConfig};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
