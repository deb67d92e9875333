#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{StatusCode, header::HeaderValue};
use serde_json::{Value, json};
use sporl::{
    Error, Result,
    spotify::{
        auth::TokenProvider,
        http::{HttpRequest, HttpResponse, Transport, TransportError},
    },
    types::Tokens,
};

type Reply = std::result::Result<HttpResponse, TransportError>;

/// Transport that answers from a queue and records every request it saw.
/// An empty queue answers with a permanent transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    /// Every reply is held back for `delay` first.
    pub fn slow(replies: Vec<Reply>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Reply {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Err(TransportError::Other("script exhausted".to_string())))
    }
}

pub fn response(status: u16, body: &str) -> Reply {
    Ok(HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        body.as_bytes().to_vec(),
    ))
}

pub fn json_response(status: u16, body: Value) -> Reply {
    response(status, &body.to_string())
}

pub fn rate_limited(retry_after: Option<&str>) -> Reply {
    let mut reply = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, Vec::new());
    if let Some(value) = retry_after {
        reply
            .headers
            .insert("retry-after", HeaderValue::from_str(value).unwrap());
    }
    Ok(reply)
}

/// Token endpoint answer; `refresh_token` is left out when `None`.
pub fn token_reply(access_token: &str, refresh_token: Option<&str>) -> Reply {
    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-private user-read-email",
    });
    if let Some(refresh) = refresh_token {
        body["refresh_token"] = json!(refresh);
    }
    json_response(200, body)
}

pub fn valid_tokens(access_token: &str, refresh_token: Option<&str>) -> Tokens {
    Tokens {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Utc::now() + chrono::Duration::hours(1),
        scope: Some("user-read-private".to_string()),
        token_type: "Bearer".to_string(),
    }
}

pub fn expired_tokens(access_token: &str, refresh_token: Option<&str>) -> Tokens {
    Tokens {
        expires_at: Utc::now() - chrono::Duration::minutes(5),
        ..valid_tokens(access_token, refresh_token)
    }
}

pub fn form_fields(request: &HttpRequest) -> HashMap<String, String> {
    let body = request.body.as_deref().unwrap_or_default();
    url::form_urlencoded::parse(body).into_owned().collect()
}

pub fn query_params(url: &str) -> HashMap<String, String> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

pub fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Token provider handing out a fixed token and counting reauthorizations.
/// After a reauthorization it hands out `<token>-renewed`.
pub struct StaticTokenProvider {
    token: String,
    reauthorized: AtomicUsize,
    issued: AtomicUsize,
    rejected: Mutex<Vec<String>>,
    fail_reauthorize: bool,
    delay: Duration,
}

impl StaticTokenProvider {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            reauthorized: AtomicUsize::new(0),
            issued: AtomicUsize::new(0),
            rejected: Mutex::new(Vec::new()),
            fail_reauthorize: false,
            delay: Duration::ZERO,
        }
    }

    /// Takes `delay` to hand out each token, like a refresh in flight.
    pub fn slow(token: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(token)
        }
    }

    /// Tokens passed to `reauthorize`, oldest first.
    pub fn rejected_tokens(&self) -> Vec<String> {
        self.rejected.lock().unwrap().clone()
    }

    /// Tokens handed out after their delay elapsed.
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn failing_reauthorize(token: &str) -> Self {
        Self {
            fail_reauthorize: true,
            ..Self::new(token)
        }
    }

    pub fn reauthorize_count(&self) -> usize {
        self.reauthorized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.issued.fetch_add(1, Ordering::SeqCst);
        if self.reauthorize_count() > 0 {
            Ok(format!("{}-renewed", self.token))
        } else {
            Ok(self.token.clone())
        }
    }

    async fn reauthorize(&self, rejected: &str) -> Result<()> {
        self.rejected.lock().unwrap().push(rejected.to_string());
        if self.fail_reauthorize {
            return Err(Error::MissingRefreshToken);
        }
        self.reauthorized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
