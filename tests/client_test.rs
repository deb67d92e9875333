mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use sporl::{
    Error,
    management::MemoryTokenStore,
    spotify::{
        auth::{AuthConfig, ClientCredentialsAuthenticator, PkceAuthenticator, Scope},
        client::{AppClient, PageCap, SpotifyClient, UserClient, collect_pages},
        http::{HttpRequest, RetryConfig, interceptor_fn},
    },
    types::Page,
};

use common::{ScriptedTransport, header, json_response, valid_tokens};

const API: &str = "https://api.example/v1";

fn app_client(transport: Arc<ScriptedTransport>) -> AppClient {
    let config = AuthConfig::client_credentials("cid", "csec").unwrap();
    let store = Arc::new(MemoryTokenStore::with_tokens(valid_tokens("APP", None)));
    let auth = Arc::new(ClientCredentialsAuthenticator::with_transport(
        config,
        store,
        ScriptedTransport::new(vec![]),
    ));

    SpotifyClient::builder(auth)
        .transport(transport)
        .api_base(API)
        .build()
        .unwrap()
}

fn user_client(transport: Arc<ScriptedTransport>) -> UserClient {
    let config = AuthConfig::pkce("cid", "https://app/cb", [Scope::UserReadPrivate]).unwrap();
    let store = Arc::new(MemoryTokenStore::with_tokens(valid_tokens("USER", Some("RT"))));
    let auth = Arc::new(PkceAuthenticator::with_transport(
        config,
        store,
        ScriptedTransport::new(vec![]),
    ));

    SpotifyClient::builder(auth)
        .transport(transport)
        .api_base(API)
        .build()
        .unwrap()
}

fn page(items: Vec<u32>, next: Option<&str>) -> Page<u32> {
    Page {
        items,
        next: next.map(str::to_string),
        total: None,
        limit: None,
        offset: None,
        cursors: None,
    }
}

#[test]
fn test_url_resolution() {
    let client = app_client(ScriptedTransport::new(vec![]));

    assert_eq!(client.api_base().as_str(), "https://api.example/v1/");
    assert_eq!(
        client.url("albums/1").unwrap().as_str(),
        "https://api.example/v1/albums/1"
    );
    assert_eq!(
        client.url("/me/playlists").unwrap().as_str(),
        "https://api.example/v1/me/playlists"
    );
    assert_eq!(
        client.url("https://other.example/next?offset=20").unwrap().as_str(),
        "https://other.example/next?offset=20"
    );
}

#[tokio::test]
async fn test_get_json_with_app_token() {
    let transport = ScriptedTransport::new(vec![json_response(200, json!({"name": "Album"}))]);
    let client = app_client(transport.clone());

    let album: Value = client.get_json("albums/1").await.unwrap();

    assert_eq!(album["name"], "Album");
    let request = &transport.requests()[0];
    assert_eq!(request.url.as_str(), "https://api.example/v1/albums/1");
    assert_eq!(header(request, "authorization"), Some("Bearer APP"));
}

#[tokio::test]
async fn test_current_user_with_user_token() {
    let transport = ScriptedTransport::new(vec![json_response(
        200,
        json!({"id": "wizzler", "display_name": "Wizzler", "product": "premium"}),
    )]);
    let client = user_client(transport.clone());

    let profile = client.current_user().await.unwrap();

    assert_eq!(profile.id, "wizzler");
    assert_eq!(profile.display_name.as_deref(), Some("Wizzler"));
    assert_eq!(profile.email, None);
    assert_eq!(header(&transport.requests()[0], "authorization"), Some("Bearer USER"));
}

#[tokio::test]
async fn test_client_interceptors() {
    let transport = ScriptedTransport::new(vec![json_response(200, json!({}))]);
    let client = app_client(transport.clone());

    client
        .add_interceptor(interceptor_fn(|req: HttpRequest| Ok(req.query("market", "DE"))))
        .await;
    assert_eq!(client.interceptor_count().await, 1);

    let _: Value = client.get_json("albums/1").await.unwrap();
    assert_eq!(
        transport.requests()[0].url.as_str(),
        "https://api.example/v1/albums/1?market=DE"
    );

    client.remove_all_interceptors().await;
    assert_eq!(client.interceptor_count().await, 0);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let transport = ScriptedTransport::new(vec![common::response(200, "not json")]);
    let client = app_client(transport);

    let err = client.get_json::<Value>("albums/1").await.unwrap_err();
    assert!(matches!(err, Error::InvalidJson(_)));
}

#[tokio::test]
async fn test_all_pages_follows_next_links() {
    let transport = ScriptedTransport::new(vec![
        json_response(
            200,
            json!({"items": [1, 2], "next": "https://api.example/v1/me/tracks?offset=2", "total": 5}),
        ),
        json_response(
            200,
            json!({"items": [3, 4], "next": "https://api.example/v1/me/tracks?offset=4", "total": 5}),
        ),
        json_response(200, json!({"items": [5], "next": null, "total": 5})),
    ]);
    let client = user_client(transport.clone());

    let items: Vec<u32> = client.all_pages("me/tracks", PageCap::Unlimited).await.unwrap();

    assert_eq!(items, vec![1, 2, 3, 4, 5]);
    let urls: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.url.to_string())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://api.example/v1/me/tracks",
            "https://api.example/v1/me/tracks?offset=2",
            "https://api.example/v1/me/tracks?offset=4",
        ]
    );
}

#[tokio::test]
async fn test_all_pages_stops_at_item_cap() {
    let transport = ScriptedTransport::new(vec![
        json_response(200, json!({"items": [1, 2], "next": "https://api.example/v1/x?offset=2"})),
        json_response(200, json!({"items": [3, 4], "next": "https://api.example/v1/x?offset=4"})),
        json_response(200, json!({"items": [5], "next": null})),
    ]);
    let client = app_client(transport.clone());

    let items: Vec<u32> = client.all_pages("x", PageCap::Items(3)).await.unwrap();

    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_collect_pages_page_cap() {
    let mut calls = Vec::new();

    let items = collect_pages(PageCap::Pages(2), |next| {
        calls.push(next.clone());
        let n = calls.len() as u32;
        async move { Ok(page(vec![n], Some("https://api.example/v1/next"))) }
    })
    .await
    .unwrap();

    assert_eq!(items, vec![1, 2]);
    assert_eq!(
        calls,
        vec![None, Some("https://api.example/v1/next".to_string())]
    );
}

#[tokio::test]
async fn test_collect_pages_zero_cap_fetches_nothing() {
    for cap in [PageCap::Items(0), PageCap::Pages(0)] {
        let mut calls = 0;

        let items = collect_pages::<u32, _, _>(cap, |_next| {
            calls += 1;
            async move { Ok(page(vec![1], None)) }
        })
        .await
        .unwrap();

        assert!(items.is_empty(), "{cap:?}");
        assert_eq!(calls, 0, "{cap:?}");
    }
}

#[tokio::test]
async fn test_collect_pages_propagates_errors() {
    let mut calls = 0;

    let err = collect_pages::<u32, _, _>(PageCap::Unlimited, |_next| {
        calls += 1;
        let attempt = calls;
        async move {
            if attempt == 1 {
                Ok(page(vec![1], Some("https://api.example/v1/next")))
            } else {
                Err(Error::Http {
                    status: 404,
                    body: "gone".to_string(),
                })
            }
        }
    })
    .await
    .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn test_builder_keeps_retry_config() {
    let config = AuthConfig::client_credentials("cid", "csec").unwrap();
    let auth = Arc::new(ClientCredentialsAuthenticator::new(config));
    let retry = RetryConfig {
        max_rate_limit_retries: 7,
        ..RetryConfig::default()
    };

    let client: AppClient = SpotifyClient::builder(auth)
        .retry_config(retry)
        .build()
        .unwrap();

    assert_eq!(client.retry_config().max_rate_limit_retries, 7);
    assert_eq!(client.api_base().as_str(), "https://api.spotify.com/v1/");
}
