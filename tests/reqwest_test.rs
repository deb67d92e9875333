use std::sync::Arc;

use serde_json::{Value, json};
use sporl::{
    Error,
    management::MemoryTokenStore,
    spotify::{
        auth::{AuthConfig, ClientCredentialsAuthenticator},
        client::{AppClient, SpotifyClient},
        http::{NetworkRecovery, ReqwestTransport, RetryConfig},
    },
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app_client(server: &MockServer, retry: RetryConfig) -> AppClient {
    let config = AuthConfig::client_credentials("cid", "csec")
        .unwrap()
        .with_endpoints(
            &format!("{}/authorize", server.uri()),
            &format!("{}/api/token", server.uri()),
        )
        .unwrap();
    let transport = Arc::new(ReqwestTransport::new());
    let auth = Arc::new(ClientCredentialsAuthenticator::with_transport(
        config,
        Arc::new(MemoryTokenStore::new()),
        transport.clone(),
    ));

    SpotifyClient::builder(auth)
        .transport(transport)
        .api_base(format!("{}/v1", server.uri()))
        .retry_config(retry)
        .build()
        .unwrap()
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", "Basic Y2lkOmNzZWM="))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "APP",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_app_token_and_resource_call_over_http() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/albums/1"))
        .and(header("authorization", "Bearer APP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Album"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = app_client(&server, RetryConfig::default()).await;

    // the second call reuses the cached app token
    for _ in 0..2 {
        let album: Value = client.get_json("albums/1").await.unwrap();
        assert_eq!(album["name"], "Album");
    }
}

#[tokio::test]
async fn test_rate_limit_over_http() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/albums/1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/albums/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Album"})))
        .expect(1)
        .with_priority(2)
        .mount(&server)
        .await;

    let client = app_client(&server, RetryConfig::default()).await;

    let album: Value = client.get_json("albums/1").await.unwrap();
    assert_eq!(album["name"], "Album");
}

#[tokio::test]
async fn test_error_body_is_preserved_over_http() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/albums/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"status": 404, "message": "Non existing id"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client(&server, RetryConfig::default()).await;

    match client.get_json::<Value>("albums/missing").await.unwrap_err() {
        Error::Http { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Non existing id"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transient() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let retry = RetryConfig {
        network_recovery: NetworkRecovery::Disabled,
        ..RetryConfig::default()
    };
    let client = app_client(&server, retry).await;

    // nothing listens on port 1
    let err = client
        .get_json::<Value>("http://127.0.0.1:1/v1/albums/1")
        .await
        .unwrap_err();

    match err {
        Error::Transport(e) => assert!(e.is_transient(), "{e:?}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
