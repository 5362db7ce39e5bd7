use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clearkeeper::adapters::oauth::{OAuthClient, OAuthServer};
use clearkeeper::domain::models::OAuthConfig;
use http_body_util::BodyExt;
use serde_json::json;
use tokio::sync::mpsc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn router(token_server: &MockServer) -> (Router, mpsc::Receiver<String>) {
    let config = OAuthConfig {
        client_id: "12345".to_string(),
        token_url: format!("{}/platform/app/oauth/token/", token_server.uri()),
        ..OAuthConfig::default()
    };
    let (tx, rx) = mpsc::channel(4);
    let server = OAuthServer::new("127.0.0.1:0", OAuthClient::new(&config).unwrap(), tx);
    (server.build_router(), rx)
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let token_server = MockServer::start().await;
    let (router, _rx) = router(&token_server).await;

    let (status, body) = get(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let token_server = MockServer::start().await;
    let (router, mut rx) = router(&token_server).await;

    let (status, _) = get(router, "/auth/callback?state=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_callback_forwards_exchanged_token() {
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/platform/app/oauth/token/"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("client_id=12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "player-token",
            "token_type": "Bearer",
            "expires_in": 3600,
            "membership_id": "99"
        })))
        .expect(1)
        .mount(&token_server)
        .await;
    let (router, mut rx) = router(&token_server).await;

    let (status, body) = get(router, "/auth/callback?code=auth-code&state=abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "You can close this page!");
    assert_eq!(rx.recv().await.as_deref(), Some("player-token"));
}

#[tokio::test]
async fn test_rejected_exchange_is_server_error() {
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/platform/app/oauth/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "AuthorizationCodeInvalid"
        })))
        .mount(&token_server)
        .await;
    let (router, mut rx) = router(&token_server).await;

    let (status, _) = get(router, "/auth/callback?code=stale").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_token_response_without_access_token_is_server_error() {
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/platform/app/oauth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&token_server)
        .await;
    let (router, _rx) = router(&token_server).await;

    let (status, _) = get(router, "/auth/callback?code=auth-code").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
