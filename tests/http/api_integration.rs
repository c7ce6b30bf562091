//! Integration tests for the toolgate REST API
//!
//! Drives the full router (middleware included) with tower's
//! `oneshot` over mock providers.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use toolgate::core::config::Config;
use toolgate::core::types::{ErrorResponse, HealthResponse};
use toolgate::http;
use tower::ServiceExt as TowerServiceExt;

use crate::common::{create_test_services_with, TestProviders};

/// Create a test application over mock providers
fn create_test_app(config: Config) -> (Router, TestProviders) {
    let (services, mocks) = create_test_services_with(config);
    (http::router(services), mocks)
}

fn authed_config(token: &str) -> Config {
    let mut config = Config::default();
    config.auth.bearer_token = Some(token.to_string());
    config
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app(authed_config("tok"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_is_ungated() {
    let (app, _) = create_test_app(authed_config("tok"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/calc-evaluate"]["post"].is_object());
}

#[tokio::test]
async fn test_evaluate_json_body() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json(
            "/calc-evaluate",
            json!({"expression": "26 * 9 / 5 + 32"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(78.8));
}

#[tokio::test]
async fn test_evaluate_query_string() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calc-evaluate?expression=2%20**%2010")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(1024));
}

#[tokio::test]
async fn test_empty_expression_is_400() {
    let (app, mocks) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json("/calc-evaluate", json!({"expression": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(err.kind, "ValidationError");
    assert!(err.detail.starts_with("expression"));
    assert_eq!(mocks.calculator.calls(), 0);
}

#[tokio::test]
async fn test_unknown_function_help_is_400() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json("/calc-help", json!({"fn_name": "open"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err = body_json(response).await;
    assert_eq!(err["kind"], "ProviderError");
}

#[tokio::test]
async fn test_list_allowed_fns_get() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/calc-list_allowed_fns?with_help=false")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert!(list.as_str().unwrap().contains("sqrt"));
}

#[tokio::test]
async fn test_missing_token_is_401_with_challenge() {
    let (app, mocks) = create_test_app(authed_config("tok"));

    let response = app
        .oneshot(post_json("/calc-evaluate", json!({"expression": "1"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let err = body_json(response).await;
    assert_eq!(err["detail"], "Invalid or missing authentication token");
    assert_eq!(mocks.calculator.calls(), 0);
}

#[tokio::test]
async fn test_wrong_token_is_401() {
    let (app, _) = create_test_app(authed_config("tok"));

    let mut request = post_json("/calc-evaluate", json!({"expression": "1"}));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer TOK".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_is_accepted() {
    let (app, _) = create_test_app(authed_config("tok"));

    let mut request = post_json("/calc-evaluate", json!({"expression": "1 < 2"}));
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "bearer tok".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(true));
}

#[tokio::test]
async fn test_google_search_results() {
    let (app, mocks) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json(
            "/web-search_google",
            json!({"query": "rust", "number_results": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);
    for r in results {
        assert_eq!(r["content"], r["excerpt"]);
    }
    assert_eq!(mocks.google.calls(), 1);
}

#[tokio::test]
async fn test_google_number_results_21_is_400() {
    let (app, mocks) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json(
            "/web-search_google",
            json!({"query": "rust", "number_results": 21}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mocks.google.calls(), 0);
}

#[tokio::test]
async fn test_searxng_unconfigured_is_503() {
    let (app, mocks) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json("/web-search_searxng", json!({"query": "rust"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let err = body_json(response).await;
    assert_eq!(err["kind"], "ServiceUnavailable");
    assert!(err["detail"].as_str().unwrap().contains("SEARXNG_BASE_URL"));
    assert_eq!(mocks.searxng.calls(), 0);
}

#[tokio::test]
async fn test_searxng_configured() {
    let mut config = Config::default();
    config.search.searxng_base_url = Some("http://searx.local".to_string());
    let (app, mocks) = create_test_app(config);

    let response = app
        .oneshot(post_json("/web-search_searxng", json!({"query": "rust"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);
    assert_eq!(mocks.searxng.calls(), 1);
}

#[tokio::test]
async fn test_fetch_webpage() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json(
            "/web-fetch_webpage",
            json!({"url": "https://example.com/article"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!("Content of https://example.com/article")
    );
}

#[tokio::test]
async fn test_non_object_body_is_400() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json("/calc-evaluate", json!(["1 + 1"])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = create_test_app(Config::default());

    let response = app
        .oneshot(post_json("/calc-exec", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
