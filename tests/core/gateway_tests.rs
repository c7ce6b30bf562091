//! Gateway dispatch tests over mock providers

use crate::common::{args, create_test_services, create_test_services_with};
use serde_json::json;
use toolgate::core::config::Config;
use toolgate::core::error::{GatewayError, AUTH_DENIED_REASON};
use toolgate::core::tools::*;
use toolgate::core::types::{EvalValue, ToolOutput};

fn config_with_token(token: &str) -> Config {
    let mut config = Config::default();
    config.auth.bearer_token = Some(token.to_string());
    config
}

#[tokio::test]
async fn test_auth_disabled_allows_absent_credential() {
    let (services, _) = create_test_services();
    let out = services
        .gateway
        .invoke(CALC_EVALUATE, None, &args(json!({"expression": "1 + 1"})))
        .await
        .unwrap();
    assert_eq!(out, ToolOutput::Value(EvalValue::Int(2)));
}

#[tokio::test]
async fn test_auth_enabled_requires_exact_token() {
    let (services, mocks) = create_test_services_with(config_with_token("s3cret"));
    let call = args(json!({"expression": "1 + 1"}));

    for presented in [None, Some("S3CRET"), Some("s3cret "), Some("")] {
        let err = services
            .gateway
            .invoke(CALC_EVALUATE, presented, &call)
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Authorization(AUTH_DENIED_REASON.to_string()));
    }
    assert_eq!(mocks.calculator.calls(), 0);

    assert!(services
        .gateway
        .invoke(CALC_EVALUATE, Some("s3cret"), &call)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_evaluate_celsius_conversion_is_float() {
    let (services, _) = create_test_services();
    let out = services
        .gateway
        .invoke(CALC_EVALUATE, None, &args(json!({"expression": "26 * 9 / 5 + 32"})))
        .await
        .unwrap();
    assert_eq!(out, ToolOutput::Value(EvalValue::Float(78.8)));
    assert_eq!(serde_json::to_value(&out).unwrap(), json!(78.8));
}

#[tokio::test]
async fn test_empty_expression_never_reaches_provider() {
    let (services, mocks) = create_test_services();
    for expression in ["", "   ", "\t\n"] {
        let err = services
            .gateway
            .invoke(CALC_EVALUATE, None, &args(json!({ "expression": expression })))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }
    assert_eq!(mocks.calculator.calls(), 0);
}

#[tokio::test]
async fn test_invalid_expression_is_provider_error() {
    let (services, _) = create_test_services();
    let err = services
        .gateway
        .invoke(CALC_EVALUATE, None, &args(json!({"expression": "1 +"})))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Provider(_)));
    assert_eq!(err.suggested_status(), 400);
}

#[tokio::test]
async fn test_searxng_without_base_url_is_unavailable() {
    let (services, mocks) = create_test_services();
    let err = services
        .gateway
        .invoke(WEB_SEARCH_SEARXNG, None, &args(json!({"query": "rust"})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::ServiceUnavailable(SEARXNG_NOT_CONFIGURED.to_string())
    );
    assert_eq!(mocks.searxng.calls(), 0);
}

#[tokio::test]
async fn test_google_number_results_out_of_range() {
    let (services, mocks) = create_test_services();
    let err = services
        .gateway
        .invoke(
            WEB_SEARCH_GOOGLE,
            None,
            &args(json!({"query": "rust", "number_results": 21})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(msg) if msg.starts_with("number_results")));
    assert_eq!(mocks.google.calls(), 0);
}

#[tokio::test]
async fn test_search_records_mirror_content() {
    let (services, _) = create_test_services();
    let out = services
        .gateway
        .invoke(
            WEB_SEARCH_GOOGLE,
            None,
            &args(json!({"query": "rust", "number_results": "7"})),
        )
        .await
        .unwrap();

    let ToolOutput::Results(records) = out else {
        panic!("expected search results");
    };
    assert_eq!(records.len(), 7);
    assert!(records.iter().all(|r| r.content == r.excerpt));
    assert_eq!(records[0].title, "google result 1");
}

#[tokio::test]
async fn test_help_is_idempotent() {
    let (services, _) = create_test_services();
    let call = args(json!({"fn_name": "hypot"}));
    let first = services.gateway.invoke(CALC_HELP, None, &call).await.unwrap();
    let second = services.gateway.invoke(CALC_HELP, None, &call).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_argument_rejected() {
    let (services, _) = create_test_services();
    let err = services
        .gateway
        .invoke(
            CALC_LIST_ALLOWED_FNS,
            None,
            &args(json!({"with_help": true, "verbose": true})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(msg) if msg.contains("verbose")));
}

#[tokio::test]
async fn test_fetch_failure_carries_provider_message() {
    let (services, mocks) = create_test_services();
    let err = services
        .gateway
        .invoke(
            WEB_FETCH_WEBPAGE,
            None,
            &args(json!({"url": "https://bad.example/page", "timeout": 1.5})),
        )
        .await
        .unwrap_err();
    assert!(matches!(&err, GatewayError::Provider(msg) if msg.contains("500")));
    assert_eq!(mocks.webpage.calls(), 1);
}

#[tokio::test]
async fn test_non_positive_timeout_rejected() {
    let (services, mocks) = create_test_services();
    for timeout in [json!(0), json!(-1.0), json!("soon")] {
        let err = services
            .gateway
            .invoke(
                WEB_FETCH_WEBPAGE,
                None,
                &args(json!({"url": "https://example.com", "timeout": timeout})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }
    assert_eq!(mocks.webpage.calls(), 0);
}
