//! MCP handler unit tests

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use toolgate::core::config::Config;
    use toolgate::core::tools::TOOL_NAMES;
    use toolgate::mcp::handlers::ProtocolHandlers;
    use toolgate::mcp::protocol::*;
    use toolgate::mcp::tools::CallContext;

    use crate::common::{create_test_services, create_test_services_with, TestProviders};

    fn create_test_handlers() -> (ProtocolHandlers, TestProviders) {
        let (services, mocks) = create_test_services();
        (ProtocolHandlers::new(services), mocks)
    }

    fn create_authed_handlers(token: &str) -> (ProtocolHandlers, TestProviders) {
        let mut config = Config::default();
        config.auth.bearer_token = Some(token.to_string());
        let (services, mocks) = create_test_services_with(config);
        (ProtocolHandlers::new(services), mocks)
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(id)),
            method: method.to_string(),
            params,
        }
    }

    fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
        request(
            id,
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
    }

    #[tokio::test]
    async fn test_initialize_handler() {
        let (handlers, _mocks) = create_test_handlers();

        let request = request(
            1,
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "clientInfo": {"name": "test", "version": "1.0"}
            })),
        );

        let response = handlers.handle_initialize(request).await.unwrap();

        assert_eq!(response.jsonrpc, "2.0");
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "toolgate");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_gets_latest() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_initialize(request(1, "initialize", Some(json!({"protocolVersion": "1.0"}))))
            .await
            .unwrap();

        assert_eq!(
            response.result.unwrap()["protocolVersion"],
            LATEST_PROTOCOL_VERSION
        );
    }

    #[tokio::test]
    async fn test_initialized_notification_has_no_response() {
        let (handlers, _mocks) = create_test_handlers();
        assert!(!handlers.is_initialized());

        let raw = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        let response = handlers.handle_message(raw, &CallContext::default()).await;

        assert!(response.is_none());
        assert!(handlers.is_initialized());
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_list(request(2, "tools/list", None))
            .await
            .unwrap();

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, TOOL_NAMES.to_vec());

        for tool in tools {
            assert!(!tool["description"].as_str().unwrap().is_empty());
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_tools_list_schema_bounds() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_list(request(2, "tools/list", None))
            .await
            .unwrap();

        let result = response.result.unwrap();
        let google = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "web-search_google")
            .unwrap()
            .clone();
        let number_results = &google["inputSchema"]["properties"]["number_results"];
        assert_eq!(number_results["minimum"], 1);
        assert_eq!(number_results["maximum"], 20);
        assert_eq!(number_results["default"], 5);
        assert_eq!(google["inputSchema"]["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_tools_call_evaluate() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_call(
                call(3, "calc-evaluate", json!({"expression": "26 * 9 / 5 + 32"})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["result"], 78.8);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "78.8");
    }

    #[tokio::test]
    async fn test_tools_call_search_records() {
        let (handlers, mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_call(
                call(4, "web-search_google", json!({"query": "rust", "number_results": 2})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        let records = result["structuredContent"]["result"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["excerpt"], records[0]["content"]);
        assert_eq!(mocks.google.calls(), 1);
    }

    #[tokio::test]
    async fn test_tools_call_validation_error_is_tool_error() {
        let (handlers, mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_call(
                call(5, "web-search_google", json!({"query": "rust", "number_results": 0})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "ValidationError");
        assert_eq!(mocks.google.calls(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_searxng_unavailable() {
        let (handlers, mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_call(
                call(6, "web-search_searxng", json!({"query": "rust"})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "ServiceUnavailable");
        assert_eq!(mocks.searxng.calls(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_provider_failure() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_tools_call(
                call(7, "web-fetch_webpage", json!({"url": "https://bad.example/x"})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "ProviderError");
    }

    #[tokio::test]
    async fn test_tools_call_requires_token() {
        let (handlers, mocks) = create_authed_handlers("secret");

        let response = handlers
            .handle_tools_call(
                call(8, "calc-evaluate", json!({"expression": "1 + 1"})),
                &CallContext::default(),
            )
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "AuthorizationError");
        assert_eq!(
            result["structuredContent"]["message"],
            "Invalid or missing authentication token"
        );
        assert_eq!(mocks.calculator.calls(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_token_from_meta() {
        let (handlers, _mocks) = create_authed_handlers("secret");

        let request = request(
            9,
            "tools/call",
            Some(json!({
                "name": "calc-evaluate",
                "arguments": {"expression": "1 + 1"},
                "_meta": {"authorization": "Bearer secret"}
            })),
        );

        let response = handlers
            .handle_tools_call(request, &CallContext::default())
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["structuredContent"]["result"], 2);
    }

    #[tokio::test]
    async fn test_tools_call_header_wins_over_meta() {
        let (handlers, _mocks) = create_authed_handlers("secret");
        let ctx = CallContext::with_authorization(Some("Bearer wrong".to_string()));

        let request = request(
            10,
            "tools/call",
            Some(json!({
                "name": "calc-evaluate",
                "arguments": {"expression": "1 + 1"},
                "_meta": {"authorization": "Bearer secret"}
            })),
        );

        let response = handlers.handle_tools_call(request, &ctx).await.unwrap();
        assert_eq!(response.result.unwrap()["isError"], true);

        let ctx = CallContext::with_authorization(Some("Bearer secret".to_string()));
        let response = handlers
            .handle_tools_call(call(11, "calc-evaluate", json!({"expression": "1"})), &ctx)
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["isError"], false);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_request(call(12, "calc-exec", json!({})), &CallContext::default())
            .await
            .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("calc-exec"));
        assert_eq!(response.id, Some(json!(12)));
    }

    #[tokio::test]
    async fn test_unknown_tool_without_token_is_denied() {
        let (handlers, _mocks) = create_authed_handlers("secret");

        let response = handlers
            .handle_request(
                call(16, "calc-exec", json!(["not", "an", "object"])),
                &CallContext::default(),
            )
            .await
            .unwrap();

        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "AuthorizationError");
    }

    #[tokio::test]
    async fn test_unknown_tool_with_token_is_invalid_params() {
        let (handlers, _mocks) = create_authed_handlers("secret");
        let ctx = CallContext::with_authorization(Some("Bearer secret".to_string()));

        let response = handlers
            .handle_request(call(17, "calc-exec", json!({})), &ctx)
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_request(request(13, "resources/list", None), &CallContext::default())
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ping() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_message(
                r#"{"jsonrpc": "2.0", "id": 14, "method": "ping"}"#,
                &CallContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_message("{not json", &CallContext::default())
            .await
            .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_client_response_is_ignored() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_message(
                r#"{"jsonrpc": "2.0", "id": 1, "result": {}}"#,
                &CallContext::default(),
            )
            .await;

        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_arguments_must_be_object() {
        let (handlers, _mocks) = create_test_handlers();

        let response = handlers
            .handle_request(
                call(15, "calc-evaluate", json!(["1 + 1"])),
                &CallContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }
}
