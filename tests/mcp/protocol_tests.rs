//! MCP protocol unit tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toolgate::mcp::protocol::*;

    #[test]
    fn test_parse_initialize_request() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {"tools": {}},
                "clientInfo": {
                    "name": "test",
                    "version": "1.0"
                }
            }
        }"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "initialize");
        assert!(!req.is_notification());

        let params: InitializeParams = serde_json::from_value(req.params.unwrap()).unwrap();
        assert_eq!(params.protocol_version.as_deref(), Some("2025-03-26"));
        assert_eq!(params.client_info.unwrap().name, "test");
    }

    #[test]
    fn test_parse_notification() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_notification());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_parse_tools_call_with_meta() {
        let json = r#"{
            "name": "web-search_google",
            "arguments": {"query": "rust", "number_results": 3},
            "_meta": {"authorization": "Bearer secret"}
        }"#;

        let params: ToolCallParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.name, "web-search_google");
        assert_eq!(params.arguments.unwrap()["number_results"], 3);
        assert_eq!(
            params.meta.unwrap().authorization.as_deref(),
            Some("Bearer secret")
        );
    }

    #[test]
    fn test_parse_tools_call_without_arguments() {
        let params: ToolCallParams =
            serde_json::from_value(json!({"name": "calc-list_allowed_fns"})).unwrap();
        assert!(params.arguments.is_none());
        assert!(params.meta.is_none());
    }

    #[test]
    fn test_json_rpc_response_success() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"status": "ok"}));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_json_rpc_response_with_error() {
        let response =
            JsonRpcResponse::error(Some(json!("abc")), INVALID_PARAMS, "Unknown tool: x");

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":-32602"));
        assert!(json.contains("\"id\":\"abc\""));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_initialize_result_serialization() {
        let result = InitializeResult {
            protocol_version: negotiate_version(Some("2024-11-05")).to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: "0.1.0".to_string(),
            },
            instructions: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], "2024-11-05");
        assert_eq!(value["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(value["serverInfo"]["name"], "toolgate");
        assert!(value.get("instructions").is_none());
    }

    #[test]
    fn test_negotiate_version() {
        for version in SUPPORTED_PROTOCOL_VERSIONS {
            assert_eq!(negotiate_version(Some(version)), version);
        }
        assert_eq!(negotiate_version(Some("2030-01-01")), LATEST_PROTOCOL_VERSION);
    }

    #[test]
    fn test_error_tool_result_shape() {
        let result = ToolResult {
            content: vec![ContentBlock::Text {
                text: "Invalid or missing authentication token".to_string(),
            }],
            structured_content: Some(json!({
                "kind": "AuthorizationError",
                "message": "Invalid or missing authentication token"
            })),
            is_error: true,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isError"], true);
        assert_eq!(value["structuredContent"]["kind"], "AuthorizationError");

        let back: ToolResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
