//! HTTP transport tests for the MCP adapter

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use futures::StreamExt;
    use serde_json::{json, Value};
    use toolgate::mcp::http::{
        sse_router_with_state, streamable_router, SseState, SESSION_ID_HEADER,
    };
    use tower::ServiceExt as TowerServiceExt;

    use crate::common::create_test_services;

    fn post(uri: &str, body: Value) -> Request<Body> {
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
    async fn test_streamable_initialize_issues_session_id() {
        let (services, _) = create_test_services();
        let app = streamable_router(services);

        let response = app
            .oneshot(post(
                "/mcp",
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "initialize",
                    "params": {"protocolVersion": "2025-06-18"}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SESSION_ID_HEADER));
        let body = body_json(response).await;
        assert_eq!(body["result"]["protocolVersion"], "2025-06-18");
    }

    #[tokio::test]
    async fn test_streamable_notification_is_accepted() {
        let (services, _) = create_test_services();
        let app = streamable_router(services);

        let response = app
            .oneshot(post(
                "/mcp",
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_streamable_tools_call_uses_header_token() {
        let mut config = toolgate::Config::default();
        config.auth.bearer_token = Some("secret".to_string());
        let (services, _) = crate::common::create_test_services_with(config);
        let app = streamable_router(services);

        let body = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "calc-evaluate", "arguments": {"expression": "6 * 7"}}
        });

        let response = app.clone().oneshot(post("/mcp", body.clone())).await.unwrap();
        let denied = body_json(response).await;
        assert_eq!(denied["result"]["isError"], true);

        let mut request = post("/mcp", body);
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, "Bearer secret".parse().unwrap());
        let response = app.oneshot(request).await.unwrap();
        let allowed = body_json(response).await;
        assert_eq!(allowed["result"]["structuredContent"]["result"], 42);
    }

    #[tokio::test]
    async fn test_streamable_get_not_allowed() {
        let (services, _) = create_test_services();
        let app = streamable_router(services);

        let response = app
            .oneshot(Request::builder().uri("/mcp").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_sse_message_requires_known_session() {
        let (services, _) = create_test_services();
        let app = sse_router_with_state(SseState::new(services));
        let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

        let response = app.clone().oneshot(post("/messages/", ping.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post("/messages/?session_id=missing", ping))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sse_round_trip() {
        let (services, _) = create_test_services();
        let state = SseState::new(services);
        let app = sse_router_with_state(state.clone());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.session_count().await, 1);

        let mut stream = response.into_body().into_data_stream();
        let first = stream.next().await.unwrap().unwrap();
        let first = String::from_utf8(first.to_vec()).unwrap();
        assert!(first.contains("event: endpoint"));

        let endpoint = first
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .unwrap()
            .to_string();
        assert!(endpoint.starts_with("/messages/?session_id="));

        let response = app
            .oneshot(post(
                &endpoint,
                json!({
                    "jsonrpc": "2.0",
                    "id": 7,
                    "method": "tools/call",
                    "params": {"name": "calc-evaluate", "arguments": {"expression": "2 ** 8"}}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let event = stream.next().await.unwrap().unwrap();
        let event = String::from_utf8(event.to_vec()).unwrap();
        assert!(event.contains("event: message"));

        let data = event
            .lines()
            .find_map(|l| l.strip_prefix("data: "))
            .unwrap();
        let message: Value = serde_json::from_str(data).unwrap();
        assert_eq!(message["id"], 7);
        assert_eq!(message["result"]["structuredContent"]["result"], 256);
    }
}
