//! HTTP request handlers for the toolgate REST adapter
//!
//! One handler per tool plus health and the OpenAPI document. Tool
//! handlers accept arguments from the query string, a JSON object
//! body, or both; body values win on conflicting keys.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

use crate::core::auth::parse_bearer;
use crate::core::error::GatewayError;
use crate::core::services::Services;
use crate::core::tools;
use crate::core::types::{HealthResponse, ToolOutput};
use crate::http::openapi::openapi_document;

type QueryArgs = Result<Query<HashMap<String, String>>, QueryRejection>;
type ToolResponse = Result<Json<ToolOutput>, GatewayError>;

/// Health check handler
///
/// Returns server status and version information. Never gated.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// OpenAPI 3.1 document generated from the registered tools
pub async fn openapi_handler(State(services): State<Arc<Services>>) -> impl IntoResponse {
    Json(openapi_document(&services.gateway))
}

/// Merge query-string and body arguments into one raw argument map
fn collect_args(query: QueryArgs, body: &[u8]) -> Result<Map<String, Value>, GatewayError> {
    let Query(query) = query
        .map_err(|e| GatewayError::Validation(format!("Invalid query string: {}", e.body_text())))?;

    let mut args: Map<String, Value> = query
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(args);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => args.extend(fields),
        Ok(_) => {
            return Err(GatewayError::Validation(
                "Request body must be a JSON object".to_string(),
            ))
        }
        Err(e) => {
            return Err(GatewayError::Validation(format!(
                "Request body is not valid JSON: {e}"
            )))
        }
    }

    Ok(args)
}

/// Run one tool with the caller's credential and arguments
async fn call_tool(
    services: &Services,
    tool: &str,
    headers: &HeaderMap,
    query: QueryArgs,
    body: &[u8],
) -> ToolResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let presented = parse_bearer(authorization);

    // Guard runs before the payload is parsed
    services.gateway.authorize(presented)?;

    let args = collect_args(query, body)?;
    let output = services.gateway.invoke(tool, presented, &args).await?;
    Ok(Json(output))
}

/// Help text for one calculator function
pub async fn calc_help_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::CALC_HELP, &headers, query, &body).await
}

/// Allowed calculator functions
pub async fn calc_list_allowed_fns_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::CALC_LIST_ALLOWED_FNS, &headers, query, &body).await
}

/// Evaluate an expression
pub async fn calc_evaluate_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::CALC_EVALUATE, &headers, query, &body).await
}

/// Google web search
pub async fn web_search_google_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::WEB_SEARCH_GOOGLE, &headers, query, &body).await
}

/// SearXNG web search; 503 when no instance is configured
pub async fn web_search_searxng_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::WEB_SEARCH_SEARXNG, &headers, query, &body).await
}

/// Webpage text extraction
pub async fn web_fetch_webpage_handler(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    query: QueryArgs,
    body: Bytes,
) -> ToolResponse {
    call_tool(&services, tools::WEB_FETCH_WEBPAGE, &headers, query, &body).await
}
