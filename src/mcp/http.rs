//! MCP over HTTP: streamable-HTTP and SSE transports
//!
//! Streamable HTTP answers each `POST /mcp` with a single JSON body.
//! SSE keeps one event stream per client (`GET /sse`) and delivers the
//! responses to messages posted at `/messages/?session_id=<id>`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::services::Services;
use crate::http::{health_handler, middleware::log_request};
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::protocol::JsonRpcResponse;
use crate::mcp::tools::CallContext;

pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Buffered events per SSE session before senders wait
const SSE_CHANNEL_CAPACITY: usize = 32;

fn call_context(headers: &HeaderMap) -> CallContext {
    CallContext::with_authorization(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    )
}

// ---------------------------------------------------------------------
// Streamable HTTP
// ---------------------------------------------------------------------

/// Router for the streamable-HTTP transport
pub fn streamable_router(services: Arc<Services>) -> Router {
    let handlers = Arc::new(ProtocolHandlers::new(services));

    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp", post(streamable_post).get(streamable_get))
        .route("/mcp/", post(streamable_post).get(streamable_get))
        .layer(axum_middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(handlers)
}

async fn streamable_post(
    State(handlers): State<Arc<ProtocolHandlers>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = call_context(&headers);
    let raw = String::from_utf8_lossy(&body);

    let is_initialize = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("method").and_then(|m| m.as_str()).map(|m| m == "initialize"))
        .unwrap_or(false);

    match handlers.handle_message(&raw, &ctx).await {
        None => StatusCode::ACCEPTED.into_response(),
        Some(response) => {
            let mut http_response = Json(response).into_response();
            if is_initialize {
                let session_id = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&session_id) {
                    http_response
                        .headers_mut()
                        .insert(HeaderName::from_static(SESSION_ID_HEADER), value);
                }
                debug!(session_id = %session_id, "Issued MCP session id");
            }
            http_response
        }
    }
}

/// Server-initiated streams are not offered on this endpoint
async fn streamable_get() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method Not Allowed",
    )
}

// ---------------------------------------------------------------------
// SSE
// ---------------------------------------------------------------------

type SessionMap = Arc<RwLock<HashMap<String, mpsc::Sender<Event>>>>;

/// Shared state of the SSE transport
#[derive(Clone)]
pub struct SseState {
    handlers: Arc<ProtocolHandlers>,
    sessions: SessionMap,
}

impl SseState {
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            handlers: Arc::new(ProtocolHandlers::new(services)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Router for the SSE transport
pub fn sse_router(services: Arc<Services>) -> Router {
    sse_router_with_state(SseState::new(services))
}

pub fn sse_router_with_state(state: SseState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sse", get(sse_connect))
        .route("/messages", post(sse_message))
        .route("/messages/", post(sse_message))
        .layer(axum_middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Removes its session from the map when the event stream is dropped
struct SessionGuard {
    id: String,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let id = std::mem::take(&mut self.id);
        let sessions = Arc::clone(&self.sessions);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                sessions.write().await.remove(&id);
                debug!(session_id = %id, "SSE session closed");
            });
        }
    }
}

async fn sse_connect(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel(SSE_CHANNEL_CAPACITY);
    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), tx);
    info!(session_id = %session_id, "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages/?session_id={session_id}"));

    let guard = SessionGuard {
        id: session_id,
        sessions: Arc::clone(&state.sessions),
    };

    let events = stream::once(async move { endpoint })
        .chain(ReceiverStream::new(rx))
        .map(move |event| {
            let _ = &guard;
            Ok(event)
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    session_id: Option<String>,
}

async fn sse_message(
    State(state): State<SseState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "session_id is required").into_response();
    };

    let sender = state.sessions.read().await.get(&session_id).cloned();
    let Some(sender) = sender else {
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Could not parse message: {e}"))
                .into_response()
        }
    };

    let ctx = call_context(&headers);
    let handlers = Arc::clone(&state.handlers);
    let sessions = Arc::clone(&state.sessions);

    tokio::spawn(async move {
        let Some(response) = handlers.handle_value(value, &ctx).await else {
            return;
        };
        if let Err(e) = send_event(&sender, &response).await {
            warn!(session_id = %session_id, error = %e, "Dropping SSE session");
            sessions.write().await.remove(&session_id);
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

async fn send_event(
    sender: &mpsc::Sender<Event>,
    response: &JsonRpcResponse,
) -> Result<(), String> {
    let data = serde_json::to_string(response).map_err(|e| e.to_string())?;
    sender
        .send(Event::default().event("message").data(data))
        .await
        .map_err(|e| e.to_string())
}
