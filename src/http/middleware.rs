//! Middleware for the toolgate REST adapter
//!
//! Provides request logging with duration tracking.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info};

/// Request logging middleware
///
/// Logs every request with method, URI, status code and duration.
/// Successful requests are logged at INFO level, failed requests at
/// ERROR level.
pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_success() || status.is_informational() {
        info!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request completed"
        );
    } else {
        error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration_ms,
            "Request failed"
        );
    }

    response
}
