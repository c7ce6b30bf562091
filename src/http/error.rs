//! HTTP mapping for gateway failures

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::core::error::GatewayError;
use crate::core::types::ErrorResponse;

impl GatewayError {
    /// HTTP status code for this failure
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.suggested_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Implement IntoResponse for automatic error conversion in Axum
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            detail: self.message(),
            kind: self.kind().as_str().to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
