//! Error types for the toolgate gateway.
//!
//! `ToolgateError` covers start-up concerns (configuration, I/O).
//! `GatewayError` is the caller-facing failure taxonomy returned by
//! the dispatcher. Protocol-specific mapping (HTTP status codes, MCP
//! result envelopes) lives in the respective adapter modules.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for start-up and configuration operations
pub type Result<T> = std::result::Result<T, ToolgateError>;

/// Reason string used for every authorization denial
pub const AUTH_DENIED_REASON: &str = "Invalid or missing authentication token";

/// Infrastructure errors raised while building or starting the server
#[derive(Error, Debug)]
pub enum ToolgateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Failure kinds a caller can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    ValidationError,
    AuthorizationError,
    ServiceUnavailable,
    ProviderError,
    UnknownTool,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ValidationError => "ValidationError",
            FailureKind::AuthorizationError => "AuthorizationError",
            FailureKind::ServiceUnavailable => "ServiceUnavailable",
            FailureKind::ProviderError => "ProviderError",
            FailureKind::UnknownTool => "UnknownTool",
        }
    }
}

/// Caller-facing failure produced by the gateway
///
/// Every provider failure, expected or not, is folded into
/// `Provider` so a single bad request never escapes as anything
/// other than one of these variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Provider(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl GatewayError {
    /// Validation failure naming the offending field
    pub fn invalid_field(field: &str, message: impl AsRef<str>) -> Self {
        GatewayError::Validation(format!("{field}: {}", message.as_ref()))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Validation(_) => FailureKind::ValidationError,
            GatewayError::Authorization(_) => FailureKind::AuthorizationError,
            GatewayError::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            GatewayError::Provider(_) => FailureKind::ProviderError,
            GatewayError::UnknownTool(_) => FailureKind::UnknownTool,
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Suggested HTTP status code for this failure
    pub fn suggested_status(&self) -> u16 {
        match self {
            GatewayError::Validation(_) | GatewayError::Provider(_) => 400,
            GatewayError::Authorization(_) => 401,
            GatewayError::UnknownTool(_) => 404,
            GatewayError::ServiceUnavailable(_) => 503,
        }
    }

    /// Check if this failure is caused by the caller's input
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            GatewayError::Validation(_) | GatewayError::Provider(_)
        )
    }
}

/// Serializable failure envelope shared by both adapters
#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub kind: FailureKind,
    pub message: String,
    pub status: u16,
}

impl From<&GatewayError> for FailureEnvelope {
    fn from(err: &GatewayError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message(),
            status: err.suggested_status(),
        }
    }
}
