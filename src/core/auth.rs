//! Bearer token authorization guard
//!
//! A single guard runs on every tool call. When no token is configured
//! it allows everything; otherwise the presented token must match the
//! configured one exactly.

use crate::core::error::AUTH_DENIED_REASON;

/// Credentials relevant to one call
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthContext<'a> {
    /// Token presented by the caller, if any
    pub presented: Option<&'a str>,

    /// Token the server expects; `None` or empty disables the check
    pub expected: Option<&'a str>,
}

impl<'a> AuthContext<'a> {
    pub fn new(presented: Option<&'a str>, expected: Option<&'a str>) -> Self {
        Self {
            presented,
            expected,
        }
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    Deny(String),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allow)
    }
}

/// Decide whether the caller may proceed
pub fn authorize(ctx: AuthContext<'_>) -> AuthDecision {
    let expected = match ctx.expected {
        Some(token) if !token.is_empty() => token,
        _ => return AuthDecision::Allow,
    };

    match ctx.presented {
        Some(presented) if presented.as_bytes() == expected.as_bytes() => AuthDecision::Allow,
        _ => AuthDecision::Deny(AUTH_DENIED_REASON.to_string()),
    }
}

/// Extract the token from an `Authorization` header value
///
/// The scheme is matched case-insensitively; the token is everything
/// after the first space, taken verbatim. Any other scheme yields
/// `None`.
pub fn parse_bearer(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
