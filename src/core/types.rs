//! Core data types for the toolgate gateway.
//!
//! Result shapes returned by tools and the small response bodies
//! served by the REST adapter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single web search hit
///
/// `excerpt` always mirrors `content` so callers written against
/// either search backend see the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    /// Result title
    pub title: String,

    /// Result URL
    pub url: String,

    /// Description or snippet from the backend
    pub content: String,

    /// Same as content
    pub excerpt: String,
}

impl SearchResultRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            url: url.into(),
            excerpt: content.clone(),
            content,
        }
    }

    /// Re-establish the content/excerpt mirror
    pub fn mirrored(mut self) -> Self {
        self.excerpt = self.content.clone();
        self
    }
}

/// Value produced by the calculator
///
/// Serialized as the bare JSON scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvalValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl EvalValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::Bool(_) => "bool",
            EvalValue::Int(_) => "int",
            EvalValue::Float(_) => "float",
        }
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Bool(true) => write!(f, "True"),
            EvalValue::Bool(false) => write!(f, "False"),
            EvalValue::Int(i) => write!(f, "{i}"),
            EvalValue::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            EvalValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Successful tool output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// Ordered search results, provider order preserved
    Results(Vec<SearchResultRecord>),

    /// Free text (help, function list, page content)
    Text(String),

    /// Calculator result
    Value(EvalValue),
}

impl ToolOutput {
    /// Render the output as text for protocols that carry text blocks
    pub fn to_text(&self) -> String {
        match self {
            ToolOutput::Text(text) => text.clone(),
            ToolOutput::Value(value) => value.to_string(),
            ToolOutput::Results(results) => {
                serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Error body returned by the REST adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub detail: String,

    /// Failure kind
    pub kind: String,
}
