//! Request schemas for tool arguments
//!
//! Each tool declares its parameters once. The same declaration
//! validates inbound arguments (from a query string or a JSON body)
//! and renders the JSON Schema advertised over MCP and OpenAPI.

use crate::core::error::GatewayError;
use serde_json::{json, Map, Value};

/// Declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// A single declared parameter
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Strip surrounding whitespace from string values
    pub trim: bool,
    /// Reject strings that are empty (after trimming, if enabled)
    pub non_empty: bool,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            minimum: None,
            exclusive_minimum: None,
            maximum: None,
            trim: false,
            non_empty: false,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Inclusive bounds
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub fn greater_than(mut self, bound: f64) -> Self {
        self.exclusive_minimum = Some(bound);
        self
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Coerce and check one raw value against this parameter
    fn check(&self, raw: &Value) -> Result<Value, GatewayError> {
        let value = match self.kind {
            ParamKind::String => self.check_string(raw)?,
            ParamKind::Integer => Value::from(coerce_integer(raw).ok_or_else(|| {
                GatewayError::invalid_field(self.name, "input should be a valid integer")
            })?),
            ParamKind::Number => Value::from(coerce_number(raw).ok_or_else(|| {
                GatewayError::invalid_field(self.name, "input should be a valid number")
            })?),
            ParamKind::Boolean => Value::from(coerce_bool(raw).ok_or_else(|| {
                GatewayError::invalid_field(self.name, "input should be a valid boolean")
            })?),
        };

        if let Some(n) = value.as_f64() {
            self.check_bounds(n)?;
        }

        Ok(value)
    }

    fn check_string(&self, raw: &Value) -> Result<Value, GatewayError> {
        let s = raw.as_str().ok_or_else(|| {
            GatewayError::invalid_field(self.name, "input should be a valid string")
        })?;
        let s = if self.trim { s.trim() } else { s };
        if self.non_empty && s.is_empty() {
            return Err(GatewayError::invalid_field(self.name, "must not be empty"));
        }
        Ok(Value::String(s.to_string()))
    }

    fn check_bounds(&self, n: f64) -> Result<(), GatewayError> {
        if let Some(min) = self.minimum {
            if n < min {
                return Err(GatewayError::invalid_field(
                    self.name,
                    format!("input should be greater than or equal to {}", fmt_bound(min)),
                ));
            }
        }
        if let Some(min) = self.exclusive_minimum {
            if n <= min {
                return Err(GatewayError::invalid_field(
                    self.name,
                    format!("input should be greater than {}", fmt_bound(min)),
                ));
            }
        }
        if let Some(max) = self.maximum {
            if n > max {
                return Err(GatewayError::invalid_field(
                    self.name,
                    format!("input should be less than or equal to {}", fmt_bound(max)),
                ));
            }
        }
        Ok(())
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(self.kind.json_type()));
        schema.insert("description".to_string(), json!(self.description));
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(min) = self.minimum {
            schema.insert("minimum".to_string(), bound_value(self.kind, min));
        }
        if let Some(min) = self.exclusive_minimum {
            schema.insert("exclusiveMinimum".to_string(), bound_value(self.kind, min));
        }
        if let Some(max) = self.maximum {
            schema.insert("maximum".to_string(), bound_value(self.kind, max));
        }
        if self.non_empty {
            schema.insert("minLength".to_string(), json!(1));
        }
        Value::Object(schema)
    }
}

fn fmt_bound(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn bound_value(kind: ParamKind, n: f64) -> Value {
    if kind == ParamKind::Integer && n.fract() == 0.0 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Declared argument schema of one tool
#[derive(Debug, Clone, Default)]
pub struct RequestSchema {
    params: Vec<ParamSpec>,
}

impl RequestSchema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validate raw arguments and return the normalized set
    ///
    /// Rejects unknown names, missing required fields, type mismatches
    /// and out-of-range values. Fills declared defaults. `null` counts
    /// as omitted.
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<ToolArgs, GatewayError> {
        if let Some(unknown) = raw
            .keys()
            .find(|key| !self.params.iter().any(|p| p.name == key.as_str()))
        {
            return Err(GatewayError::invalid_field(unknown, "unexpected argument"));
        }

        let mut values = Map::new();
        for param in &self.params {
            match raw.get(param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    values.insert(param.name.to_string(), param.check(value)?);
                }
                None if param.required => {
                    return Err(GatewayError::invalid_field(param.name, "field required"));
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.to_string(), default.clone());
                    }
                }
            }
        }

        Ok(ToolArgs { values })
    }

    /// JSON Schema for the argument object
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}

/// Validated, normalized arguments for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Result<&str, GatewayError> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::invalid_field(name, "field required"))
    }

    pub fn i64(&self, name: &str) -> Result<i64, GatewayError> {
        self.values
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| GatewayError::invalid_field(name, "field required"))
    }

    pub fn bool(&self, name: &str) -> Result<bool, GatewayError> {
        self.values
            .get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| GatewayError::invalid_field(name, "field required"))
    }

    pub fn opt_f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }
}
