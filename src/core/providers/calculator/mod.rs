//! Restricted arithmetic expression calculator
//!
//! Expressions are tokenized, parsed into a tree and evaluated without
//! any access to names beyond the constants `pi`, `e`, `tau` and the
//! function table in [`functions`].

mod eval;
mod functions;
mod lexer;
mod parser;

use super::{Calculator, ProviderError};
use crate::core::types::EvalValue;
use tracing::debug;

/// Longest accepted expression, in characters
pub const MAX_EXPRESSION_CHARS: usize = 4096;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionCalculator;

impl ExpressionCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Names of every allowed function, in table order
    pub fn function_names() -> impl Iterator<Item = &'static str> {
        functions::FUNCTIONS.iter().map(|f| f.name)
    }
}

impl Calculator for ExpressionCalculator {
    fn evaluate(&self, expression: &str) -> Result<EvalValue, ProviderError> {
        if expression.chars().count() > MAX_EXPRESSION_CHARS {
            return Err(ProviderError::Evaluation(format!(
                "expression exceeds {MAX_EXPRESSION_CHARS} characters"
            )));
        }

        let tokens = lexer::tokenize(expression).map_err(ProviderError::Evaluation)?;
        let tree = parser::parse(&tokens).map_err(ProviderError::Evaluation)?;
        let value = eval::evaluate(&tree).map_err(ProviderError::Evaluation)?;

        if let EvalValue::Float(x) = value {
            if !x.is_finite() {
                return Err(ProviderError::Evaluation(
                    "result is not a finite number".to_string(),
                ));
            }
        }

        debug!(result = %value, kind = value.type_name(), "Evaluated expression");
        Ok(value)
    }

    fn help(&self, fn_name: &str) -> Result<String, ProviderError> {
        functions::lookup(fn_name.trim())
            .map(|f| f.help())
            .ok_or_else(|| ProviderError::UnknownFunction(fn_name.trim().to_string()))
    }

    fn list_allowed_fns(&self, with_help: bool) -> String {
        if with_help {
            functions::FUNCTIONS
                .iter()
                .map(|f| format!("{}: {}", f.signature, f.summary))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            Self::function_names().collect::<Vec<_>>().join(", ")
        }
    }
}
