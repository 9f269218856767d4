//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing, evaluation or rewriting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// A string literal without its closing quote
    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A number literal with more than one decimal separator
    #[error("Malformed number at offset {offset}")]
    MalformedNumber { offset: usize },

    /// Function calls are recognized but cannot be evaluated
    #[error("Unsupported function call: {0}")]
    UnsupportedFunctionCall(String),

    /// No valid split point, unbalanced parentheses or a missing operand
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// Cached value requested before any evaluation
    #[error("No cached value")]
    NoCachedValue,

    /// Operator that parses but has no evaluation rule
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(&'static str),

    /// Reference the grid cannot resolve, or that a shift moves off the grid
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl From<feuille_core::Error> for FormulaError {
    fn from(err: feuille_core::Error) -> Self {
        FormulaError::InvalidReference(err.to_string())
    }
}
