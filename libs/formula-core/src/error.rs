//! Error types for formula-core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Compilation failure category
///
/// The numeric codes are stable and match the return codes hosts have
/// historically switched on (`0` is reserved for success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnmatchedParentheses,
    SyntaxError,
    UnknownSymbol,
    InvalidVariableName,
}

impl ErrorKind {
    pub fn code(&self) -> u8 {
        match self {
            Self::UnmatchedParentheses => 1,
            Self::SyntaxError => 2,
            Self::UnknownSymbol => 3,
            Self::InvalidVariableName => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnmatchedParentheses => "unmatched_parentheses",
            Self::SyntaxError => "syntax_error",
            Self::UnknownSymbol => "unknown_symbol",
            Self::InvalidVariableName => "invalid_variable_name",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formula errors
///
/// Compilation variants carry the byte offset into the definition text at
/// which the failure was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Unmatched parentheses at offset {offset}")]
    UnmatchedParentheses { offset: usize },

    #[error("Syntax error at offset {offset}")]
    Syntax { offset: usize },

    #[error("Unknown symbol at offset {offset}")]
    UnknownSymbol { offset: usize },

    #[error("Invalid variable name at offset {offset}")]
    InvalidVariableName { offset: usize },

    #[error("Variable not found: {0}")]
    VariableNotFound(String),
}

impl FormulaError {
    pub fn unmatched_parentheses(offset: usize) -> Self {
        Self::UnmatchedParentheses { offset }
    }

    pub fn syntax(offset: usize) -> Self {
        Self::Syntax { offset }
    }

    pub fn unknown_symbol(offset: usize) -> Self {
        Self::UnknownSymbol { offset }
    }

    pub fn invalid_variable_name(offset: usize) -> Self {
        Self::InvalidVariableName { offset }
    }

    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound(name.into())
    }

    /// Compilation error kind, `None` for binding errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::UnmatchedParentheses { .. } => Some(ErrorKind::UnmatchedParentheses),
            Self::Syntax { .. } => Some(ErrorKind::SyntaxError),
            Self::UnknownSymbol { .. } => Some(ErrorKind::UnknownSymbol),
            Self::InvalidVariableName { .. } => Some(ErrorKind::InvalidVariableName),
            Self::VariableNotFound(_) => None,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnmatchedParentheses { offset }
            | Self::Syntax { offset }
            | Self::UnknownSymbol { offset }
            | Self::InvalidVariableName { offset } => Some(*offset),
            Self::VariableNotFound(_) => None,
        }
    }

    /// Build a serializable report against the text that failed to compile
    pub fn report(&self, text: &str) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            code: self.kind().map_or(0, |kind| kind.code()),
            offset: self.offset(),
            message: self.to_string(),
            text: text.to_string(),
        }
    }
}

/// Error information for structured output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub message: String,
    pub text: String,
}

impl ErrorReport {
    /// Render the text with a caret under the failing offset
    pub fn caret_line(&self) -> Option<String> {
        let offset = self.offset?;
        let column = self
            .text
            .char_indices()
            .take_while(|(i, _)| *i < offset)
            .count();
        Some(format!("{}\n{}^", self.text, " ".repeat(column)))
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::UnmatchedParentheses.code(), 1);
        assert_eq!(ErrorKind::SyntaxError.code(), 2);
        assert_eq!(ErrorKind::UnknownSymbol.code(), 3);
        assert_eq!(ErrorKind::InvalidVariableName.code(), 4);
    }

    #[test]
    fn test_accessors() {
        let err = FormulaError::unknown_symbol(7);
        assert_eq!(err.kind(), Some(ErrorKind::UnknownSymbol));
        assert_eq!(err.offset(), Some(7));

        let err = FormulaError::variable_not_found("x");
        assert_eq!(err.kind(), None);
        assert_eq!(err.offset(), None);
        assert_eq!(err.to_string(), "Variable not found: x");
    }

    #[test]
    fn test_report_serialization() {
        let report = FormulaError::syntax(4).report("1 + + ");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "syntax_error");
        assert_eq!(json["code"], 2);
        assert_eq!(json["offset"], 4);
        assert_eq!(report.caret_line().unwrap(), "1 + + \n    ^");
    }
}
