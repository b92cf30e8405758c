//! Error handling for MiniBasic

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Translation error; the first one aborts the whole run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexical Errors ====================

    #[error("Unrecognized token: {found}")]
    UnrecognizedToken { found: char, span: Span },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Input ends in the middle of a {what}")]
    TruncatedLiteral { what: &'static str, span: Span },

    // ==================== Syntax Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Expected a comparison operator, got {got}")]
    ExpectedComparison { got: String, span: Span },

    #[error("Expected a number or variable, got {got}")]
    ExpectedExpression { got: String, span: Span },

    #[error("Statement cannot start with {got}")]
    UnexpectedStatement { got: String, span: Span },

    // ==================== Semantic Errors ====================

    #[error("Accessing undeclared variable: {name}")]
    UndeclaredVariable { name: String, span: Span },

    #[error("Label is already declared: {name}")]
    DuplicateLabel { name: String, span: Span },

    #[error("Label does not exist: {name}")]
    UndefinedLabel { name: String, span: Span },
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::UnrecognizedToken { span, .. } => *span,
            Self::UnterminatedString { span } => *span,
            Self::TruncatedLiteral { span, .. } => *span,
            Self::UnexpectedToken { span, .. } => *span,
            Self::ExpectedComparison { span, .. } => *span,
            Self::ExpectedExpression { span, .. } => *span,
            Self::UnexpectedStatement { span, .. } => *span,
            Self::UndeclaredVariable { span, .. } => *span,
            Self::DuplicateLabel { span, .. } => *span,
            Self::UndefinedLabel { span, .. } => *span,
        }
    }

    /// Pipeline stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnrecognizedToken { .. }
            | Self::UnterminatedString { .. }
            | Self::TruncatedLiteral { .. } => "lexical",
            Self::UnexpectedToken { .. }
            | Self::ExpectedComparison { .. }
            | Self::ExpectedExpression { .. }
            | Self::UnexpectedStatement { .. } => "syntax",
            Self::UndeclaredVariable { .. }
            | Self::DuplicateLabel { .. }
            | Self::UndefinedLabel { .. } => "semantic",
        }
    }
}
