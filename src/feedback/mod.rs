//! Structured diagnostics for tooling consumers
//!
//! `mbc check --json` prints these instead of the human-readable
//! message so editors and scripts can consume failures.

use serde::{Deserialize, Serialize};

use crate::utils::Error;

/// A machine-readable rendering of a translation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Pipeline stage: "lexical", "syntax" or "semantic"
    pub stage: String,
    /// Human-readable message
    pub message: String,
    /// Offset where the offending token starts
    pub start: usize,
    /// Offset just past the offending token
    pub end: usize,
}

impl Diagnostic {
    /// Create a diagnostic from a translation error
    pub fn from_error(error: &Error) -> Self {
        let span = error.span();
        Self {
            stage: error.stage().to_string(),
            message: error.to_string(),
            start: span.start,
            end: span.end,
        }
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    #[test]
    fn test_diagnostic_from_error() {
        let error = Error::UndeclaredVariable {
            name: "y".to_string(),
            span: Span::new(6, 7),
        };
        let diag = Diagnostic::from_error(&error);
        assert_eq!(diag.stage, "semantic");
        assert_eq!(diag.message, "Accessing undeclared variable: y");
        assert_eq!(diag.start, 6);
        assert_eq!(diag.end, 7);
    }

    #[test]
    fn test_diagnostic_serializes() {
        let error = Error::UnterminatedString {
            span: Span::new(0, 4),
        };
        let json = Diagnostic::from_error(&error).to_json();
        assert!(json.contains("\"stage\""));
        assert!(json.contains("lexical"));
    }
}
