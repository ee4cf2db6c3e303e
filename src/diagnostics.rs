//! Diagnostics collected across the compile pipeline
//!
//! Every stage (lexer, parser, hydrator, static evaluator, lowering, wire
//! conversion) reports problems by appending to an ordered `Vec<Diagnostic>`.
//! Warnings never block; Errors block the enclosing value (a statement, a
//! style hydration, the whole lowering) but never abort the pipeline itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Span;

/// How severe a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Non-blocking: unknown style key, duplicate property, duplicate ticker
    Warning,
    /// Blocking for the enclosing value, but not for the whole document
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message with an optional source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn warning(message: impl Into<String>, span: impl Into<Option<Span>>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            span: span.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{} [{}..{}]: {}",
                self.severity, span.start, span.end, self.message
            ),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// True if any diagnostic in the list is Error-level
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
