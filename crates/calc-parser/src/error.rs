//! Syntax errors reported by the parser.

use std::fmt;

use calc_common::span::Span;
use calc_common::{Diagnostic, DiagnosticKind, FileId, Pos};

/// A syntax error inside one top-level form.
///
/// `related` points back at an earlier location that explains the error,
/// such as the `(` that was never closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            related: None,
        }
    }

    /// A missing `)`: reported at `found`, with the opening paren as context.
    pub fn unclosed(found: &str, at: Span, open: Span) -> Self {
        Self {
            message: format!("expected `)`, found {found}"),
            span: at,
            related: Some(("opened here".to_string(), open)),
        }
    }

    /// Convert into a compiler diagnostic positioned in `file`.
    pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
        Diagnostic::new(
            DiagnosticKind::Parse(self.message.clone()),
            Pos::new(file, self.span),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclosed_points_back_at_open_paren() {
        let err = ParseError::unclosed("end of file", Span::new(16, 16), Span::new(0, 1));
        assert_eq!(err.to_string(), "expected `)`, found end of file");
        assert_eq!(err.related, Some(("opened here".to_string(), Span::new(0, 1))));
    }

    #[test]
    fn diagnostic_keeps_file_and_span() {
        let err = ParseError::new("missing operand", Span::new(3, 4));
        let diag = err.to_diagnostic(FileId(2));
        assert_eq!(diag.pos, Pos::new(FileId(2), Span::new(3, 4)));
        assert!(matches!(diag.kind, DiagnosticKind::Parse(ref m) if m == "missing operand"));
    }
}
