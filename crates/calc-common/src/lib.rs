//! Shared types for the calc compiler: spans, the source map, tokens and
//! diagnostics.

pub mod diagnostic;
pub mod source;
pub mod span;
pub mod token;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, MismatchContext};
pub use source::{Location, SourceFile, SourceMap};
pub use span::{FileId, LineIndex, Pos, Span};
