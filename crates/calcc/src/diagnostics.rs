//! Diagnostic rendering for the command line.
//!
//! Human-readable output goes through ariadne; `--json` switches to one JSON
//! object per line. Both resolve positions through the compilation's
//! [`SourceMap`] so diagnostics from merged directories name the right file.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind};
use calc_common::{Diagnostic, DiagnosticKind, Pos, SourceMap};

/// Options controlling how diagnostics are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text without ANSI escapes, as used in tests.
    pub fn colorless() -> Self {
        Self {
            color: false,
            json: false,
        }
    }
}

/// Render one diagnostic according to `opts`.
pub fn render(diag: &Diagnostic, sources: &SourceMap, opts: &DiagnosticOptions) -> String {
    if opts.json {
        let mut line = render_json(diag, sources);
        line.push('\n');
        line
    } else {
        render_report(diag, sources, opts.color)
    }
}

/// A JSON object describing `diag`, on one line.
pub fn render_json(diag: &Diagnostic, sources: &SourceMap) -> String {
    let location = sources.location(diag.pos);
    let mut spans = vec![serde_json::json!({
        "file": location.file,
        "start": diag.pos.span.start,
        "end": diag.pos.span.end,
        "line": location.line,
        "column": location.column,
        "label": primary_label(&diag.kind),
    })];
    if let DiagnosticKind::Redeclaration { previous, .. } = &diag.kind {
        let prev = sources.location(*previous);
        spans.push(serde_json::json!({
            "file": prev.file,
            "start": previous.span.start,
            "end": previous.span.end,
            "line": prev.line,
            "column": prev.column,
            "label": "previously declared here",
        }));
    }
    serde_json::json!({
        "code": diag.code(),
        "severity": "error",
        "message": diag.to_string(),
        "location": location.to_string(),
        "spans": spans,
    })
    .to_string()
}

fn primary_label(kind: &DiagnosticKind) -> String {
    match kind {
        DiagnosticKind::TypeMismatch {
            expected, found, ..
        } => format!("expected {expected}, found {found}"),
        DiagnosticKind::Redeclaration { name, .. } => format!("`{name}` declared again here"),
        DiagnosticKind::UnresolvedName { .. } => "not found in this scope".to_string(),
        DiagnosticKind::ArityMismatch { expected, .. } => {
            format!("expected {expected} argument(s)")
        }
        other => other.to_string(),
    }
}

/// Byte range of `pos` clamped to its file, never empty.
fn range_in(sources: &SourceMap, pos: Pos) -> Option<(String, Range<usize>)> {
    let file = sources.get(pos.file)?;
    let len = file.text.len();
    let start = (pos.span.start as usize).min(len);
    let end = (pos.span.end as usize).min(len).max(start);
    let range = if start == end {
        start..(end + 1).min(len)
    } else {
        start..end
    };
    Some((file.name.clone(), range))
}

fn render_report(diag: &Diagnostic, sources: &SourceMap, color: bool) -> String {
    let location = sources.location(diag.pos);
    let Some(primary) = range_in(sources, diag.pos) else {
        // No file to point into, e.g. a package with no sources loaded.
        return format!("error[{}]: {} ({})\n", diag.code(), diag, location);
    };

    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);
    let mut builder = Report::build(ReportKind::Error, primary.clone())
        .with_code(diag.code())
        .with_message(diag.to_string())
        .with_config(config)
        .with_label(
            Label::new(primary)
                .with_message(primary_label(&diag.kind))
                .with_color(Color::Red),
        );
    if let DiagnosticKind::Redeclaration { previous, .. } = &diag.kind {
        if let Some(prev) = range_in(sources, *previous) {
            builder.add_label(
                Label::new(prev)
                    .with_message("previously declared here")
                    .with_color(Color::Blue),
            );
        }
    }

    let cache = ariadne::sources(
        sources
            .files()
            .map(|f| (f.name.clone(), f.text.clone()))
            .collect::<Vec<_>>(),
    );
    let mut buf = Vec::new();
    if let Err(err) = builder.finish().write(cache, &mut buf) {
        return format!(
            "error[{}]: {} ({location}; report failed: {err})\n",
            diag.code(),
            diag
        );
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_common::{FileId, Span};

    fn one_file(text: &str) -> SourceMap {
        let mut sources = SourceMap::new();
        sources.add("main.calc", text);
        sources
    }

    #[test]
    fn json_carries_code_and_location() {
        let sources = one_file("(decl main int\n  x)");
        let diag = Diagnostic::new(
            DiagnosticKind::UnresolvedName { name: "x".into() },
            Pos::new(FileId(0), Span::new(17, 18)),
        );
        let value: serde_json::Value = serde_json::from_str(&render_json(&diag, &sources)).unwrap();
        assert_eq!(value["code"], "E0002");
        assert_eq!(value["message"], "unresolved name `x`");
        assert_eq!(value["location"], "main.calc:2:3");
        assert_eq!(value["spans"][0]["label"], "not found in this scope");
    }

    #[test]
    fn json_redeclaration_has_two_spans() {
        let mut sources = SourceMap::new();
        sources.add("a.calc", "(decl main int 1)");
        sources.add("b.calc", "(decl main int 2)");
        let diag = Diagnostic::new(
            DiagnosticKind::Redeclaration {
                name: "main".into(),
                previous: Pos::new(FileId(0), Span::new(6, 10)),
            },
            Pos::new(FileId(1), Span::new(6, 10)),
        );
        let value: serde_json::Value = serde_json::from_str(&render_json(&diag, &sources)).unwrap();
        assert_eq!(value["spans"][0]["file"], "b.calc");
        assert_eq!(value["spans"][1]["file"], "a.calc");
        assert_eq!(value["spans"][1]["label"], "previously declared here");
    }

    #[test]
    fn report_names_file_and_message() {
        let sources = one_file("(decl main int true)");
        let diag = Diagnostic::new(
            DiagnosticKind::TypeMismatch {
                expected: "int".into(),
                found: "bool".into(),
                context: calc_common::MismatchContext::Return,
            },
            Pos::new(FileId(0), Span::new(15, 19)),
        );
        let text = render(&diag, &sources, &DiagnosticOptions::colorless());
        assert!(text.contains("E0004"), "{text}");
        assert!(text.contains("type mismatch in return value: expected int, found bool"));
        assert!(text.contains("main.calc:1:16"), "{text}");
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn positionless_diagnostic_falls_back_to_one_line() {
        let sources = SourceMap::new();
        let diag = Diagnostic::new(
            DiagnosticKind::Write("disk full".into()),
            Pos::default(),
        );
        let text = render(&diag, &sources, &DiagnosticOptions::colorless());
        assert_eq!(
            text,
            "error[E0901]: failed to write output: disk full (<unknown>:0:0)\n"
        );
    }
}
