use serde::Serialize;

/// Half-open byte range `start..end` into one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Self { start, end }
    }

    /// The smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Identifies one source file inside a [`SourceMap`](crate::source::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct FileId(pub u32);

/// A span within a particular file.
///
/// Every syntax node and every IR node carries one of these so diagnostics
/// can be reported as `file:line:column` after files have been merged into
/// one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Pos {
    pub file: FileId,
    pub span: Span,
}

impl Pos {
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }
}

/// Offsets of every line start in a file, for turning byte offsets into
/// 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();
        Self { starts }
    }

    /// Line and column of `offset`, both 1-based. Columns count bytes.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.starts.partition_point(|&s| s <= offset).max(1) - 1;
        (line as u32 + 1, offset - self.starts[line] + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        assert_eq!(Span::new(8, 15).merge(Span::new(5, 10)), Span::new(5, 15));
    }

    #[test]
    fn line_col_across_lines() {
        let idx = LineIndex::new("(decl\nmain\nint 1)");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(12), (3, 2));
    }

    #[test]
    fn newline_belongs_to_its_line() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }

    #[test]
    fn offset_past_end_stays_on_last_line() {
        let idx = LineIndex::new("(decl main int 1");
        assert_eq!(idx.line_col(16), (1, 17));
    }
}
