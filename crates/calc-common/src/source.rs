//! The file set: every source file loaded into one compilation.
//!
//! Files are stored in load order and identified by [`FileId`]. The load
//! order is part of the compiler's determinism contract: it fixes the order
//! in which declarations are built, diagnosed and tagged.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::span::{FileId, LineIndex, Pos};

/// A single loaded source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    /// Display name, usually the path the file was read from.
    pub name: String,
    pub text: String,
    line_index: LineIndex,
}

impl SourceFile {
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// A resolved, human-readable source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Owns the text of every file in a compilation.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    files: Vec<SourceFile>,
    by_name: FxHashMap<String, FileId>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id. Ids are assigned in call order.
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let name = name.into();
        let text = text.into();
        let id = FileId(self.files.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.files.push(SourceFile {
            id,
            line_index: LineIndex::new(&text),
            name,
            text,
        });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn lookup(&self, name: &str) -> Option<FileId> {
        self.by_name.get(name).copied()
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolve a position to `file:line:column`.
    ///
    /// Positions pointing at an unknown file resolve to `<unknown>:0:0`
    /// rather than failing; diagnostics must always be printable.
    pub fn location(&self, pos: Pos) -> Location {
        match self.get(pos.file) {
            Some(file) => {
                let (line, column) = file.line_index.line_col(pos.span.start);
                Location {
                    file: file.name.clone(),
                    line,
                    column,
                }
            }
            None => Location {
                file: "<unknown>".to_string(),
                line: 0,
                column: 0,
            },
        }
    }
}
