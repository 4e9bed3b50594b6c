//! calc parser: recursive descent over the token stream from `calc-lexer`,
//! producing the untyped syntax tree in [`ast`].
//!
//! Names in the tree are plain strings; binding them to declarations,
//! parameters and variables is the IR builder's job.

pub mod ast;
pub mod error;
mod parser;

use calc_common::{Diagnostic, FileId};

pub use error::ParseError;

use parser::Parser;

/// Result of parsing one calc source file.
///
/// The tree holds every declaration that parsed cleanly; declarations with
/// errors are dropped and described in `errors`.
#[derive(Debug)]
pub struct Parse {
    file_id: FileId,
    file: ast::File,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn file(&self) -> &ast::File {
        &self.file
    }

    pub fn into_file(self) -> ast::File {
        self.file
    }

    /// Parse errors encountered during parsing.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Whether parsing completed without errors.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Parse errors as compiler diagnostics positioned in this file.
    pub fn diagnostics(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.errors
            .iter()
            .map(move |err| err.to_diagnostic(self.file_id))
    }
}

/// Parse a calc source file.
///
/// `file` is the id the caller registered the source under; it is stamped
/// into every position in the resulting tree.
pub fn parse_file(source: &str, file: FileId) -> Parse {
    let (tree, errors) = Parser::new(source, file).parse_file();
    Parse {
        file_id: file,
        file: tree,
        errors,
    }
}
