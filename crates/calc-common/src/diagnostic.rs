//! Compiler diagnostics and the per-compilation collector.
//!
//! Every stage (builder, checker, generator) reports problems by pushing a
//! [`Diagnostic`] into a [`Diagnostics`] collector that the caller owns and
//! threads through. Stages never abort on the first problem; the caller
//! decides afterwards whether the collected list is fatal.

use std::fmt;

use serde::Serialize;

use crate::span::Pos;

/// Where a type mismatch was detected. Used to phrase the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MismatchContext {
    /// Operand of a binary or unary operator.
    Operand,
    /// Condition of an `if`.
    Condition,
    /// The two branches of an `if`, or a branch and the declared `if` type.
    Branches,
    /// Right-hand side of an assignment.
    Assignment,
    /// Initializer of a local variable with a declared type.
    Initializer,
    /// Positional argument of a call (0-based).
    Argument(usize),
    /// Body of a declaration against its declared return type.
    Return,
}

impl fmt::Display for MismatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand => write!(f, "operand"),
            Self::Condition => write!(f, "condition"),
            Self::Branches => write!(f, "if branches"),
            Self::Assignment => write!(f, "assignment"),
            Self::Initializer => write!(f, "initializer"),
            Self::Argument(idx) => write!(f, "argument {}", idx + 1),
            Self::Return => write!(f, "return value"),
        }
    }
}

/// The specific kind of diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DiagnosticKind {
    /// Malformed source text.
    Parse(String),
    /// A variable or call target not found in any enclosing scope.
    UnresolvedName { name: String },
    /// A name already bound in the same scope.
    Redeclaration { name: String, previous: Pos },
    /// Operand, branch, argument or assignment type disagreement.
    TypeMismatch {
        expected: String,
        found: String,
        context: MismatchContext,
    },
    /// Call argument count disagreement.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A call whose target resolves to a variable or parameter.
    NotCallable { name: String },
    /// An assignment whose target resolves to a declaration.
    NotAssignable { name: String },
    /// A declaration name read as if it were a variable.
    NotAValue { name: String },
    /// The package has no declaration with the entry name.
    MissingEntry { name: String },
    /// The generator met a node it cannot lower. Indicates a compiler bug.
    InternalUnreachable { what: String },
    /// The output writer failed.
    Write(String),
}

impl DiagnosticKind {
    /// Stable error code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E0001",
            Self::UnresolvedName { .. } => "E0002",
            Self::Redeclaration { .. } => "E0003",
            Self::TypeMismatch { .. } => "E0004",
            Self::ArityMismatch { .. } => "E0005",
            Self::NotCallable { .. } => "E0006",
            Self::NotAssignable { .. } => "E0007",
            Self::MissingEntry { .. } => "E0008",
            Self::NotAValue { .. } => "E0009",
            Self::InternalUnreachable { .. } => "E0900",
            Self::Write(_) => "E0901",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "{msg}"),
            Self::UnresolvedName { name } => write!(f, "unresolved name `{name}`"),
            Self::Redeclaration { name, .. } => {
                write!(f, "`{name}` is already declared in this scope")
            }
            Self::TypeMismatch {
                expected,
                found,
                context,
            } => write!(
                f,
                "type mismatch in {context}: expected {expected}, found {found}"
            ),
            Self::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "`{name}` expects {expected} argument(s), found {found}"
            ),
            Self::NotCallable { name } => write!(f, "`{name}` is not a declaration and cannot be called"),
            Self::NotAssignable { name } => {
                write!(f, "cannot assign to `{name}`: not a variable or parameter")
            }
            Self::MissingEntry { name } => write!(f, "no entry declaration `{name}` in package"),
            Self::NotAValue { name } => {
                write!(f, "`{name}` is a declaration and must be called")
            }
            Self::InternalUnreachable { what } => {
                write!(f, "internal compiler error: unreachable {what}")
            }
            Self::Write(msg) => write!(f, "failed to write output: {msg}"),
        }
    }
}

/// A diagnostic with the source position it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub pos: Pos,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, pos: Pos) -> Self {
        Self { kind, pos }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// Accumulates diagnostics for one compilation.
///
/// Each compilation owns exactly one collector; nothing here is global, so
/// independent compilations in the same process never interfere.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, pos: Pos) {
        self.items.push(Diagnostic::new(kind, pos));
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Every diagnostic is an error; any entry fails the compilation.
    pub fn has_errors(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
