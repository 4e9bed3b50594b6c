//! Typed intermediate representation for calc.
//!
//! A package moves through four stages, each a free function over
//! [`Package`]:
//!
//! 1. [`build`] resolves names and lowers syntax trees into IR objects.
//! 2. [`check`] computes and records the type of every node.
//! 3. [`fold`] (optional) replaces constant operator nodes by their value.
//! 4. [`tag`] numbers every node that needs a named temporary in C.
//!
//! Build and check report into a caller-owned [`Diagnostics`] collector and
//! never stop at the first problem.
//!
//! [`Diagnostics`]: calc_common::Diagnostics

pub mod build;
pub mod check;
mod display;
pub mod fold;
pub mod object;
pub mod scope;
pub mod tag;
pub mod ty;
pub mod value;

pub use build::build;
pub use check::check;
pub use fold::fold;
pub use object::{
    Assignment, Binary, Block, Call, Constant, DeclId, Declaration, If, Object, Package, Stage,
    Symbol, SymbolId, SymbolKind, Tag, Unary, Var, Variable,
};
pub use scope::{Scope, ScopeId, ScopeTable};
pub use tag::{tag, Tagger};
pub use ty::Type;
pub use value::Value;
