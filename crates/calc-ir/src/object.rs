//! IR objects: the package, its declarations and symbols, and the closed set
//! of expression nodes.
//!
//! Expression nodes form an owned tree. Names are resolved once, by the
//! builder, into [`SymbolId`]s pointing at the package symbol table; the
//! scope that bound a name is recorded in the [`ScopeTable`]. Later stages
//! mutate node types and tags in place.

use calc_common::Pos;
use calc_parser::ast::{BinaryOp, UnaryOp};

use crate::scope::{ScopeId, ScopeTable};
use crate::ty::Type;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Numeric identity of a named temporary in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

/// How far a package has progressed through the pipeline.
///
/// Each stage asserts the stage it requires. Running them out of order is a
/// caller bug and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Built,
    Checked,
    Folded,
    Tagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Declaration(DeclId),
    Param,
    Variable,
}

/// A named entity bound in some scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Parameter and declared variable types are known at build time. An
    /// untyped variable is `Invalid` until the checker infers it from the
    /// initializer. For declarations this is the return type.
    pub ty: Type,
    pub tag: Option<Tag>,
    pub pos: Pos,
}

/// A top-level function.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub symbol: SymbolId,
    pub params: Vec<SymbolId>,
    pub ret: Type,
    pub scope: ScopeId,
    pub body: Object,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub pos: Pos,
}

/// A read of a parameter or local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub symbol: SymbolId,
    pub ty: Type,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Box<Object>,
    pub rhs: Box<Object>,
    pub ty: Type,
    pub tag: Option<Tag>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Object>,
    pub ty: Type,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub callee: DeclId,
    pub args: Vec<Object>,
    pub ty: Type,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub cond: Box<Object>,
    pub declared: Option<Type>,
    pub then_branch: Box<Object>,
    pub else_branch: Option<Box<Object>>,
    pub ty: Type,
    pub tag: Option<Tag>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub exprs: Vec<Object>,
    pub ty: Type,
    pub pos: Pos,
}

/// `(= name value)`. Evaluates to the assigned variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub target: SymbolId,
    pub value: Box<Object>,
    pub ty: Type,
    pub pos: Pos,
}

/// A local variable introduction. Its type and tag live on the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub symbol: SymbolId,
    pub declared: Option<Type>,
    pub init: Option<Box<Object>>,
    pub pos: Pos,
}

/// An IR expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Constant(Constant),
    Var(Var),
    Binary(Binary),
    Unary(Unary),
    Call(Call),
    If(If),
    Block(Block),
    Assignment(Assignment),
    Variable(Variable),
    /// Stand-in for a form whose names failed to resolve. The builder has
    /// already reported why; later stages treat it as `Invalid`.
    Error(Pos),
}

impl Object {
    pub fn pos(&self) -> Pos {
        match self {
            Object::Constant(c) => c.pos,
            Object::Var(v) => v.pos,
            Object::Binary(b) => b.pos,
            Object::Unary(u) => u.pos,
            Object::Call(c) => c.pos,
            Object::If(i) => i.pos,
            Object::Block(b) => b.pos,
            Object::Assignment(a) => a.pos,
            Object::Variable(v) => v.pos,
            Object::Error(pos) => *pos,
        }
    }

    /// The node's type as last recorded. Variable introductions take their
    /// type from the symbol table.
    pub fn ty(&self, symbols: &[Symbol]) -> Type {
        match self {
            Object::Constant(c) => c.value.ty(),
            Object::Var(v) => v.ty,
            Object::Binary(b) => b.ty,
            Object::Unary(u) => u.ty,
            Object::Call(c) => c.ty,
            Object::If(i) => i.ty,
            Object::Block(b) => b.ty,
            Object::Assignment(a) => a.ty,
            Object::Variable(v) => symbols[v.symbol.0 as usize].ty,
            Object::Error(_) => Type::Invalid,
        }
    }

    pub fn as_constant(&self) -> Option<Value> {
        match self {
            Object::Constant(c) => Some(c.value),
            _ => None,
        }
    }
}

/// A whole compilation unit after name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub scopes: ScopeTable,
    pub symbols: Vec<Symbol>,
    pub decls: Vec<Declaration>,
    pub(crate) stage: Stage,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scopes: ScopeTable::new(),
            symbols: Vec::new(),
            decls: Vec::new(),
            stage: Stage::Built,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.0 as usize]
    }

    /// Find a top-level declaration by name.
    pub fn lookup(&self, name: &str) -> Option<&Declaration> {
        let sym = self.scopes.lookup_local(ScopeId::PACKAGE, name)?;
        match self.symbol(sym).kind {
            SymbolKind::Declaration(id) => Some(self.decl(id)),
            _ => None,
        }
    }

    pub(crate) fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }
}
