//! Untyped syntax tree for calc source files.
//!
//! The tree mirrors the surface syntax one-to-one: names are plain strings
//! that the IR builder later resolves against its scope table. Every node
//! carries the [`Pos`] it was parsed from.

use std::fmt;

use calc_common::Pos;
use serde::Serialize;

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct File {
    pub decls: Vec<Decl>,
}

/// A name occurrence with its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

/// A written type: `int` or `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeName {
    Int,
    Bool,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Bool => write!(f, "bool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TypeExpr {
    pub name: TypeName,
    pub pos: Pos,
}

/// `(decl name (params...) type body)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: TypeExpr,
    pub body: Expr,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeExpr,
}

/// Binary operators, in head position of an operator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// The operator's spelling, shared by calc and C.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    /// `<`, `<=`, `>`, `>=`: integer operands, boolean result.
    pub fn is_ordering(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    /// `==`, `!=`: operands of any equal type, boolean result.
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    /// `(- x)`
    Neg,
    /// `(! x)`
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Int {
        value: i32,
        pos: Pos,
    },
    Bool {
        value: bool,
        pos: Pos,
    },
    /// A read of a named parameter or variable.
    Name(Ident),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        pos: Pos,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        pos: Pos,
    },
    /// `(if cond [type] then [else])`
    If {
        cond: Box<Expr>,
        ty: Option<TypeExpr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
        pos: Pos,
    },
    /// `(var name [type])` or `(var (= name init) [type])`
    Var {
        name: Ident,
        ty: Option<TypeExpr>,
        init: Option<Box<Expr>>,
        pos: Pos,
    },
    /// `(= name value)`
    Assign {
        name: Ident,
        value: Box<Expr>,
        pos: Pos,
    },
    /// `(name args...)`
    Call {
        name: Ident,
        args: Vec<Expr>,
        pos: Pos,
    },
    /// `(expr expr ...)`; its value is the last element's.
    Block {
        exprs: Vec<Expr>,
        pos: Pos,
    },
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Name(ident) => ident.pos,
            Expr::Int { pos, .. }
            | Expr::Bool { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::If { pos, .. }
            | Expr::Var { pos, .. }
            | Expr::Assign { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Block { pos, .. } => *pos,
        }
    }
}
