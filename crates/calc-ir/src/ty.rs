//! The calc type system: a closed set of scalar types.

use std::fmt;

use calc_parser::ast::TypeName;

/// Type of an IR node.
///
/// `Invalid` marks a node whose type could not be determined because of an
/// earlier error, or a node the checker has not visited yet. It never
/// reaches code generation from a package that checked cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Invalid,
}

impl Type {
    pub fn is_valid(self) -> bool {
        self != Type::Invalid
    }
}

impl From<TypeName> for Type {
    fn from(name: TypeName) -> Self {
        match name {
            TypeName::Int => Type::Int,
            TypeName::Bool => Type::Bool,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Invalid => write!(f, "invalid"),
        }
    }
}
