//! Compile-time values and their operator semantics.
//!
//! The folder evaluates operators through [`Value::binary`] and
//! [`Value::unary`]. Both return `None` whenever the operation would not be
//! well defined at run time in C: division or remainder by zero, signed
//! overflow, or operand types the operator does not accept.

use std::fmt;

use calc_parser::ast::{BinaryOp, UnaryOp};

use crate::ty::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i32),
    Bool(bool),
}

impl Value {
    pub fn ty(self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Option<Value> {
        use BinaryOp::*;
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => match op {
                Add => a.checked_add(b).map(Value::Int),
                Sub => a.checked_sub(b).map(Value::Int),
                Mul => a.checked_mul(b).map(Value::Int),
                Div if b == 0 => None,
                Div => a.checked_div(b).map(Value::Int),
                Rem if b == 0 => None,
                Rem => a.checked_rem(b).map(Value::Int),
                Eq => Some(Value::Bool(a == b)),
                Ne => Some(Value::Bool(a != b)),
                Lt => Some(Value::Bool(a < b)),
                Le => Some(Value::Bool(a <= b)),
                Gt => Some(Value::Bool(a > b)),
                Ge => Some(Value::Bool(a >= b)),
                And | Or => None,
            },
            (Value::Bool(a), Value::Bool(b)) => match op {
                Eq => Some(Value::Bool(a == b)),
                Ne => Some(Value::Bool(a != b)),
                And => Some(Value::Bool(a && b)),
                Or => Some(Value::Bool(a || b)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn unary(op: UnaryOp, operand: Value) -> Option<Value> {
        match (op, operand) {
            (UnaryOp::Neg, Value::Int(v)) => v.checked_neg().map(Value::Int),
            (UnaryOp::Not, Value::Bool(v)) => Some(Value::Bool(!v)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic() {
        let v = |a, b, op| Value::binary(op, Value::Int(a), Value::Int(b));
        assert_eq!(v(2, 3, BinaryOp::Add), Some(Value::Int(5)));
        assert_eq!(v(7, 2, BinaryOp::Div), Some(Value::Int(3)));
        assert_eq!(v(-7, 2, BinaryOp::Rem), Some(Value::Int(-1)));
        assert_eq!(v(2, 3, BinaryOp::Lt), Some(Value::Bool(true)));
    }

    #[test]
    fn undefined_operations_do_not_evaluate() {
        let v = |a, b, op| Value::binary(op, Value::Int(a), Value::Int(b));
        assert_eq!(v(1, 0, BinaryOp::Div), None);
        assert_eq!(v(1, 0, BinaryOp::Rem), None);
        assert_eq!(v(i32::MAX, 1, BinaryOp::Add), None);
        assert_eq!(v(i32::MIN, -1, BinaryOp::Div), None);
        assert_eq!(Value::unary(UnaryOp::Neg, Value::Int(i32::MIN)), None);
    }

    #[test]
    fn mixed_types_do_not_evaluate() {
        assert_eq!(
            Value::binary(BinaryOp::Eq, Value::Int(1), Value::Bool(true)),
            None
        );
        assert_eq!(Value::unary(UnaryOp::Not, Value::Int(1)), None);
        assert_eq!(
            Value::binary(BinaryOp::Add, Value::Bool(true), Value::Bool(true)),
            None
        );
    }

    #[test]
    fn boolean_logic() {
        assert_eq!(
            Value::binary(BinaryOp::And, Value::Bool(true), Value::Bool(false)),
            Some(Value::Bool(false))
        );
        assert_eq!(
            Value::unary(UnaryOp::Not, Value::Bool(false)),
            Some(Value::Bool(true))
        );
    }
}
