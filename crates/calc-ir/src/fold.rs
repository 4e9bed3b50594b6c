//! Constant folding.
//!
//! Any operator node whose operands are all constants is replaced by a
//! constant of the same type and position. Folding is applied bottom-up, so
//! nested operator chains collapse completely. `if` is never folded, and an
//! operation that would trap or overflow at run time is left in place.

use tracing::debug;

use crate::object::{Constant, Object, Package, Stage};
use crate::value::Value;

/// Return a folded copy of `pkg`. The input is left untouched.
///
/// # Panics
///
/// Panics if the package has not been type checked, or has been tagged.
pub fn fold(pkg: &Package) -> Package {
    assert!(
        matches!(pkg.stage, Stage::Checked | Stage::Folded),
        "package `{}` must be checked and untagged before folding",
        pkg.name
    );
    let mut out = pkg.clone();
    let mut folded = 0usize;
    for decl in out.decls.iter_mut() {
        fold_object(&mut decl.body, &mut folded);
    }
    out.stage = Stage::Folded;
    debug!(package = %out.name, folded, "folded constants");
    out
}

fn fold_object(obj: &mut Object, folded: &mut usize) {
    let replacement = match obj {
        Object::Constant(_) | Object::Var(_) | Object::Error(_) => None,
        Object::Binary(b) => {
            fold_object(&mut b.lhs, folded);
            fold_object(&mut b.rhs, folded);
            match (b.lhs.as_constant(), b.rhs.as_constant()) {
                (Some(lhs), Some(rhs)) => Value::binary(b.op, lhs, rhs)
                    .filter(|v| v.ty() == b.ty)
                    .map(|value| Constant { value, pos: b.pos }),
                _ => None,
            }
        }
        Object::Unary(u) => {
            fold_object(&mut u.operand, folded);
            u.operand
                .as_constant()
                .and_then(|v| Value::unary(u.op, v))
                .filter(|v| v.ty() == u.ty)
                .map(|value| Constant { value, pos: u.pos })
        }
        Object::If(i) => {
            fold_object(&mut i.cond, folded);
            fold_object(&mut i.then_branch, folded);
            if let Some(e) = i.else_branch.as_mut() {
                fold_object(e, folded);
            }
            None
        }
        Object::Call(c) => {
            for arg in c.args.iter_mut() {
                fold_object(arg, folded);
            }
            None
        }
        Object::Block(b) => {
            for expr in b.exprs.iter_mut() {
                fold_object(expr, folded);
            }
            None
        }
        Object::Assignment(a) => {
            fold_object(&mut a.value, folded);
            None
        }
        Object::Variable(v) => {
            if let Some(init) = v.init.as_mut() {
                fold_object(init, folded);
            }
            None
        }
    };
    if let Some(constant) = replacement {
        *folded += 1;
        *obj = Object::Constant(constant);
    }
}
