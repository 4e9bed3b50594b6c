//! Type checking.
//!
//! The checker computes a type for every node bottom-up, records it on the
//! node (or on the symbol, for variable introductions) and reports every
//! disagreement. A node whose operands are already `Invalid` becomes
//! `Invalid` silently so one mistake produces one diagnostic.

use calc_common::{DiagnosticKind, Diagnostics, MismatchContext, Pos};
use calc_parser::ast::{BinaryOp, UnaryOp};
use tracing::debug;

use crate::object::{Object, Package, Stage, Symbol};
use crate::ty::Type;

/// Parameter and return types of one declaration, indexed by `DeclId`.
struct Signature {
    name: String,
    params: Vec<Type>,
    ret: Type,
}

/// Type-check `pkg` in place, pushing problems into `diags`.
///
/// # Panics
///
/// Panics if the package has already been checked.
pub fn check(pkg: &mut Package, diags: &mut Diagnostics) {
    assert_eq!(pkg.stage, Stage::Built, "package `{}` checked twice", pkg.name);
    let before = diags.len();

    let Package { decls, symbols, .. } = &mut *pkg;
    let signatures: Vec<Signature> = decls
        .iter()
        .map(|d| Signature {
            name: d.name.clone(),
            params: d.params.iter().map(|p| symbols[p.0 as usize].ty).collect(),
            ret: d.ret,
        })
        .collect();

    let mut checker = Checker {
        symbols,
        signatures: &signatures,
        diags: &mut *diags,
    };
    for decl in decls.iter_mut() {
        let body = checker.check(&mut decl.body);
        checker.expect(decl.ret, body, MismatchContext::Return, decl.body.pos());
    }

    pkg.stage = Stage::Checked;
    debug!(
        package = %pkg.name,
        errors = diags.len() - before,
        "type checked package"
    );
}

struct Checker<'a> {
    symbols: &'a mut Vec<Symbol>,
    signatures: &'a [Signature],
    diags: &'a mut Diagnostics,
}

impl Checker<'_> {
    fn mismatch(&mut self, expected: Type, found: Type, context: MismatchContext, pos: Pos) {
        self.diags.push(
            DiagnosticKind::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                context,
            },
            pos,
        );
    }

    /// Report a mismatch unless either side is already `Invalid`. Returns
    /// whether the types agree.
    fn expect(
        &mut self,
        expected: Type,
        found: Type,
        context: MismatchContext,
        pos: Pos,
    ) -> bool {
        if !expected.is_valid() || !found.is_valid() {
            return false;
        }
        if expected != found {
            self.mismatch(expected, found, context, pos);
            return false;
        }
        true
    }

    fn check(&mut self, obj: &mut Object) -> Type {
        match obj {
            Object::Constant(c) => c.value.ty(),
            Object::Error(_) => Type::Invalid,
            Object::Var(v) => {
                v.ty = self.symbols[v.symbol.0 as usize].ty;
                v.ty
            }
            Object::Binary(b) => {
                let lhs = self.check(&mut b.lhs);
                let rhs = self.check(&mut b.rhs);
                b.ty = self.binary(b.op, lhs, rhs, b.pos);
                b.ty
            }
            Object::Unary(u) => {
                let operand = self.check(&mut u.operand);
                let wanted = match u.op {
                    UnaryOp::Neg => Type::Int,
                    UnaryOp::Not => Type::Bool,
                };
                u.ty = if self.expect(wanted, operand, MismatchContext::Operand, u.pos) {
                    wanted
                } else {
                    Type::Invalid
                };
                u.ty
            }
            Object::If(i) => {
                let cond = self.check(&mut i.cond);
                self.expect(Type::Bool, cond, MismatchContext::Condition, i.cond.pos());

                let then_ty = self.check(&mut i.then_branch);
                let mut unified = then_ty;
                if let Some(else_branch) = i.else_branch.as_mut() {
                    let else_ty = self.check(else_branch);
                    let pos = else_branch.pos();
                    if !self.expect(then_ty, else_ty, MismatchContext::Branches, pos) {
                        unified = Type::Invalid;
                    }
                }
                if let Some(declared) = i.declared {
                    if unified.is_valid()
                        && !self.expect(declared, unified, MismatchContext::Branches, i.pos)
                    {
                        unified = Type::Invalid;
                    }
                }
                i.ty = unified;
                i.ty
            }
            Object::Block(b) => {
                let mut last = Type::Invalid;
                for expr in b.exprs.iter_mut() {
                    last = self.check(expr);
                }
                b.ty = last;
                b.ty
            }
            Object::Assignment(a) => {
                let value = self.check(&mut a.value);
                let target = self.symbols[a.target.0 as usize].ty;
                a.ty = if self.expect(target, value, MismatchContext::Assignment, a.value.pos()) {
                    target
                } else {
                    Type::Invalid
                };
                a.ty
            }
            Object::Variable(v) => {
                let init = v.init.as_mut().map(|e| (self.check(e), e.pos()));
                let ty = match (v.declared, init) {
                    (Some(declared), Some((found, pos))) => {
                        self.expect(declared, found, MismatchContext::Initializer, pos);
                        declared
                    }
                    (Some(declared), None) => declared,
                    (None, Some((found, _))) => found,
                    (None, None) => Type::Invalid,
                };
                self.symbols[v.symbol.0 as usize].ty = ty;
                ty
            }
            Object::Call(c) => {
                let args: Vec<(Type, Pos)> = c
                    .args
                    .iter_mut()
                    .map(|a| (self.check(a), a.pos()))
                    .collect();
                let signatures = self.signatures;
                let sig = &signatures[c.callee.0 as usize];
                if args.len() != sig.params.len() {
                    self.diags.push(
                        DiagnosticKind::ArityMismatch {
                            name: sig.name.clone(),
                            expected: sig.params.len(),
                            found: args.len(),
                        },
                        c.pos,
                    );
                } else {
                    let pairs = args.into_iter().zip(&sig.params).enumerate();
                    for (idx, ((found, pos), expected)) in pairs {
                        self.expect(*expected, found, MismatchContext::Argument(idx), pos);
                    }
                }
                c.ty = sig.ret;
                c.ty
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: Type, rhs: Type, pos: Pos) -> Type {
        if !lhs.is_valid() || !rhs.is_valid() {
            return Type::Invalid;
        }
        if !self.expect(lhs, rhs, MismatchContext::Operand, pos) {
            return Type::Invalid;
        }
        let operand = if op.is_logical() {
            Type::Bool
        } else if op.is_equality() {
            lhs
        } else {
            Type::Int
        };
        if !self.expect(operand, lhs, MismatchContext::Operand, pos) {
            return Type::Invalid;
        }
        if op.is_arithmetic() {
            Type::Int
        } else {
            Type::Bool
        }
    }
}
