//! Syntax tree to IR lowering with name resolution.
//!
//! Building runs in two passes over every file of the package. The first
//! binds each top-level declaration in the package scope, so calls may refer
//! to declarations that appear later or in another file. The second lowers
//! parameters and bodies inside a fresh scope per declaration. Nested
//! blocks and `if` branches open child scopes of their own.

use calc_common::{DiagnosticKind, Diagnostics, Pos};
use calc_parser::ast;
use tracing::debug;

use crate::object::{
    Assignment, Binary, Block, Call, Constant, DeclId, Declaration, If, Object, Package, Symbol,
    SymbolId, SymbolKind, Unary, Var, Variable,
};
use crate::scope::ScopeId;
use crate::ty::Type;
use crate::value::Value;

/// Build an IR package named `name` from the parsed `files`.
///
/// Problems are pushed into `diags` and the build carries on. A form that
/// fails to resolve becomes [`Object::Error`]; a duplicate top-level
/// declaration is reported and dropped, keeping the first one.
pub fn build(name: &str, files: &[ast::File], diags: &mut Diagnostics) -> Package {
    let mut builder = Builder {
        pkg: Package::new(name),
        diags,
        scope: ScopeId::PACKAGE,
    };

    let mut accepted = Vec::new();
    for decl in files.iter().flat_map(|f| f.decls.iter()) {
        if let Some(sym) = builder.declare(decl, accepted.len()) {
            accepted.push((decl, sym));
        }
    }
    for (decl, sym) in accepted {
        let lowered = builder.lower_decl(decl, sym);
        builder.pkg.decls.push(lowered);
    }

    debug!(
        package = name,
        decls = builder.pkg.decls.len(),
        symbols = builder.pkg.symbols.len(),
        "built package"
    );
    builder.pkg
}

struct Builder<'d> {
    pkg: Package,
    diags: &'d mut Diagnostics,
    scope: ScopeId,
}

impl Builder<'_> {
    /// Bind a declaration in the package scope. Returns `None` when the name
    /// is already taken.
    fn declare(&mut self, decl: &ast::Decl, index: usize) -> Option<SymbolId> {
        let name = &decl.name.name;
        if let Some(prev) = self.pkg.scopes.lookup_local(ScopeId::PACKAGE, name) {
            let previous = self.pkg.symbol(prev).pos;
            self.redeclared(name, previous, decl.name.pos);
            return None;
        }
        let sym = self.pkg.add_symbol(Symbol {
            name: name.clone(),
            kind: SymbolKind::Declaration(DeclId(index as u32)),
            ty: decl.ret.name.into(),
            tag: None,
            pos: decl.name.pos,
        });
        // Cannot fail: checked just above.
        let _ = self.pkg.scopes.insert(ScopeId::PACKAGE, name, sym);
        Some(sym)
    }

    fn lower_decl(&mut self, decl: &ast::Decl, sym: SymbolId) -> Declaration {
        self.scope = self.pkg.scopes.push(ScopeId::PACKAGE);

        let params = decl
            .params
            .iter()
            .map(|p| self.bind(&p.name, SymbolKind::Param, p.ty.name.into()))
            .collect();
        // The outermost block shares the declaration scope with the
        // parameters; nested blocks and `if` branches get their own.
        let body = match &decl.body {
            ast::Expr::Block { exprs, pos } => self.lower_block(exprs, *pos),
            body => self.lower(body),
        };

        let scope = self.scope;
        self.scope = ScopeId::PACKAGE;
        Declaration {
            name: decl.name.name.clone(),
            symbol: sym,
            params,
            ret: decl.ret.name.into(),
            scope,
            body,
            pos: decl.pos,
        }
    }

    /// Create a symbol and bind it in the current scope. A duplicate is
    /// reported but still gets its own symbol so the node stays well formed.
    fn bind(&mut self, ident: &ast::Ident, kind: SymbolKind, ty: Type) -> SymbolId {
        let sym = self.pkg.add_symbol(Symbol {
            name: ident.name.clone(),
            kind,
            ty,
            tag: None,
            pos: ident.pos,
        });
        if let Err(prev) = self.pkg.scopes.insert(self.scope, &ident.name, sym) {
            let previous = self.pkg.symbol(prev).pos;
            self.redeclared(&ident.name, previous, ident.pos);
        }
        sym
    }

    fn redeclared(&mut self, name: &str, previous: Pos, pos: Pos) {
        self.diags.push(
            DiagnosticKind::Redeclaration {
                name: name.to_string(),
                previous,
            },
            pos,
        );
    }

    fn resolve(&mut self, ident: &ast::Ident) -> Option<SymbolId> {
        let found = self.pkg.scopes.lookup(self.scope, &ident.name);
        if found.is_none() {
            self.diags.push(
                DiagnosticKind::UnresolvedName {
                    name: ident.name.clone(),
                },
                ident.pos,
            );
        }
        found
    }

    fn lower(&mut self, expr: &ast::Expr) -> Object {
        match expr {
            ast::Expr::Int { value, pos } => Object::Constant(Constant {
                value: Value::Int(*value),
                pos: *pos,
            }),
            ast::Expr::Bool { value, pos } => Object::Constant(Constant {
                value: Value::Bool(*value),
                pos: *pos,
            }),
            ast::Expr::Name(ident) => self.lower_name(ident),
            ast::Expr::Binary { op, lhs, rhs, pos } => Object::Binary(Binary {
                op: *op,
                lhs: Box::new(self.lower(lhs)),
                rhs: Box::new(self.lower(rhs)),
                ty: Type::Invalid,
                tag: None,
                pos: *pos,
            }),
            ast::Expr::Unary { op, operand, pos } => Object::Unary(Unary {
                op: *op,
                operand: Box::new(self.lower(operand)),
                ty: Type::Invalid,
                pos: *pos,
            }),
            ast::Expr::If {
                cond,
                ty,
                then_branch,
                else_branch,
                pos,
            } => Object::If(If {
                cond: Box::new(self.lower(cond)),
                declared: ty.map(|t| t.name.into()),
                then_branch: Box::new(self.lower_scoped(then_branch)),
                else_branch: else_branch
                    .as_ref()
                    .map(|e| Box::new(self.lower_scoped(e))),
                ty: Type::Invalid,
                tag: None,
                pos: *pos,
            }),
            ast::Expr::Var {
                name,
                ty,
                init,
                pos,
            } => {
                // The initializer cannot see the variable it initializes.
                let init = init.as_ref().map(|e| Box::new(self.lower(e)));
                let declared: Option<Type> = ty.map(|t| t.name.into());
                let symbol = self.bind(
                    name,
                    SymbolKind::Variable,
                    declared.unwrap_or(Type::Invalid),
                );
                Object::Variable(Variable {
                    name: name.name.clone(),
                    symbol,
                    declared,
                    init,
                    pos: *pos,
                })
            }
            ast::Expr::Assign { name, value, pos } => {
                let value = self.lower(value);
                let Some(target) = self.resolve(name) else {
                    return Object::Error(*pos);
                };
                if let SymbolKind::Declaration(_) = self.pkg.symbol(target).kind {
                    self.diags.push(
                        DiagnosticKind::NotAssignable {
                            name: name.name.clone(),
                        },
                        name.pos,
                    );
                    return Object::Error(*pos);
                }
                Object::Assignment(Assignment {
                    name: name.name.clone(),
                    target,
                    value: Box::new(value),
                    ty: Type::Invalid,
                    pos: *pos,
                })
            }
            ast::Expr::Call { name, args, pos } => {
                let args: Vec<Object> = args.iter().map(|a| self.lower(a)).collect();
                let Some(sym) = self.resolve(name) else {
                    return Object::Error(*pos);
                };
                let SymbolKind::Declaration(callee) = self.pkg.symbol(sym).kind else {
                    self.diags.push(
                        DiagnosticKind::NotCallable {
                            name: name.name.clone(),
                        },
                        name.pos,
                    );
                    return Object::Error(*pos);
                };
                Object::Call(Call {
                    name: name.name.clone(),
                    callee,
                    args,
                    ty: Type::Invalid,
                    pos: *pos,
                })
            }
            ast::Expr::Block { exprs, pos } => {
                self.in_child_scope(|b| b.lower_block(exprs, *pos))
            }
        }
    }

    /// Lower `expr` in a fresh child of the current scope, so variables it
    /// introduces are invisible afterwards.
    fn lower_scoped(&mut self, expr: &ast::Expr) -> Object {
        match expr {
            // A block opens its own scope already.
            ast::Expr::Block { .. } => self.lower(expr),
            _ => self.in_child_scope(|b| b.lower(expr)),
        }
    }

    fn in_child_scope(&mut self, f: impl FnOnce(&mut Self) -> Object) -> Object {
        let outer = self.scope;
        self.scope = self.pkg.scopes.push(outer);
        let obj = f(self);
        self.scope = outer;
        obj
    }

    fn lower_block(&mut self, exprs: &[ast::Expr], pos: Pos) -> Object {
        Object::Block(Block {
            exprs: exprs.iter().map(|e| self.lower(e)).collect(),
            ty: Type::Invalid,
            pos,
        })
    }

    fn lower_name(&mut self, ident: &ast::Ident) -> Object {
        let Some(symbol) = self.resolve(ident) else {
            return Object::Error(ident.pos);
        };
        if let SymbolKind::Declaration(_) = self.pkg.symbol(symbol).kind {
            self.diags.push(
                DiagnosticKind::NotAValue {
                    name: ident.name.clone(),
                },
                ident.pos,
            );
            return Object::Error(ident.pos);
        }
        Object::Var(Var {
            name: ident.name.clone(),
            symbol,
            ty: Type::Invalid,
            pos: ident.pos,
        })
    }
}
