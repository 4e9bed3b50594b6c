//! Tagging: unique numeric identities for generated temporaries.
//!
//! Every parameter, local variable, binary node and `if` node receives a tag.
//! Tags start at [`Tagger::FIRST`] and increase by one in traversal order:
//! declarations in package order, then each declaration's parameters, then
//! a pre-order walk of its body. The counter belongs to the [`Tagger`], so
//! separate compilations never share one.

use tracing::debug;

use crate::object::{Object, Package, Stage, Symbol, Tag};

#[derive(Debug)]
pub struct Tagger {
    next: u32,
}

impl Tagger {
    pub const FIRST: u32 = 1;

    pub fn new() -> Self {
        Self { next: Self::FIRST }
    }

    fn fresh(&mut self) -> Tag {
        let tag = Tag(self.next);
        self.next += 1;
        tag
    }

    /// Assign tags to every taggable node of `pkg`, overwriting earlier tags.
    ///
    /// # Panics
    ///
    /// Panics if the package has not been type checked.
    pub fn tag(&mut self, pkg: &mut Package) {
        assert!(
            pkg.stage >= Stage::Checked,
            "package `{}` must be checked before tagging",
            pkg.name
        );
        let Package { decls, symbols, .. } = &mut *pkg;
        for decl in decls.iter_mut() {
            for param in &decl.params {
                symbols[param.0 as usize].tag = Some(self.fresh());
            }
            self.walk(&mut decl.body, symbols);
        }
        pkg.stage = Stage::Tagged;
        debug!(package = %pkg.name, tags = self.next - Self::FIRST, "tagged package");
    }

    fn walk(&mut self, obj: &mut Object, symbols: &mut [Symbol]) {
        match obj {
            Object::Constant(_) | Object::Var(_) | Object::Error(_) => {}
            Object::Binary(b) => {
                b.tag = Some(self.fresh());
                self.walk(&mut b.lhs, symbols);
                self.walk(&mut b.rhs, symbols);
            }
            Object::If(i) => {
                i.tag = Some(self.fresh());
                self.walk(&mut i.cond, symbols);
                self.walk(&mut i.then_branch, symbols);
                if let Some(e) = i.else_branch.as_mut() {
                    self.walk(e, symbols);
                }
            }
            Object::Variable(v) => {
                symbols[v.symbol.0 as usize].tag = Some(self.fresh());
                if let Some(init) = v.init.as_mut() {
                    self.walk(init, symbols);
                }
            }
            Object::Unary(u) => self.walk(&mut u.operand, symbols),
            Object::Call(c) => {
                for arg in c.args.iter_mut() {
                    self.walk(arg, symbols);
                }
            }
            Object::Block(b) => {
                for expr in b.exprs.iter_mut() {
                    self.walk(expr, symbols);
                }
            }
            Object::Assignment(a) => self.walk(&mut a.value, symbols),
        }
    }
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag `pkg` with a fresh counter.
pub fn tag(pkg: &mut Package) {
    Tagger::new().tag(pkg);
}
