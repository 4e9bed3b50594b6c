//! Textual IR dump in calc's own s-expression syntax.
//!
//! Tagged nodes are suffixed with `#N`. Variable introductions print the
//! type the checker settled on, so the dump shows inference results.

use std::fmt;

use crate::object::{Object, Package, Tag};

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.name)?;
        for decl in &self.decls {
            write!(f, "(decl {} (", decl.name)?;
            for (i, param) in decl.params.iter().enumerate() {
                let sym = self.symbol(*param);
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "({} {})", sym.name, sym.ty)?;
                write_tag(f, sym.tag)?;
            }
            write!(f, ") {} ", decl.ret)?;
            write_object(self, &decl.body, f)?;
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

fn write_tag(f: &mut fmt::Formatter<'_>, tag: Option<Tag>) -> fmt::Result {
    match tag {
        Some(Tag(n)) => write!(f, "#{n}"),
        None => Ok(()),
    }
}

fn write_object(pkg: &Package, obj: &Object, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match obj {
        Object::Constant(c) => write!(f, "{}", c.value),
        Object::Var(v) => write!(f, "{}", v.name),
        Object::Error(_) => write!(f, "<error>"),
        Object::Binary(b) => {
            write!(f, "({} ", b.op)?;
            write_object(pkg, &b.lhs, f)?;
            write!(f, " ")?;
            write_object(pkg, &b.rhs, f)?;
            write!(f, ")")?;
            write_tag(f, b.tag)
        }
        Object::Unary(u) => {
            write!(f, "({} ", u.op)?;
            write_object(pkg, &u.operand, f)?;
            write!(f, ")")
        }
        Object::Call(c) => {
            write!(f, "({}", c.name)?;
            for arg in &c.args {
                write!(f, " ")?;
                write_object(pkg, arg, f)?;
            }
            write!(f, ")")
        }
        Object::If(i) => {
            write!(f, "(if ")?;
            write_object(pkg, &i.cond, f)?;
            if let Some(ty) = i.declared {
                write!(f, " {ty}")?;
            }
            write!(f, " ")?;
            write_object(pkg, &i.then_branch, f)?;
            if let Some(e) = &i.else_branch {
                write!(f, " ")?;
                write_object(pkg, e, f)?;
            }
            write!(f, ")")?;
            write_tag(f, i.tag)
        }
        Object::Block(b) => {
            write!(f, "(")?;
            for (i, expr) in b.exprs.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_object(pkg, expr, f)?;
            }
            write!(f, ")")
        }
        Object::Assignment(a) => {
            write!(f, "(= {} ", a.name)?;
            write_object(pkg, &a.value, f)?;
            write!(f, ")")
        }
        Object::Variable(v) => {
            let sym = pkg.symbol(v.symbol);
            match &v.init {
                Some(init) => {
                    write!(f, "(var (= {} ", v.name)?;
                    write_object(pkg, init, f)?;
                    write!(f, ") {})", sym.ty)?;
                }
                None => write!(f, "(var {} {})", v.name, sym.ty)?,
            }
            write_tag(f, sym.tag)
        }
    }
}
