//! C emission for a tagged package.
//!
//! Lowering an expression returns the C expression that denotes its value:
//! a literal, a temporary name or a call. Nodes that own a temporary
//! (`Binary`, `If`, `Variable`) first append the statements that compute it
//! to the current function body.
//!
//! Operands are evaluated once, left to right. A variable read or call that
//! a later operand's statements could overwrite or overtake is copied into
//! a spill temporary `_tN` before the later operand is lowered.

use std::fmt::Write as _;

use calc_common::{DiagnosticKind, Diagnostics, Pos};
use calc_ir::{Declaration, Object, Package, Tag, Value};

use crate::types::{c_type, zero_value};

/// Name of the declaration the entry wrapper calls.
pub const ENTRY: &str = "main";

const PREAMBLE: &str = "#include <stdio.h>\n#include <stdint.h>\n#include <stdbool.h>\n";
const INDENT: &str = "    ";

pub(crate) struct Emitter<'p> {
    pkg: &'p Package,
    out: String,
    depth: usize,
    spills: u32,
    diags: Diagnostics,
}

impl<'p> Emitter<'p> {
    pub(crate) fn new(pkg: &'p Package) -> Self {
        Self {
            pkg,
            out: String::new(),
            depth: 0,
            spills: 0,
            diags: Diagnostics::new(),
        }
    }

    pub(crate) fn finish(self) -> (String, Diagnostics) {
        (self.out, self.diags)
    }

    pub(crate) fn emit_package(&mut self) {
        let pkg = self.pkg;
        self.out.push_str(PREAMBLE);
        self.out.push('\n');

        for decl in &pkg.decls {
            let sig = self.signature(decl);
            self.line(&format!("{sig};"));
        }
        for decl in &pkg.decls {
            self.out.push('\n');
            self.emit_decl(decl);
        }
        self.out.push('\n');
        self.emit_entry();
    }

    fn signature(&mut self, decl: &Declaration) -> String {
        let pkg = self.pkg;
        let params: Vec<String> = decl
            .params
            .iter()
            .map(|p| {
                let sym = pkg.symbol(*p);
                let name = self.temp(sym.tag, sym.pos);
                format!("{} {}", c_type(sym.ty), name)
            })
            .collect();
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        format!("{} _{}({})", c_type(decl.ret), decl.name, params)
    }

    fn emit_decl(&mut self, decl: &Declaration) {
        let sig = self.signature(decl);
        self.line(&format!("{sig} {{"));
        self.depth += 1;
        let result = self.expr(&decl.body);
        self.line(&format!("return {result};"));
        self.depth -= 1;
        self.line("}");
    }

    fn emit_entry(&mut self) {
        let pkg = self.pkg;
        let Some(entry) = pkg.lookup(ENTRY) else {
            self.diags.push(
                DiagnosticKind::MissingEntry {
                    name: ENTRY.to_string(),
                },
                Pos::default(),
            );
            return;
        };
        // Parameters of the entry declaration receive zero.
        let args: Vec<&str> = entry
            .params
            .iter()
            .map(|p| zero_value(pkg.symbol(*p).ty))
            .collect();
        self.line("int main(void) {");
        self.depth += 1;
        self.line(&format!(
            "printf(\"%d\\n\", _{}({}));",
            entry.name,
            args.join(", ")
        ));
        self.line("return 0;");
        self.depth -= 1;
        self.line("}");
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn expr(&mut self, obj: &Object) -> String {
        let pkg = self.pkg;
        match obj {
            Object::Constant(c) => literal(c.value),
            Object::Var(v) => {
                let sym = pkg.symbol(v.symbol);
                self.temp(sym.tag, v.pos)
            }
            Object::Binary(b) => {
                let values = self.operands(&[&*b.lhs, &*b.rhs]);
                let (lhs, rhs) = (&values[0], &values[1]);
                let name = self.temp(b.tag, b.pos);
                self.line(&format!("{} {name} = {lhs} {} {rhs};", c_type(b.ty), b.op));
                name
            }
            Object::Unary(u) => {
                let operand = self.expr(&u.operand);
                format!("{}({operand})", u.op)
            }
            Object::Call(c) => {
                let args: Vec<&Object> = c.args.iter().collect();
                let args = self.operands(&args);
                format!("_{}({})", c.name, args.join(", "))
            }
            Object::If(i) => {
                let name = self.temp(i.tag, i.pos);
                self.line(&format!("{} {name} = {};", c_type(i.ty), zero_value(i.ty)));
                let cond = self.expr(&i.cond);
                self.line(&format!("if ({cond}) {{"));
                self.branch(&name, &i.then_branch);
                if let Some(else_branch) = &i.else_branch {
                    self.line("} else {");
                    self.branch(&name, else_branch);
                }
                self.line("}");
                name
            }
            Object::Block(b) => {
                let Some((last, init)) = b.exprs.split_last() else {
                    return self.unreachable("empty block", b.pos);
                };
                for expr in init {
                    let value = self.expr(expr);
                    // A discarded call still runs for its effects.
                    if value_calls(expr) {
                        self.line(&format!("{value};"));
                    }
                }
                self.expr(last)
            }
            Object::Assignment(a) => {
                let value = self.expr(&a.value);
                let target = pkg.symbol(a.target);
                let name = self.temp(target.tag, a.pos);
                self.line(&format!("{name} = {value};"));
                name
            }
            Object::Variable(v) => {
                let init = match &v.init {
                    Some(init) => self.expr(init),
                    None => zero_value(pkg.symbol(v.symbol).ty).to_string(),
                };
                let sym = pkg.symbol(v.symbol);
                let name = self.temp(sym.tag, v.pos);
                self.line(&format!("{} {name} = {init};", c_type(sym.ty)));
                name
            }
            Object::Error(pos) => self.unreachable("unresolved form", *pos),
        }
    }

    /// Lower sibling operands left to right, spilling any whose value a
    /// later sibling could change or reorder.
    fn operands(&mut self, objs: &[&Object]) -> Vec<String> {
        let mut values = Vec::with_capacity(objs.len());
        for (i, obj) in objs.iter().enumerate() {
            let value = self.expr(obj);
            if must_spill(obj, &objs[i + 1..]) {
                values.push(self.spill(obj, &value));
            } else {
                values.push(value);
            }
        }
        values
    }

    fn spill(&mut self, obj: &Object, value: &str) -> String {
        self.spills += 1;
        let name = format!("_t{}", self.spills);
        let ty = obj.ty(&self.pkg.symbols);
        self.line(&format!("{} {name} = {value};", c_type(ty)));
        name
    }

    fn branch(&mut self, target: &str, obj: &Object) {
        self.depth += 1;
        let value = self.expr(obj);
        self.line(&format!("{target} = {value};"));
        self.depth -= 1;
    }

    /// The temporary backing a tagged node.
    fn temp(&mut self, tag: Option<Tag>, pos: Pos) -> String {
        match tag {
            Some(Tag(n)) => format!("_v{n}"),
            None => self.unreachable("untagged node", pos),
        }
    }

    fn unreachable(&mut self, what: &str, pos: Pos) -> String {
        self.diags.push(
            DiagnosticKind::InternalUnreachable {
                what: what.to_string(),
            },
            pos,
        );
        "0".to_string()
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        // Writing to a String cannot fail.
        let _ = writeln!(self.out, "{text}");
    }
}

// ── Evaluation order ───────────────────────────────────────────────────

fn must_spill(earlier: &Object, later: &[&Object]) -> bool {
    (reads_variable(earlier) && later.iter().any(|o| assigns(o)))
        || (value_calls(earlier) && later.iter().any(|o| emits_statements(o) || calls(o)))
}

/// Whether the C value of `obj` names a parameter or local.
fn reads_variable(obj: &Object) -> bool {
    match obj {
        Object::Var(_) | Object::Assignment(_) | Object::Variable(_) => true,
        Object::Unary(u) => reads_variable(&u.operand),
        Object::Call(c) => c.args.iter().any(reads_variable),
        Object::Block(b) => b.exprs.last().is_some_and(reads_variable),
        Object::Constant(_) | Object::Binary(_) | Object::If(_) | Object::Error(_) => false,
    }
}

/// Whether the C value of `obj` still contains a call to be made.
fn value_calls(obj: &Object) -> bool {
    match obj {
        Object::Call(_) => true,
        Object::Unary(u) => value_calls(&u.operand),
        Object::Block(b) => b.exprs.last().is_some_and(value_calls),
        _ => false,
    }
}

/// Whether lowering `obj` appends any statement.
fn emits_statements(obj: &Object) -> bool {
    match obj {
        Object::Binary(_) | Object::If(_) | Object::Variable(_) | Object::Assignment(_) => true,
        Object::Constant(_) | Object::Var(_) | Object::Error(_) => false,
        Object::Unary(u) => emits_statements(&u.operand),
        Object::Call(c) => c.args.iter().any(emits_statements),
        Object::Block(b) => match b.exprs.split_last() {
            Some((last, init)) => {
                emits_statements(last)
                    || init.iter().any(|e| emits_statements(e) || value_calls(e))
            }
            None => false,
        },
    }
}

/// Whether `obj` contains a node matching `pred`.
fn contains(obj: &Object, pred: fn(&Object) -> bool) -> bool {
    if pred(obj) {
        return true;
    }
    match obj {
        Object::Constant(_) | Object::Var(_) | Object::Error(_) => false,
        Object::Binary(b) => contains(&b.lhs, pred) || contains(&b.rhs, pred),
        Object::Unary(u) => contains(&u.operand, pred),
        Object::Call(c) => c.args.iter().any(|a| contains(a, pred)),
        Object::If(i) => {
            contains(&i.cond, pred)
                || contains(&i.then_branch, pred)
                || i.else_branch.as_deref().is_some_and(|e| contains(e, pred))
        }
        Object::Block(b) => b.exprs.iter().any(|e| contains(e, pred)),
        Object::Assignment(a) => contains(&a.value, pred),
        Object::Variable(v) => v.init.as_deref().is_some_and(|e| contains(e, pred)),
    }
}

fn assigns(obj: &Object) -> bool {
    contains(obj, |o| matches!(o, Object::Assignment(_)))
}

fn calls(obj: &Object) -> bool {
    contains(obj, |o| matches!(o, Object::Call(_)))
}

fn literal(value: Value) -> String {
    match value {
        // `-2147483648` is a negated `long` constant in C.
        Value::Int(i32::MIN) => "(-2147483647 - 1)".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
    }
}
