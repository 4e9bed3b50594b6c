mod common;

use calc_common::{DiagnosticKind, MismatchContext};
use calc_ir::{Object, Stage, Type};
use common::{body, check_src, checked, kinds, messages};

fn mismatch(expected: &str, found: &str, context: MismatchContext) -> DiagnosticKind {
    DiagnosticKind::TypeMismatch {
        expected: expected.into(),
        found: found.into(),
        context,
    }
}

// ── Well-typed programs ────────────────────────────────────────────────

#[test]
fn well_typed_programs_check_cleanly() {
    for src in [
        "(decl main (a b int) int 42)",
        "(decl main int (+ 2 3 4 5))",
        "(decl main int -24)",
        "(decl main (a int) int ((= a 42) a))",
        "(decl main int (if (== 1 1) int 1 0))",
        "(decl main int ((var a int) a))",
        "(decl main int ((var (= a 42)) a))",
        "(decl main bool (&& (< 1 2) (!= true false)))",
        "(decl main int (fn 2 3))\n(decl fn (a b int) int (* a b))",
    ] {
        let pkg = checked(src);
        assert_eq!(pkg.stage(), Stage::Checked);
    }
}

#[test]
fn node_types_are_recorded() {
    let pkg = checked("(decl main bool (< (+ 1 2) 4))");
    let Object::Binary(cmp) = body(&pkg, "main") else {
        panic!("expected binary");
    };
    assert_eq!(cmp.ty, Type::Bool);
    assert_eq!(cmp.lhs.ty(&pkg.symbols), Type::Int);
}

#[test]
fn untyped_variable_takes_initializer_type() {
    let pkg = checked("(decl main bool ((var (= ok (> 3 2))) ok))");
    let Object::Block(block) = body(&pkg, "main") else {
        panic!("expected block");
    };
    let Object::Variable(var) = &block.exprs[0] else {
        panic!("expected variable");
    };
    assert_eq!(pkg.symbol(var.symbol).ty, Type::Bool);
    assert_eq!(block.ty, Type::Bool);
}

#[test]
fn assignment_evaluates_to_target_type() {
    let pkg = checked("(decl main (a int) int (= a 7))");
    assert_eq!(body(&pkg, "main").ty(&pkg.symbols), Type::Int);
}

// ── Mismatches ─────────────────────────────────────────────────────────

#[test]
fn operands_must_agree() {
    let (_, diags) = check_src("(decl main int (+ 1 true))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("int", "bool", MismatchContext::Operand)]
    );
}

#[test]
fn arithmetic_needs_integers() {
    let (_, diags) = check_src("(decl main int (+ true false))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("int", "bool", MismatchContext::Operand)]
    );
}

#[test]
fn logic_needs_booleans() {
    let (_, diags) = check_src("(decl main bool (&& 1 2))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("bool", "int", MismatchContext::Operand)]
    );
}

#[test]
fn unary_operand_types() {
    let (_, diags) = check_src("(decl a int (- true))\n(decl b bool (! 1))");
    assert_eq!(
        kinds(&diags),
        vec![
            mismatch("int", "bool", MismatchContext::Operand),
            mismatch("bool", "int", MismatchContext::Operand),
        ]
    );
}

#[test]
fn condition_must_be_bool() {
    let (_, diags) = check_src("(decl main int (if 1 int 2 3))");
    assert_eq!(
        messages(&diags),
        vec!["type mismatch in condition: expected bool, found int"]
    );
}

#[test]
fn branches_must_agree() {
    let (pkg, diags) = check_src("(decl main int (if true 1 false))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("int", "bool", MismatchContext::Branches)]
    );
    assert_eq!(body(&pkg, "main").ty(&pkg.symbols), Type::Invalid);
}

#[test]
fn branches_must_match_declared_type() {
    let (_, diags) = check_src("(decl main int (if true bool 1 2))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("bool", "int", MismatchContext::Branches)]
    );
}

#[test]
fn body_must_match_return_type() {
    let (_, diags) = check_src("(decl main int true)");
    assert_eq!(
        messages(&diags),
        vec!["type mismatch in return value: expected int, found bool"]
    );
}

#[test]
fn assignment_must_match_target() {
    let (_, diags) = check_src("(decl main (a int) int ((= a true) a))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("int", "bool", MismatchContext::Assignment)]
    );
}

#[test]
fn initializer_must_match_declared_type() {
    let (_, diags) = check_src("(decl main int ((var (= a true) int) a))");
    assert_eq!(
        kinds(&diags),
        vec![mismatch("int", "bool", MismatchContext::Initializer)]
    );
}

#[test]
fn call_arity() {
    let (_, diags) = check_src("(decl f (a int) int a)\n(decl main int (f 1 2))");
    assert_eq!(
        kinds(&diags),
        vec![DiagnosticKind::ArityMismatch {
            name: "f".into(),
            expected: 1,
            found: 2,
        }]
    );
}

#[test]
fn call_argument_types() {
    let (_, diags) = check_src("(decl f (a int b bool) int a)\n(decl main int (f 1 2))");
    assert_eq!(
        messages(&diags),
        vec!["type mismatch in argument 2: expected bool, found int"]
    );
}

// ── Error accumulation ─────────────────────────────────────────────────

#[test]
fn invalid_operands_do_not_cascade() {
    let (_, diags) = check_src("(decl main int (+ (+ 1 true) 2))");
    assert_eq!(diags.len(), 1);
}

#[test]
fn unresolved_names_do_not_cascade() {
    let (_, diags) = check_src("(decl main int (* (+ x 1) 2))");
    assert_eq!(messages(&diags), vec!["unresolved name `x`"]);
}

#[test]
fn independent_errors_are_all_reported() {
    let (_, diags) = check_src(
        "(decl a int (+ 1 true))\n(decl b bool 1)\n(decl c int (if 1 int 2 3))",
    );
    assert_eq!(diags.len(), 3);
}

#[test]
#[should_panic(expected = "checked twice")]
fn checking_twice_panics() {
    let mut pkg = checked("(decl main int 1)");
    let mut diags = calc_common::Diagnostics::new();
    calc_ir::check(&mut pkg, &mut diags);
}
