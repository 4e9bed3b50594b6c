//! End-to-end tests for the calcc driver.
//!
//! Each test writes calc sources to a temporary directory, runs the driver
//! library, and inspects the generated file or the returned diagnostics.

use std::fs;
use std::path::{Path, PathBuf};

use calc_common::{Diagnostic, DiagnosticKind, SourceMap};
use calcc::{
    compile_dir, compile_file, compile_source, CompileError, CompileOptions, Emit, ErrorPolicy,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write source");
    path
}

fn failed<T: std::fmt::Debug>(result: Result<T, CompileError>) -> (Vec<Diagnostic>, SourceMap) {
    match result {
        Err(CompileError::Failed {
            diagnostics,
            sources,
        }) => (diagnostics, sources),
        other => panic!("expected a failed compilation, got {other:?}"),
    }
}

fn optimized() -> CompileOptions {
    CompileOptions {
        optimize: true,
        ..CompileOptions::default()
    }
}

// ── In-memory sources ──────────────────────────────────────────────────

#[test]
fn compile_source_produces_c() {
    let c = compile_source("main.calc", "(decl main (a b int) int 42)", &optimized()).unwrap();
    insta::assert_snapshot!(c, @r#"
    #include <stdio.h>
    #include <stdint.h>
    #include <stdbool.h>

    int32_t _main(int32_t _v1, int32_t _v2);

    int32_t _main(int32_t _v1, int32_t _v2) {
        return 42;
    }

    int main(void) {
        printf("%d\n", _main(0, 0));
        return 0;
    }
    "#);
}

#[test]
fn emit_ir_dumps_the_tagged_package() {
    let opts = CompileOptions {
        emit: Emit::Ir,
        ..CompileOptions::default()
    };
    let ir = compile_source("prog.calc", "(decl main (a int) int (+ a 1))", &opts).unwrap();
    insta::assert_snapshot!(ir, @r#"
    package prog
    (decl main ((a int)#1) int (+ a 1)#2)
    "#);
}

#[test]
fn every_error_in_a_file_is_reported() {
    let src = "(decl main int (+ x 1))\n(decl f bool 1)\n(decl g int (h))";
    let (diags, _) = failed(compile_source("main.calc", src, &CompileOptions::default()));
    let codes: Vec<_> = diags.iter().map(|d| d.code()).collect();
    assert_eq!(codes, vec!["E0002", "E0002", "E0004"]);
}

#[test]
fn branch_local_read_after_the_branch_is_unresolved() {
    let src = "(decl main int ((if true int (var (= a 1)) 0) a))";
    let (diags, sources) = failed(compile_source("main.calc", src, &CompileOptions::default()));
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].kind,
        DiagnosticKind::UnresolvedName { name: "a".into() }
    );
    assert_eq!(sources.location(diags[0].pos).to_string(), "main.calc:1:47");
}

#[test]
fn non_ascii_name_is_a_parse_error() {
    let src = "(decl main int ((var (= café 1)) 0))";
    let (diags, _) = failed(compile_source("main.calc", src, &CompileOptions::default()));
    assert!(!diags.is_empty());
    assert!(diags
        .iter()
        .all(|d| matches!(d.kind, DiagnosticKind::Parse(_))));
}

#[test]
fn parse_errors_stop_before_building() {
    let (diags, _) = failed(compile_source(
        "main.calc",
        "(decl main int (+ 1 2)\n(decl f int y)",
        &CompileOptions::default(),
    ));
    assert!(!diags.is_empty());
    assert!(diags.iter().all(|d| matches!(d.kind, DiagnosticKind::Parse(_))));
}

#[test]
fn missing_entry_fails() {
    let opts = CompileOptions::default();
    let (diags, _) = failed(compile_source("lib.calc", "(decl f int 1)", &opts));
    assert_eq!(
        diags.iter().map(|d| d.kind.clone()).collect::<Vec<_>>(),
        vec![DiagnosticKind::MissingEntry {
            name: "main".into()
        }]
    );
}

// ── Files ──────────────────────────────────────────────────────────────

#[test]
fn compile_file_writes_sibling_c_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = write(dir.path(), "prog.calc", "(decl main int (+ 2 3 4 5))");
    let out = compile_file(&src, &optimized()).unwrap();
    assert_eq!(out, dir.path().join("prog.c"));
    let c = fs::read_to_string(&out).unwrap();
    assert!(c.contains("int32_t _main(void) {\n    return 14;\n}\n"));
}

#[test]
fn explicit_output_path_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let src = write(dir.path(), "prog.calc", "(decl main int 1)");
    let target = dir.path().join("out.c");
    let opts = CompileOptions {
        output: Some(target.clone()),
        ..CompileOptions::default()
    };
    assert_eq!(compile_file(&src, &opts).unwrap(), target);
    assert!(target.exists());
}

#[test]
fn abort_policy_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let src = write(dir.path(), "bad.calc", "(decl main int true)");
    let (diags, sources) = failed(compile_file(&src, &CompileOptions::default()));
    assert_eq!(diags.len(), 1);
    let location = sources.location(diags[0].pos);
    assert!(location.to_string().ends_with("bad.calc:1:16"), "{location}");
    assert!(!dir.path().join("bad.c").exists());
}

#[test]
fn emit_anyway_writes_output_but_still_fails() {
    let dir = tempfile::tempdir().unwrap();
    let src = write(dir.path(), "bad.calc", "(decl main int (if true 1 false))");
    let opts = CompileOptions {
        policy: ErrorPolicy::EmitAnyway,
        ..CompileOptions::default()
    };
    let (diags, _) = failed(compile_file(&src, &opts));
    assert_eq!(diags.len(), 1);
    let c = fs::read_to_string(dir.path().join("bad.c")).unwrap();
    assert!(c.contains("int _v1 = 0;"), "{c}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.calc");
    let err = compile_file(&missing, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
    assert!(err.to_string().starts_with("failed to read"));
}

// ── Directories ────────────────────────────────────────────────────────

#[test]
fn directory_files_form_one_package() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.calc", "(decl main int (sq 3))");
    write(dir.path(), "b.calc", "(decl sq (x int) int (* x x))");
    write(dir.path(), "notes.txt", "not calc");

    let out = compile_dir(dir.path(), &CompileOptions::default()).unwrap();
    let name = dir.path().canonicalize().unwrap();
    let name = name.file_name().unwrap().to_string_lossy();
    assert_eq!(out, dir.path().join(format!("{name}.c")));

    let c = fs::read_to_string(&out).unwrap();
    assert!(c.contains("int32_t _main(void);\nint32_t _sq(int32_t _v1);\n"), "{c}");
    assert!(c.contains("    return _sq(3);\n"));
}

#[test]
fn duplicate_main_across_files_is_one_redeclaration() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.calc", "(decl main int 1)");
    write(dir.path(), "b.calc", "(decl main int 2)");

    let (diags, sources) = failed(compile_dir(dir.path(), &CompileOptions::default()));
    assert_eq!(diags.len(), 1);
    let DiagnosticKind::Redeclaration { name, previous } = &diags[0].kind else {
        panic!("expected redeclaration, got {:?}", diags[0].kind);
    };
    assert_eq!(name, "main");
    assert!(sources.location(*previous).file.ends_with("a.calc"));
    assert!(sources.location(diags[0].pos).to_string().ends_with("b.calc:1:7"));
}

#[test]
fn manifest_renames_package_and_enables_folding() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "calc.toml",
        "[package]\nname = \"demo\"\n\n[build]\noptimize = true\n",
    );
    write(dir.path(), "main.calc", "(decl main int (* (+ 1 2) 4))");

    let out = compile_dir(dir.path(), &CompileOptions::default()).unwrap();
    assert_eq!(out, dir.path().join("demo.c"));
    assert!(fs::read_to_string(&out).unwrap().contains("    return 12;\n"));
}

#[test]
fn malformed_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "calc.toml", "[build\n");
    write(dir.path(), "main.calc", "(decl main int 1)");
    let err = compile_dir(dir.path(), &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Manifest(_)), "{err:?}");
}

#[test]
fn empty_directory_has_no_sources() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile_dir(dir.path(), &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::NoSources { .. }));
}
