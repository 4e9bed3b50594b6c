#![allow(dead_code)]

use calc_common::{DiagnosticKind, Diagnostics, FileId};
use calc_ir::{Object, Package};
use calc_parser::{ast, parse_file};

/// Parse each source as its own file, in order.
pub fn parse_all(sources: &[&str]) -> Vec<ast::File> {
    sources
        .iter()
        .enumerate()
        .map(|(i, src)| {
            let parse = parse_file(src, FileId(i as u32));
            assert!(parse.ok(), "parse errors in {src:?}: {:?}", parse.errors());
            parse.into_file()
        })
        .collect()
}

pub fn build_files(sources: &[&str]) -> (Package, Diagnostics) {
    let mut diags = Diagnostics::new();
    let pkg = calc_ir::build("main", &parse_all(sources), &mut diags);
    (pkg, diags)
}

pub fn build_src(src: &str) -> (Package, Diagnostics) {
    build_files(&[src])
}

/// Build and check; returns the checked package and every diagnostic.
pub fn check_src(src: &str) -> (Package, Diagnostics) {
    let (mut pkg, mut diags) = build_src(src);
    calc_ir::check(&mut pkg, &mut diags);
    (pkg, diags)
}

/// Build and check, asserting the program is well formed.
pub fn checked(src: &str) -> Package {
    let (pkg, diags) = check_src(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    pkg
}

pub fn kinds(diags: &Diagnostics) -> Vec<DiagnosticKind> {
    diags.iter().map(|d| d.kind.clone()).collect()
}

pub fn messages(diags: &Diagnostics) -> Vec<String> {
    diags.iter().map(|d| d.to_string()).collect()
}

pub fn body<'a>(pkg: &'a Package, name: &str) -> &'a Object {
    &pkg.lookup(name).expect("declaration exists").body
}
