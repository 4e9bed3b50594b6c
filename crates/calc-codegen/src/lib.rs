//! C code generation for the calc compiler.
//!
//! The generator makes one read-only pass over a tagged [`Package`] and
//! produces a self-contained C99 translation unit:
//!
//! - a fixed include preamble,
//! - a forward signature for every declaration, then every definition,
//! - an `int main(void)` wrapper that prints the result of `_main`.
//!
//! Declarations are named `_<name>`; parameters, locals and intermediate
//! results are named `_v<tag>`.

mod emit;
pub mod types;

use std::io;

use calc_common::{DiagnosticKind, Diagnostics, Pos};
use calc_ir::{Package, Stage};
use tracing::debug;

pub use emit::ENTRY;

/// Generate C source for `pkg` into a string.
///
/// # Panics
///
/// Panics if the package has not been tagged.
pub fn generate_string(pkg: &Package) -> (String, Diagnostics) {
    assert_eq!(
        pkg.stage(),
        Stage::Tagged,
        "package `{}` must be tagged before code generation",
        pkg.name
    );
    let mut emitter = emit::Emitter::new(pkg);
    emitter.emit_package();
    let (text, diags) = emitter.finish();
    debug!(package = %pkg.name, bytes = text.len(), "generated C");
    (text, diags)
}

/// Generate C source for `pkg` and write it to `out`.
///
/// A failing writer is reported as a diagnostic alongside anything the
/// generator itself found.
pub fn generate<W: io::Write>(pkg: &Package, out: &mut W) -> Diagnostics {
    let (text, mut diags) = generate_string(pkg);
    if let Err(err) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        diags.push(DiagnosticKind::Write(err.to_string()), Pos::default());
    }
    diags
}
