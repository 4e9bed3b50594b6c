//! The calc compiler driver.
//!
//! Ties the pipeline together: load sources into a [`SourceMap`], parse every
//! file, build one package, type check, optionally fold, tag and generate C.
//! All diagnostics of a compilation land in one collector; any diagnostic
//! fails the compilation.
//!
//! - [`compile_source`]: one in-memory source, returns the C text.
//! - [`compile_file`]: `foo.calc` to `foo.c` next to it.
//! - [`compile_dir`]: every `*.calc` file in a directory merged into one
//!   package, written to `<dir>/<dirname>.c`.

pub mod diagnostics;
pub mod logging;
pub mod manifest;

use std::fmt;
use std::path::{Path, PathBuf};

use calc_common::{Diagnostic, DiagnosticKind, Diagnostics, Pos, SourceMap};
use calc_parser::parse_file;
use tracing::{debug, info};

use manifest::Manifest;

/// Source file extension.
pub const SOURCE_EXTENSION: &str = "calc";

/// What to do when checking produced diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Produce no output.
    #[default]
    Abort,
    /// Generate output anyway; the compilation still fails.
    EmitAnyway,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    #[default]
    C,
    /// The tagged IR dump.
    Ir,
}

impl Emit {
    pub fn extension(self) -> &'static str {
        match self {
            Emit::C => "c",
            Emit::Ir => "ir",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Run the constant folder.
    pub optimize: bool,
    pub policy: ErrorPolicy,
    pub emit: Emit,
    /// Output path; defaults to a sibling of the input.
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub enum CompileError {
    /// An input could not be read.
    Io { path: PathBuf, message: String },
    /// `calc.toml` exists but is malformed.
    Manifest(String),
    /// A directory without any `.calc` files.
    NoSources { dir: PathBuf },
    /// The compilation produced diagnostics.
    Failed {
        diagnostics: Vec<Diagnostic>,
        sources: SourceMap,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Io { path, message } => {
                write!(f, "failed to read '{}': {}", path.display(), message)
            }
            CompileError::Manifest(msg) => write!(f, "{msg}"),
            CompileError::NoSources { dir } => {
                write!(f, "no '.{}' files found in '{}'", SOURCE_EXTENSION, dir.display())
            }
            CompileError::Failed { diagnostics, .. } => {
                write!(f, "compilation failed with {} error(s)", diagnostics.len())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Everything one run of the pipeline produced.
#[derive(Debug)]
pub struct Compilation {
    pub sources: SourceMap,
    pub diagnostics: Diagnostics,
    /// Generated text, absent when the error policy suppressed generation.
    pub output: Option<String>,
}

impl Compilation {
    pub fn into_result(self) -> Result<String, CompileError> {
        if self.diagnostics.has_errors() {
            return Err(self.failed());
        }
        match self.output {
            Some(text) => Ok(text),
            None => Err(self.failed()),
        }
    }

    fn failed(self) -> CompileError {
        CompileError::Failed {
            diagnostics: self.diagnostics.into_vec(),
            sources: self.sources,
        }
    }
}

/// Run the pipeline over every file in `sources` as one package.
///
/// Parse errors stop the pipeline before building regardless of the policy.
pub fn compile(name: &str, sources: SourceMap, opts: &CompileOptions) -> Compilation {
    let mut diags = Diagnostics::new();
    let files: Vec<_> = sources
        .files()
        .map(|file| {
            let parse = parse_file(&file.text, file.id);
            diags.extend(parse.diagnostics());
            debug!(file = %file.name, decls = parse.file().decls.len(), "parsed");
            parse.into_file()
        })
        .collect();
    if diags.has_errors() {
        return Compilation {
            sources,
            diagnostics: diags,
            output: None,
        };
    }

    let mut pkg = calc_ir::build(name, &files, &mut diags);
    calc_ir::check(&mut pkg, &mut diags);
    if diags.has_errors() && opts.policy == ErrorPolicy::Abort {
        info!(errors = diags.len(), "skipping code generation");
        return Compilation {
            sources,
            diagnostics: diags,
            output: None,
        };
    }

    if opts.optimize {
        pkg = calc_ir::fold(&pkg);
    }
    calc_ir::tag(&mut pkg);
    let output = match opts.emit {
        Emit::Ir => pkg.to_string(),
        Emit::C => {
            let (text, generated) = calc_codegen::generate_string(&pkg);
            diags.extend(generated);
            text
        }
    };
    Compilation {
        sources,
        diagnostics: diags,
        output: Some(output),
    }
}

/// Compile a single in-memory source named `name`.
pub fn compile_source(
    name: &str,
    text: &str,
    opts: &CompileOptions,
) -> Result<String, CompileError> {
    let mut sources = SourceMap::new();
    sources.add(name, text);
    compile(&package_name(Path::new(name)), sources, opts).into_result()
}

/// Compile one source file. Returns the path written.
pub fn compile_file(path: &Path, opts: &CompileOptions) -> Result<PathBuf, CompileError> {
    let mut sources = SourceMap::new();
    sources.add(path.display().to_string(), read(path)?);
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| path.with_extension(opts.emit.extension()));
    finish(&package_name(path), sources, &output, opts)
}

/// Compile every `.calc` file in `dir` as one package. Returns the path
/// written.
///
/// Files are merged in file-name order. A `calc.toml` in `dir` may rename the
/// package and switch on folding or the emit-anyway policy.
pub fn compile_dir(dir: &Path, opts: &CompileOptions) -> Result<PathBuf, CompileError> {
    let manifest = Manifest::find(dir).map_err(CompileError::Manifest)?;
    let mut opts = opts.clone();
    let mut name = package_name(dir);
    if let Some(manifest) = &manifest {
        opts.optimize |= manifest.build.optimize;
        if manifest.build.emit_on_error {
            opts.policy = ErrorPolicy::EmitAnyway;
        }
        if let Some(n) = manifest.package_name() {
            name = n.to_string();
        }
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_error(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if paths.is_empty() {
        return Err(CompileError::NoSources {
            dir: dir.to_path_buf(),
        });
    }

    let mut sources = SourceMap::new();
    for path in &paths {
        sources.add(path.display().to_string(), read(path)?);
    }
    debug!(dir = %dir.display(), files = sources.len(), "loaded package sources");

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| dir.join(format!("{name}.{}", opts.emit.extension())));
    finish(&name, sources, &output, &opts)
}

fn finish(
    name: &str,
    sources: SourceMap,
    output: &Path,
    opts: &CompileOptions,
) -> Result<PathBuf, CompileError> {
    let mut compilation = compile(name, sources, opts);
    if let Some(text) = &compilation.output {
        match std::fs::write(output, text) {
            Ok(()) => info!(path = %output.display(), "wrote output"),
            Err(e) => compilation.diagnostics.push(
                DiagnosticKind::Write(format!("{}: {e}", output.display())),
                Pos::default(),
            ),
        }
    }
    if compilation.diagnostics.has_errors() || compilation.output.is_none() {
        return Err(compilation.failed());
    }
    Ok(output.to_path_buf())
}

fn read(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> CompileError {
    CompileError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Package name from a file stem or directory name.
fn package_name(path: &Path) -> String {
    let named = if path.is_dir() {
        path.canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
    } else {
        path.file_stem().map(|n| n.to_string_lossy().into_owned())
    };
    named.unwrap_or_else(|| "main".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_extensions() {
        assert_eq!(Emit::C.extension(), "c");
        assert_eq!(Emit::Ir.extension(), "ir");
    }

    #[test]
    fn package_name_from_file_stem() {
        assert_eq!(package_name(Path::new("demo/prog.calc")), "prog");
        assert_eq!(package_name(Path::new("")), "main");
    }

    #[test]
    fn default_policy_aborts() {
        let opts = CompileOptions::default();
        assert_eq!(opts.policy, ErrorPolicy::Abort);
        assert!(!opts.optimize);
        assert_eq!(opts.emit, Emit::C);
    }

    #[test]
    fn error_display() {
        let err = CompileError::NoSources {
            dir: PathBuf::from("empty"),
        };
        assert_eq!(err.to_string(), "no '.calc' files found in 'empty'");
    }
}
