//! The calc compiler CLI.
//!
//! - `calcc build <path>` - Compile a `.calc` file, or every `.calc` file in a
//!   directory, to C
//!
//! Options:
//! - `-O`, `--optimize` - Fold constant expressions
//! - `--emit-on-error` - Write output even when checking reported errors
//! - `--emit c|ir` - Output C (default) or the tagged IR dump
//! - `--output` - Output path
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//! - `-v` - More logging; repeat for more. `CALCC_LOG` overrides.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use calcc::diagnostics::{self, DiagnosticOptions};
use calcc::{CompileError, CompileOptions, Emit, ErrorPolicy};

#[derive(Parser)]
#[command(name = "calcc", version, about = "The calc compiler")]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a calc source file or package directory to C
    Build {
        /// A `.calc` file, or a directory whose `.calc` files form one package
        path: PathBuf,

        /// Fold constant expressions before generating code
        #[arg(short = 'O', long)]
        optimize: bool,

        /// Generate output even if type checking reported errors
        #[arg(long = "emit-on-error")]
        emit_on_error: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = EmitKind::C)]
        emit: EmitKind,

        /// Output path (defaults to next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EmitKind {
    C,
    Ir,
}

impl From<EmitKind> for Emit {
    fn from(kind: EmitKind) -> Self {
        match kind {
            EmitKind::C => Emit::C,
            EmitKind::Ir => Emit::Ir,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            path,
            optimize,
            emit_on_error,
            emit,
            output,
            json,
            no_color,
        } => {
            let diag_opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            calcc::logging::init(cli.verbose, diag_opts.color);

            let options = CompileOptions {
                optimize,
                policy: if emit_on_error {
                    ErrorPolicy::EmitAnyway
                } else {
                    ErrorPolicy::Abort
                },
                emit: emit.into(),
                output,
            };
            if let Err(e) = build(&path, &options, &diag_opts) {
                if json {
                    // In JSON mode, emit the final error as JSON too.
                    let msg = serde_json::json!({
                        "code": "C0001",
                        "severity": "error",
                        "message": e,
                        "spans": [],
                    });
                    eprintln!("{}", msg);
                } else {
                    eprintln!("error: {}", e);
                }
                process::exit(1);
            }
        }
    }
}

/// Compile `path` as a file or a directory and report the outcome.
fn build(
    path: &Path,
    options: &CompileOptions,
    diag_opts: &DiagnosticOptions,
) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Path '{}' does not exist", path.display()));
    }

    let result = if path.is_dir() {
        calcc::compile_dir(path, options)
    } else {
        calcc::compile_file(path, options)
    };

    match result {
        Ok(written) => {
            eprintln!("  Compiled: {}", written.display());
            Ok(())
        }
        Err(CompileError::Failed {
            diagnostics: diags,
            sources,
        }) => {
            for diag in &diags {
                eprint!("{}", diagnostics::render(diag, &sources, diag_opts));
            }
            Err(format!(
                "Compilation failed due to {} error(s) above.",
                diags.len()
            ))
        }
        Err(other) => Err(other.to_string()),
    }
}
