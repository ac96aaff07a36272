//! Command-line driver for the MiniC -> Minisys compiler (spec.md §1, §6):
//! thin consumer of `minisys-compiler`'s artifacts, implementing the pieces
//! the core explicitly leaves to external collaborators — the `#include`
//! preprocessor, file I/O, and the interrupt vector/handler emitter.

mod error;
mod interrupt;
mod preprocess;

use clap::{Parser as ClapParser, Subcommand};
use error::CliError;
use minisys_compiler::error::{CompileError, Finding};
use minisys_compiler::{compile, CompileOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, ClapParser)]
#[command(name = "minisyscc", about = "MiniC -> Minisys compiler driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a MiniC source file to Minisys assembly.
    Compile {
        source: PathBuf,
        /// Directory to write the output into (default: alongside the source file).
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
        /// Keep going past recoverable lexical/syntax errors and report all of them at the end.
        #[arg(short = 'i', long)]
        ignore_errors: bool,
        /// Print each pipeline stage's progress to stderr.
        #[arg(short, long)]
        verbose: bool,
        /// Load a regenerated lexer DFA / parser table from `<source-stem>.lexer.json` /
        /// `<source-stem>.table.json` next to the source instead of the built-in bootstrap ones.
        #[arg(long)]
        regenerate: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Command::Compile {
        source,
        out_dir,
        ignore_errors,
        verbose,
        regenerate,
    } = &cli.command;

    match run_compile(source, out_dir.as_deref(), *ignore_errors, *verbose, *regenerate) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_compile(
    source: &Path,
    out_dir: Option<&Path>,
    ignore_errors: bool,
    verbose: bool,
    regenerate: bool,
) -> Result<(), CliError> {
    let raw = fs::read_to_string(source).map_err(|e| CliError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let base_dir = source.parent().unwrap_or_else(|| Path::new("."));
    let text = preprocess::preprocess(&raw, base_dir)?;
    if verbose {
        eprintln!("preprocessed {} ({} bytes)", source.display(), text.len());
    }

    let mut options = CompileOptions {
        collect_errors: ignore_errors,
        ..CompileOptions::default()
    };
    if regenerate {
        if let Some(dfa) = try_load_dfa(source, verbose)? {
            options.dfa = Some(dfa);
        }
        if let Some(tables) = try_load_tables(source, verbose)? {
            options.tables = Some(tables);
        }
    }

    let unit = compile(&text, &options)?;

    let out_dir = out_dir.unwrap_or(base_dir);
    fs::create_dir_all(out_dir).map_err(|e| CliError::Write {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "out".to_string());
    let asm_path = out_dir.join(format!("{stem}.asm"));
    fs::write(&asm_path, &unit.assembly).map_err(|e| CliError::Write {
        path: asm_path.clone(),
        source: e,
    })?;
    if verbose {
        eprintln!("wrote {}", asm_path.display());
    }

    if let Some(unit) = interrupt::build(&unit.ir, &unit.assembly) {
        let entry_path = out_dir.join("minisys-interrupt-entry.asm");
        let handler_path = out_dir.join("minisys-interrupt-handler.asm");
        fs::write(&entry_path, &unit.entry).map_err(|e| CliError::Write {
            path: entry_path.clone(),
            source: e,
        })?;
        fs::write(&handler_path, &unit.handler).map_err(|e| CliError::Write {
            path: handler_path.clone(),
            source: e,
        })?;
        if verbose {
            eprintln!("wrote {} and {}", entry_path.display(), handler_path.display());
        }
    }

    Ok(())
}

fn try_load_dfa(source: &Path, verbose: bool) -> Result<Option<minisys_compiler::automata::Dfa>, CliError> {
    let path = source.with_extension("lexer.json");
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| CliError::Read {
        path: path.clone(),
        source: e,
    })?;
    let dfa = minisys_compiler::automata::json::parse_dfa_json(&text)?;
    if verbose {
        eprintln!("regenerated lexer DFA from {}", path.display());
    }
    Ok(Some(dfa))
}

fn try_load_tables(
    source: &Path,
    verbose: bool,
) -> Result<Option<minisys_compiler::parser::table::ParserTables>, CliError> {
    let path = source.with_extension("table.json");
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| CliError::Read {
        path: path.clone(),
        source: e,
    })?;
    let tables = minisys_compiler::parser::parse_parser_tables_json(&text)?;
    if verbose {
        eprintln!("regenerated parser tables from {}", path.display());
    }
    Ok(Some(tables))
}

/// Prints errors grouped by (line, column) order, per spec.md §7.
fn report(error: &CliError) {
    if let CliError::Compile(CompileError::Collected(findings)) = error {
        for finding in findings {
            let position = finding.position();
            match finding {
                Finding::Lexical(e) => eprintln!("{}:{}: {e}", position.line, position.column),
                Finding::Syntax(e) => eprintln!("{}:{}: {e}", position.line, position.column),
            }
        }
        return;
    }
    eprintln!("error: {error}");
}
