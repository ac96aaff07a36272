//!# minisys-compiler
//!
//! `minisys-compiler` is the translation core of a compiler from a small
//! C-like language ("MiniC") to assembly for a MIPS-family 32-bit target
//! ("Minisys"). It is a classic multi-pass pipeline, implemented as five
//! composable components:
//!
//! 1. [`automata`] — generic NFA/DFA primitives (ε-closure, subset
//!    construction, JSON serialization) shared by everything downstream.
//! 2. [`lexer`] — builds a combined DFA from a set of regex rules and runs
//!    it over source text, producing a token stream.
//! 3. [`parser`] — a table-driven LALR(1) parser that executes embedded
//!    semantic actions while reducing, producing a syntax tree.
//! 4. [`ir`] — walks the syntax tree, emits three-address quadruples,
//!    tracks scopes/types, and partitions the result into basic blocks.
//! 5. [`codegen`] — computes stack frames, tracks register/address
//!    descriptors and emits Minisys assembly per quadruple.
//!
//! Each component owns its own state for the duration of one compilation
//! and does not retain anything across calls; see
//! [`error`] for the shared diagnostic/error types used by all five.
//!
//! ## Usage
//! ```
//! use minisys_compiler::compile;
//!
//! let source = "int main() { return 0; }";
//! let artifact = compile(source, &minisys_compiler::CompileOptions::default());
//! assert!(artifact.is_ok());
//! ```

pub mod automata;
pub mod codegen;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod parser;

use crate::automata::Dfa;
use crate::codegen::CodegenOptions;
use crate::error::{CompileError, Diagnostics};
use crate::ir::IrProgram;
use crate::parser::table::ParserTables;

/// Options controlling one end-to-end [`compile`] call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Parser tables to drive the LALR(1) stage with. `None` uses the
    /// built-in bootstrap grammar for MiniC (see [`parser::bootstrap_tables`]).
    pub tables: Option<ParserTables>,
    /// Lexer DFA to scan with. `None` uses the built-in bootstrap rule set
    /// (see [`lexer::bootstrap_dfa`]); callers that regenerated a DFA from
    /// a rule file (spec.md §6's JSON schemas) pass it here instead.
    pub dfa: Option<Dfa>,
    /// Keep going past recoverable lexical/syntax errors instead of
    /// aborting on the first one (spec.md §7 "collecting mode").
    pub collect_errors: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            tables: None,
            dfa: None,
            collect_errors: false,
        }
    }
}

/// The full result of compiling one MiniC translation unit: the emitted
/// assembly text plus the IR program it was generated from (callers that
/// need to know about declared interrupt handlers, for the external
/// interrupt-vector emitter, read it off `ir.functions`).
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub assembly: String,
    pub ir: IrProgram,
}

/// Runs the whole pipeline: lex, parse, generate IR, partition into basic
/// blocks, generate code. Returns the first fatal error encountered unless
/// `options.collect_errors` is set, in which case lexical and syntax errors
/// are collected into the returned `Diagnostics` and only semantic/internal
/// errors abort immediately (matching spec.md §7's propagation rules).
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompiledUnit, CompileError> {
    let mut diagnostics = Diagnostics::new(options.collect_errors);

    let tables = match &options.tables {
        Some(t) => t.clone(),
        None => parser::bootstrap_tables(),
    };

    let dfa = match &options.dfa {
        Some(d) => d.clone(),
        None => lexer::bootstrap_dfa(),
    };
    let tokens = lexer::Lexer::new(&dfa).tokenize(source, &mut diagnostics)?;

    let tree = parser::Parser::new(&tables).parse(tokens, &mut diagnostics)?;

    if diagnostics.has_findings() {
        let findings = diagnostics.sorted_findings().into_iter().cloned().collect();
        return Err(CompileError::Collected(findings));
    }

    let mut irgen = ir::IrGenerator::new();
    let ir = irgen.generate(&tree)?;

    let asm = codegen::CodeGenerator::new(&CodegenOptions::default()).generate(&ir)?;

    Ok(CompiledUnit {
        assembly: asm,
        ir,
    })
}
