//! Shared diagnostic and error types used by every phase of the pipeline.
//!
//! Each phase defines its own `thiserror` enum (see
//! [`crate::lexer::LexError`], [`crate::parser::SyntaxError`],
//! [`crate::ir::SemanticError`], [`crate::codegen::CodegenError`]), and
//! those are folded into [`CompileError`] here. Per spec.md §7, lexical and
//! syntax errors may either abort immediately or be collected while the
//! affected phase keeps going on a best-effort basis; semantic and internal
//! errors are always fatal.

use crate::codegen::CodegenError;
use crate::ir::SemanticError;
use crate::lexer::LexError;
use crate::parser::SyntaxError;
use thiserror::Error;

/// A source position, used by every diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The top-level error type returned by [`crate::compile`] and by each
/// phase's entry point.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Lexical(#[from] LexError),
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Semantic(#[from] SemanticError),
    #[error("{0}")]
    Codegen(#[from] CodegenError),
    #[error("compilation aborted with {} collected errors", .0.len())]
    Collected(Vec<Finding>),
}

/// One recoverable finding gathered while `collect_errors` is enabled.
#[derive(Debug, Clone)]
pub enum Finding {
    Lexical(LexError),
    Syntax(SyntaxError),
}

impl Finding {
    pub fn position(&self) -> Position {
        match self {
            Finding::Lexical(e) => e.position(),
            Finding::Syntax(e) => e.position(),
        }
    }
}

/// Accumulates recoverable errors across the lexer and parser phases when
/// `collecting` is true, instead of aborting on the first one. Semantic and
/// internal errors never go through this collector: they are always fatal
/// (spec.md §7).
#[derive(Debug, Default)]
pub struct Diagnostics {
    collecting: bool,
    findings: Vec<Finding>,
}

impl Diagnostics {
    pub fn new(collecting: bool) -> Self {
        Self {
            collecting,
            findings: Vec::new(),
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings sorted by (line, column), as spec.md §7 requires of the CLI's
    /// final report.
    pub fn sorted_findings(&self) -> Vec<&Finding> {
        let mut v: Vec<&Finding> = self.findings.iter().collect();
        v.sort_by_key(|f| {
            let p = f.position();
            (p.line, p.column)
        });
        v
    }
}
