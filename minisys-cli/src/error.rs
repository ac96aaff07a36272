use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("{0}")]
    Compile(#[from] minisys_compiler::error::CompileError),
    #[error("{0}")]
    DfaJson(#[from] minisys_compiler::automata::json::DfaJsonError),
    #[error("{0}")]
    TableJson(#[from] minisys_compiler::parser::TableJsonError),
}
