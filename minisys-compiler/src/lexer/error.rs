use crate::error::Position;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unrecognized character {ch:?} at line {line}, column {column}")]
    UnrecognizedChar { ch: char, line: usize, column: usize },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnrecognizedChar { line, column, .. } => Position::new(*line, *column),
        }
    }
}
