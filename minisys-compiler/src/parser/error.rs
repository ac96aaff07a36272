use crate::error::Position;
use crate::lexer::Token;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected token {name} ({literal:?}) at line {line}, column {column}")]
    UnexpectedToken {
        name: Rc<str>,
        literal: Rc<str>,
        line: usize,
        column: usize,
    },
    #[error("no GOTO entry for state {state} and nonterminal {symbol}")]
    MissingGoto { state: usize, symbol: Rc<str> },
    #[error("invalid semantic action {0}")]
    InvalidAction(String),
}

impl SyntaxError {
    pub fn unexpected(token: &Token) -> Self {
        SyntaxError::UnexpectedToken {
            name: token.name.clone(),
            literal: token.literal.clone(),
            line: token.line,
            column: token.column,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedToken { line, column, .. } => Position::new(*line, *column),
            SyntaxError::MissingGoto { .. } | SyntaxError::InvalidAction(_) => Position::default(),
        }
    }
}
