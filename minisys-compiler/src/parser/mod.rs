//! # Parser
//!
//! A table-driven LALR(1) parser (spec.md §4.3): [`table::ParserTables`]
//! holds the ACTION/GOTO tables and production list, [`driver::Parser`]
//! drives them over a token stream, and [`action`] interprets each
//! production's optional semantic action, producing a
//! [`tree::SyntaxTreeNode`].

mod action;
mod driver;
mod error;
pub mod json;
pub mod table;
mod tree;

pub use driver::Parser;
pub use error::SyntaxError;
pub use json::{parse_parser_tables_json, TableJsonError};
pub use table::bootstrap_tables;
pub use tree::SyntaxTreeNode;
