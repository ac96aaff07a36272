//! Loads the LALR table JSON format (spec.md §6) produced by an external
//! grammar/lex toolchain into [`ParserTables`]. Mirrors
//! [`crate::automata::json`]'s role for the lexer stage: the core never
//! generates these tables itself, only consumes them.

use super::table::{ActionEntry, ParserTables, Production};
use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableJsonError {
    #[error("symbol index {0} out of range")]
    SymbolIndexOutOfRange(usize),
    #[error("state index {0} out of range")]
    StateIndexOutOfRange(usize),
    #[error("unrecognized ACTIONTable entry type '{0}'")]
    UnrecognizedActionType(String),
    #[error("malformed table JSON: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct SymbolJson {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    content: String,
}

#[derive(Deserialize)]
struct ProducerJson {
    _lhs: usize,
    _rhs: Vec<usize>,
    _action: Option<String>,
}

#[derive(Deserialize)]
struct ActionCellJson {
    #[serde(rename = "type")]
    kind: String,
    data: i64,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
struct DfaStartJson {
    _startStateId: usize,
}

#[derive(Deserialize)]
struct TableJson {
    #[allow(dead_code)]
    desc: Option<String>,
    symbols: Vec<SymbolJson>,
    producers: Vec<ProducerJson>,
    #[serde(rename = "ACTIONTable")]
    action_table: Vec<Vec<ActionCellJson>>,
    #[serde(rename = "GOTOTable")]
    goto_table: Vec<Vec<i64>>,
    dfa: DfaStartJson,
}

pub fn parse_parser_tables_json(text: &str) -> Result<ParserTables, TableJsonError> {
    let raw: TableJson =
        serde_json::from_str(text).map_err(|e| TableJsonError::Malformed(e.to_string()))?;

    let symbol_name = |i: usize| -> Result<Rc<str>, TableJsonError> {
        raw.symbols
            .get(i)
            .map(|s| Rc::from(s.content.as_str()))
            .ok_or(TableJsonError::SymbolIndexOutOfRange(i))
    };

    let mut productions = Vec::with_capacity(raw.producers.len());
    for p in &raw.producers {
        let lhs = symbol_name(p._lhs)?;
        let rhs = p._rhs.iter().map(|&i| symbol_name(i)).collect::<Result<Vec<_>, _>>()?;
        productions.push(Production {
            lhs,
            rhs,
            action: p._action.as_ref().map(|a| Rc::from(a.as_str())),
        });
    }

    let mut action = HashMap::new();
    for (state, row) in raw.action_table.iter().enumerate() {
        for (sym_idx, cell) in row.iter().enumerate() {
            let entry = match cell.kind.as_str() {
                "shift" => ActionEntry::Shift(cell.data as usize),
                "reduce" => ActionEntry::Reduce(cell.data as usize),
                "acc" => ActionEntry::Accept,
                "none" => continue,
                other => return Err(TableJsonError::UnrecognizedActionType(other.to_string())),
            };
            action.insert((state, symbol_name(sym_idx)?), entry);
        }
    }

    let mut goto = HashMap::new();
    for (state, row) in raw.goto_table.iter().enumerate() {
        for (sym_idx, &next) in row.iter().enumerate() {
            if next < 0 {
                continue;
            }
            goto.insert((state, symbol_name(sym_idx)?), next as usize);
        }
    }

    if raw.dfa._startStateId >= raw.action_table.len().max(1) && !raw.action_table.is_empty() {
        return Err(TableJsonError::StateIndexOutOfRange(raw.dfa._startStateId));
    }

    Ok(ParserTables {
        start_state: raw.dfa._startStateId,
        productions,
        action,
        goto,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_table() {
        let json = r#"{
            "desc": "toy",
            "symbols": [
                {"type": "nonterminal", "content": "Program"},
                {"type": "terminal", "content": "$END"}
            ],
            "producers": [
                {"_lhs": 0, "_rhs": [], "_action": null}
            ],
            "ACTIONTable": [
                [{"type": "none", "data": 0}, {"type": "acc", "data": 0}]
            ],
            "GOTOTable": [
                [-1, -1]
            ],
            "dfa": {"_startStateId": 0}
        }"#;
        let tables = parse_parser_tables_json(json).unwrap();
        assert_eq!(tables.start_state, 0);
        assert_eq!(tables.productions.len(), 1);
        assert_eq!(tables.action_for(0, "$END"), Some(ActionEntry::Accept));
    }

    #[test]
    fn rejects_unknown_action_kind() {
        let json = r#"{
            "symbols": [{"type": "terminal", "content": "A"}],
            "producers": [],
            "ACTIONTable": [[{"type": "bogus", "data": 0}]],
            "GOTOTable": [[-1]],
            "dfa": {"_startStateId": 0}
        }"#;
        assert!(matches!(
            parse_parser_tables_json(json),
            Err(TableJsonError::UnrecognizedActionType(_))
        ));
    }
}
