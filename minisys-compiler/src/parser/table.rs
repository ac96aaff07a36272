//! LALR(1) ACTION/GOTO tables plus the grammar they were built from
//! (spec.md §4.3). A real grammar's tables are generated offline and
//! loaded from the LALR table JSON format (spec.md §6) by
//! [`super::json::parse_parser_tables_json`]; [`bootstrap_tables`] below is
//! the small hand-built fallback [`crate::compile`] uses when no generated
//! table is supplied, mirroring [`crate::lexer::bootstrap_dfa`]'s role for
//! the lexer stage.

use std::collections::HashMap;
use std::rc::Rc;

/// One grammar production. `action`, if present, is a semantic-action
/// source string [`super::action::parse_action`] understands; `None` means
/// "build a generic internal node labeled `lhs` with the popped children in
/// order" (spec.md §4.3's default when a production doesn't override it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: Rc<str>,
    pub rhs: Vec<Rc<str>>,
    pub action: Option<Rc<str>>,
}

impl Production {
    pub fn new(lhs: &str, rhs: &[&str]) -> Self {
        Self {
            lhs: Rc::from(lhs),
            rhs: rhs.iter().map(|s| Rc::from(*s)).collect(),
            action: None,
        }
    }

    pub fn with_action(lhs: &str, rhs: &[&str], action: &str) -> Self {
        Self {
            lhs: Rc::from(lhs),
            rhs: rhs.iter().map(|s| Rc::from(*s)).collect(),
            action: Some(Rc::from(action)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEntry {
    Shift(usize),
    Reduce(usize),
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserTables {
    pub start_state: usize,
    pub productions: Vec<Production>,
    pub action: HashMap<(usize, Rc<str>), ActionEntry>,
    pub goto: HashMap<(usize, Rc<str>), usize>,
}

impl ParserTables {
    pub fn action_for(&self, state: usize, terminal: &str) -> Option<ActionEntry> {
        self.action.get(&(state, Rc::from(terminal))).copied()
    }

    pub fn goto_for(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.goto.get(&(state, Rc::from(nonterminal))).copied()
    }
}

/// Builds tables for a minimal representative MiniC subset — one function
/// with a return statement — exercising every shape the full grammar needs
/// from the driver (shift, epsilon reduce, left-recursive list reduce,
/// accept). States below were derived by hand via the canonical LR(0)
/// automaton plus SLR(1) FOLLOW sets; see DESIGN.md for the derivation.
///
/// Grammar:
/// ```text
/// Program -> Func
/// Func    -> INT IDENT LPAREN RPAREN Block
/// Block   -> LBRACE StmtList RBRACE
/// StmtList -> StmtList Stmt | (empty)
/// Stmt    -> RETURN Expr SEMI
/// Expr    -> INT_CONST
/// ```
pub fn bootstrap_tables() -> ParserTables {
    let productions = vec![
        Production::new("Program", &["Func"]),                                  // 0
        Production::new("Func", &["INT", "IDENT", "LPAREN", "RPAREN", "Block"]), // 1
        Production::new("Block", &["LBRACE", "StmtList", "RBRACE"]),            // 2
        Production::new("StmtList", &["StmtList", "Stmt"]),                     // 3
        Production::new("StmtList", &[]),                                       // 4
        Production::new("Stmt", &["RETURN", "Expr", "SEMI"]),                   // 5
        Production::new("Expr", &["INT_CONST"]),                                // 6
    ];

    let mut action = HashMap::new();
    let mut goto = HashMap::new();

    let mut shift = |state: usize, term: &str, next: usize| {
        action.insert((state, Rc::from(term)), ActionEntry::Shift(next));
    };
    shift(0, "INT", 3);
    shift(3, "IDENT", 4);
    shift(4, "LPAREN", 5);
    shift(5, "RPAREN", 6);
    shift(6, "LBRACE", 8);
    shift(9, "RBRACE", 10);
    shift(9, "RETURN", 11);
    shift(11, "INT_CONST", 13);
    shift(12, "SEMI", 14);

    let mut reduce = |state: usize, term: &str, prod: usize| {
        action.insert((state, Rc::from(term)), ActionEntry::Reduce(prod));
    };
    reduce(2, "$END", 0);
    reduce(7, "$END", 1);
    reduce(8, "RBRACE", 4);
    reduce(8, "RETURN", 4);
    reduce(10, "$END", 2);
    reduce(13, "SEMI", 6);
    reduce(14, "RBRACE", 5);
    reduce(14, "RETURN", 5);
    reduce(15, "RBRACE", 3);
    reduce(15, "RETURN", 3);

    action.insert((1, Rc::from("$END")), ActionEntry::Accept);

    let mut go = |state: usize, nonterm: &str, next: usize| {
        goto.insert((state, Rc::from(nonterm)), next);
    };
    go(0, "Program", 1);
    go(0, "Func", 2);
    go(6, "Block", 7);
    go(8, "StmtList", 9);
    go(9, "Stmt", 15);
    go(11, "Expr", 12);

    ParserTables {
        start_state: 0,
        productions,
        action,
        goto,
    }
}
