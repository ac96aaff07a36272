//! The LALR(1) driving loop: shift/reduce/accept over an explicit state
//! stack and node stack, one token at a time — the same "advance one step,
//! inspect the new state" shape as
//! `dandy::dfa::eval::DfaEvaluator::step`, generalized from a single
//! automaton state to a parser configuration (state stack + tree stack).

use super::action::{eval_action, parse_action};
use super::table::{ActionEntry, ParserTables};
use super::tree::SyntaxTreeNode;
use super::SyntaxError;
use crate::error::{Diagnostics, Finding};
use crate::lexer::Token;

pub struct Parser<'t> {
    tables: &'t ParserTables,
}

impl<'t> Parser<'t> {
    pub fn new(tables: &'t ParserTables) -> Self {
        Self { tables }
    }

    pub fn parse(&self, tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> Result<SyntaxTreeNode, SyntaxError> {
        let mut state_stack = vec![self.tables.start_state];
        let mut node_stack: Vec<SyntaxTreeNode> = Vec::new();
        let mut pos = 0usize;

        loop {
            let token = &tokens[pos];
            let state = *state_stack.last().expect("state stack is never empty");

            match self.tables.action_for(state, token.name.as_ref()) {
                Some(ActionEntry::Shift(next)) => {
                    node_stack.push(SyntaxTreeNode::Leaf(token.clone()));
                    state_stack.push(next);
                    pos += 1;
                }
                Some(ActionEntry::Reduce(prod_idx)) => {
                    self.reduce(&mut state_stack, &mut node_stack, prod_idx)?;
                }
                Some(ActionEntry::Accept) => {
                    return Ok(node_stack.pop().expect("accept always leaves exactly one node"));
                }
                None => {
                    let err = SyntaxError::unexpected(token);
                    if diagnostics.is_collecting() && pos + 1 < tokens.len() {
                        diagnostics.push(Finding::Syntax(err));
                        pos += 1;
                    } else {
                        return Err(err);
                    }
                }
            }
        }
    }

    fn reduce(
        &self,
        state_stack: &mut Vec<usize>,
        node_stack: &mut Vec<SyntaxTreeNode>,
        prod_idx: usize,
    ) -> Result<(), SyntaxError> {
        let production = &self.tables.productions[prod_idx];
        let arity = production.rhs.len();
        let children = node_stack.split_off(node_stack.len() - arity);
        state_stack.truncate(state_stack.len() - arity);

        let node = match &production.action {
            Some(src) => {
                let expr = parse_action(src)?;
                eval_action(&expr, &children)
            }
            None => SyntaxTreeNode::Internal {
                symbol: production.lhs.clone(),
                children,
            },
        };

        let top = *state_stack.last().expect("state stack is never empty");
        let next = self.tables.goto_for(top, production.lhs.as_ref()).ok_or_else(|| SyntaxError::MissingGoto {
            state: top,
            symbol: production.lhs.clone(),
        })?;
        node_stack.push(node);
        state_stack.push(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{bootstrap_dfa, Lexer};
    use crate::parser::bootstrap_tables;

    fn parse_source(src: &str) -> SyntaxTreeNode {
        let dfa = bootstrap_dfa();
        let mut diags = Diagnostics::new(false);
        let tokens = Lexer::new(&dfa).tokenize(src, &mut diags).unwrap();
        let tables = bootstrap_tables();
        Parser::new(&tables).parse(tokens, &mut diags).unwrap()
    }

    #[test]
    fn parses_empty_function_body() {
        let tree = parse_source("int main() { }");
        assert_eq!(tree.symbol(), "Program");
    }

    #[test]
    fn parses_single_return_statement() {
        let tree = parse_source("int main() { return 0; }");
        assert_eq!(tree.symbol(), "Program");
        let func = &tree.children()[0];
        assert_eq!(func.symbol(), "Func");
    }

    #[test]
    fn parses_multiple_statements() {
        let tree = parse_source("int main() { return 1; return 2; }");
        // Func -> ... -> Block -> StmtList RBRACE, and StmtList should have
        // nested down to two Stmt children across two reductions.
        let func = &tree.children()[0];
        let block = &func.children()[4];
        let stmt_list = &block.children()[1];
        assert_eq!(stmt_list.symbol(), "StmtList");
    }

    #[test]
    fn rejects_unexpected_token() {
        let dfa = bootstrap_dfa();
        let mut diags = Diagnostics::new(false);
        let tokens = Lexer::new(&dfa).tokenize("int main( { }", &mut diags).unwrap();
        let tables = bootstrap_tables();
        assert!(Parser::new(&tables).parse(tokens, &mut diags).is_err());
    }
}
