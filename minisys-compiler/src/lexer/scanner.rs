//! The longest-match-with-rollback scanning loop (spec.md §4.2): run the
//! DFA forward as far as it will go, remember the most recent accepting
//! state visited along the way, then roll the input cursor back to right
//! after that point and emit the token it names. A character the DFA
//! never accepts from is a lexical error; skip it and keep scanning (under
//! `collect_errors`) or abort immediately otherwise, matching
//! `crate::error::Diagnostics`'s two modes.

use super::token::Token;
use super::LexError;
use crate::automata::{Action, Dfa};
use crate::error::{Diagnostics, Finding};
use unicode_segmentation::UnicodeSegmentation;

const SUPPRESSED: &[&str] = &["_COMMENT", "_WHITESPACE"];

pub struct Lexer<'d> {
    dfa: &'d Dfa,
}

impl<'d> Lexer<'d> {
    pub fn new(dfa: &'d Dfa) -> Self {
        Self { dfa }
    }

    pub fn tokenize(&self, source: &str, diagnostics: &mut Diagnostics) -> Result<Vec<Token>, LexError> {
        let graphemes: Vec<&str> = source.graphemes(true).collect();
        let mut tokens = Vec::new();
        let mut i = 0usize;
        let mut line = 1usize;
        let mut column = 1usize;

        while i < graphemes.len() {
            match self.longest_match(&graphemes[i..]) {
                Some((len, action)) => {
                    let literal: String = graphemes[i..i + len].concat();
                    let start = (line, column);
                    advance(&mut line, &mut column, &graphemes[i..i + len]);
                    if !SUPPRESSED.contains(&action.payload.as_ref()) {
                        tokens.push(Token::new(action.payload.clone(), literal, start.0, start.1));
                    }
                    i += len;
                }
                None => {
                    let ch = graphemes[i].chars().next().unwrap_or('\u{FFFD}');
                    let err = LexError::UnrecognizedChar { ch, line, column };
                    if diagnostics.is_collecting() {
                        diagnostics.push(Finding::Lexical(err));
                        advance(&mut line, &mut column, &graphemes[i..i + 1]);
                        i += 1;
                    } else {
                        return Err(err);
                    }
                }
            }
        }

        tokens.push(Token::end(line, column));
        Ok(tokens)
    }

    /// Runs the DFA over `input` as far as it goes, returning the
    /// grapheme-count and [`Action`] of the last accepting state seen, if
    /// any.
    fn longest_match(&self, input: &[&str]) -> Option<(usize, Action)> {
        let mut state = self.dfa.initial_state;
        let mut last_accept: Option<(usize, Action)> = None;
        let mut consumed = 0usize;

        while consumed < input.len() {
            match self.dfa.step(state, input[consumed]) {
                Some(next) => {
                    state = next;
                    consumed += 1;
                    if let Some(action) = &self.dfa.states[state].accepting {
                        last_accept = Some((consumed, action.clone()));
                    }
                }
                None => break,
            }
        }

        last_accept
    }
}

fn advance(line: &mut usize, column: &mut usize, consumed: &[&str]) {
    for g in consumed {
        if *g == "\n" {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::rules::bootstrap_dfa;

    #[test]
    fn tokenizes_a_small_function() {
        let dfa = bootstrap_dfa();
        let lexer = Lexer::new(&dfa);
        let mut diags = Diagnostics::new(false);
        let tokens = lexer.tokenize("int main() { return 0; }", &mut diags).unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                "INT", "IDENT", "LPAREN", "RPAREN", "LBRACE", "RETURN", "INT_CONST", "SEMI", "RBRACE", "$END"
            ]
        );
    }

    #[test]
    fn keyword_wins_over_identifier_on_tie() {
        let dfa = bootstrap_dfa();
        let lexer = Lexer::new(&dfa);
        let mut diags = Diagnostics::new(false);
        let tokens = lexer.tokenize("if", &mut diags).unwrap();
        assert_eq!(tokens[0].name.as_ref(), "IF");
    }

    #[test]
    fn comments_and_whitespace_are_discarded() {
        let dfa = bootstrap_dfa();
        let lexer = Lexer::new(&dfa);
        let mut diags = Diagnostics::new(false);
        let tokens = lexer.tokenize("int /* c */ x; // trailing\n", &mut diags).unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, vec!["INT", "IDENT", "SEMI", "$END"]);
    }

    #[test]
    fn unrecognized_char_aborts_without_collection() {
        let dfa = bootstrap_dfa();
        let lexer = Lexer::new(&dfa);
        let mut diags = Diagnostics::new(false);
        let err = lexer.tokenize("int x = @;", &mut diags).unwrap_err();
        assert_eq!(err.position().column, 9);
    }

    #[test]
    fn unrecognized_char_is_collected_when_enabled() {
        let dfa = bootstrap_dfa();
        let lexer = Lexer::new(&dfa);
        let mut diags = Diagnostics::new(true);
        let tokens = lexer.tokenize("int x = @;", &mut diags).unwrap();
        assert!(diags.has_findings());
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, vec!["INT", "IDENT", "ASSIGN", "SEMI", "$END"]);
    }
}
