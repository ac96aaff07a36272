//! Regex-to-postfix conversion and the postfix-token stack machine that
//! drives [`super::nfa::Builder`] (spec.md §4.1: "construction is driven
//! directly from operators in postfix order consumed from a regex
//! post-form").
//!
//! The grammar (alternation over sequences over postfix-annotated pieces)
//! is the same recursive-descent shape as `dandy::parser::regex`, written
//! with the same `nom` combinators, but each production returns a flat
//! `Vec<PostfixToken>` instead of building a `RegexTree`: alternation folds
//! its children with a trailing `Union` token, sequence folds with a
//! trailing `Concat` token, and a piece's suffix operator (`*`, `+`, `?`)
//! appends its own trailing token — so precedence (`*`/`+`/`?` tightest,
//! then concatenation, then `|` loosest) falls out of the recursion order
//! rather than needing an explicit shunting-yard pass. `+` has no NFA
//! operator of its own; it is rewritten here into `A A* CONCAT`, matching
//! how the regex-generator lexer doc describes it.

use crate::automata::nfa::{Builder, Fragment};
use crate::automata::AlphabetEntry;
use nom::branch::alt;
use nom::bytes::complete::take;
use nom::character::complete;
use nom::character::complete::{none_of, one_of};
use nom::combinator::{all_consuming, map, opt, value, verify};
use nom::multi::{many1, separated_list1};
use nom::sequence::{delimited, preceded, tuple};
use nom::IResult;
use std::collections::BTreeSet;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Concat,
    Union,
    Star,
    Question,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixToken {
    Atom(AlphabetEntry),
    Op(PostfixOp),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegexError {
    #[error("invalid regex pattern: {0}")]
    Invalid(String),
}

/// Parses a regex pattern into its postfix token stream.
pub fn parse_postfix(pattern: &str) -> Result<Vec<PostfixToken>, RegexError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    all_consuming(alternation)(trimmed)
        .map(|(_, toks)| toks)
        .map_err(|e| RegexError::Invalid(e.to_string()))
}

/// Runs the postfix stack machine against a builder, producing one
/// [`Fragment`]. An empty token stream matches only the empty string.
pub fn build_fragment(builder: &mut Builder, tokens: &[PostfixToken]) -> Fragment {
    if tokens.is_empty() {
        return builder.epsilon();
    }
    let mut stack: Vec<Fragment> = Vec::new();
    for tok in tokens {
        match tok {
            PostfixToken::Atom(entry) => stack.push(builder.atom(entry.clone())),
            PostfixToken::Op(PostfixOp::Concat) => {
                let b = stack.pop().expect("postfix stream is well-formed");
                let a = stack.pop().expect("postfix stream is well-formed");
                stack.push(builder.concat(a, b));
            }
            PostfixToken::Op(PostfixOp::Union) => {
                let b = stack.pop().expect("postfix stream is well-formed");
                let a = stack.pop().expect("postfix stream is well-formed");
                stack.push(builder.union(a, b));
            }
            PostfixToken::Op(PostfixOp::Star) => {
                let a = stack.pop().expect("postfix stream is well-formed");
                stack.push(builder.star(a));
            }
            PostfixToken::Op(PostfixOp::Question) => {
                let a = stack.pop().expect("postfix stream is well-formed");
                stack.push(builder.question(a));
            }
        }
    }
    stack.pop().expect("postfix stream reduces to exactly one fragment")
}

fn alternation(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(separated_list1(complete::char('|'), sequence), |seqs| {
        fold_with_op(seqs, PostfixOp::Union)
    })(input)
}

fn sequence(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(many1(piece), |pieces| fold_with_op(pieces, PostfixOp::Concat))(input)
}

fn fold_with_op(mut parts: Vec<Vec<PostfixToken>>, op: PostfixOp) -> Vec<PostfixToken> {
    if parts.len() == 1 {
        return parts.remove(0);
    }
    let mut out = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        out.extend(part);
        if i > 0 {
            out.push(PostfixToken::Op(op));
        }
    }
    out
}

fn piece(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    let (input, toks) = atom(input)?;
    let (input, suffix) = opt(one_of("*+?"))(input)?;
    let toks = match suffix {
        Some('*') => push(toks, PostfixOp::Star),
        Some('?') => push(toks, PostfixOp::Question),
        Some('+') => {
            let mut out = toks.clone();
            out.extend(toks);
            out.push(PostfixToken::Op(PostfixOp::Star));
            out.push(PostfixToken::Op(PostfixOp::Concat));
            out
        }
        None => toks,
        Some(_) => unreachable!("one_of(\"*+?\") only yields those three"),
    };
    Ok((input, toks))
}

fn push(mut toks: Vec<PostfixToken>, op: PostfixOp) -> Vec<PostfixToken> {
    toks.push(PostfixToken::Op(op));
    toks
}

fn atom(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    alt((group, char_class, quoted_string, any_char, escaped_class, escaped_char, normal_char))(input)
}

fn group(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    delimited(complete::char('('), alternation, complete::char(')'))(input)
}

fn any_char(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    value(vec![PostfixToken::Atom(AlphabetEntry::AnyChar)], complete::char('.'))(input)
}

fn quoted_string(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(delimited(complete::char('"'), many1(none_of("\"")), complete::char('"')), |chars: Vec<char>| {
        fold_with_op(chars.into_iter().map(literal_atom).collect(), PostfixOp::Concat)
    })(input)
}

fn escaped_class(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    preceded(
        complete::char('\\'),
        alt((
            value(digit_class(), complete::char('d')),
            value(space_class(), complete::char('s')),
        )),
    )(input)
}

fn digit_class() -> Vec<PostfixToken> {
    fold_with_op(('0'..='9').map(literal_atom).collect(), PostfixOp::Union)
}

fn space_class() -> Vec<PostfixToken> {
    fold_with_op([' ', '\t', '\n', '\r'].into_iter().map(literal_atom).collect(), PostfixOp::Union)
}

fn escaped_char(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(preceded(complete::char('\\'), take(1usize)), |s: &str| {
        let c = s.chars().next().expect("take(1) yields one char");
        literal_atom(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        })
    })(input)
}

fn normal_char(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(verify(take(1usize), |s: &str| !is_reserved(s.chars().next().unwrap())), |s: &str| {
        literal_atom(s.chars().next().unwrap())
    })(input)
}

fn is_reserved(c: char) -> bool {
    ['(', ')', '|', '*', '+', '?', '.', '[', ']', '"', '\\'].contains(&c)
}

fn literal_atom(c: char) -> Vec<PostfixToken> {
    vec![PostfixToken::Atom(AlphabetEntry::Char(Rc::from(c.to_string().as_str())))]
}

// printable ASCII, the range negated character classes are complemented over.
const PRINTABLE_LOW: u32 = 32;
const PRINTABLE_HIGH: u32 = 126;

fn char_class(input: &str) -> IResult<&str, Vec<PostfixToken>> {
    map(
        delimited(complete::char('['), tuple((opt(complete::char('^')), many1(class_item))), complete::char(']')),
        |(negate, items)| {
            let mut members: BTreeSet<char> = BTreeSet::new();
            for item in items {
                match item {
                    ClassItem::Single(c) => {
                        members.insert(c);
                    }
                    ClassItem::Range(lo, hi) => {
                        for c in lo..=hi {
                            members.insert(c);
                        }
                    }
                }
            }
            let resolved: Vec<char> = if negate.is_some() {
                (PRINTABLE_LOW..=PRINTABLE_HIGH)
                    .filter_map(char::from_u32)
                    .filter(|c| !members.contains(c))
                    .collect()
            } else {
                members.into_iter().collect()
            };
            fold_with_op(resolved.into_iter().map(literal_atom).collect(), PostfixOp::Union)
        },
    )(input)
}

enum ClassItem {
    Single(char),
    Range(char, char),
}

fn class_item(input: &str) -> IResult<&str, ClassItem> {
    alt((class_range, class_single))(input)
}

fn class_range(input: &str) -> IResult<&str, ClassItem> {
    map(
        tuple((class_char, complete::char('-'), class_char)),
        |(lo, _, hi)| ClassItem::Range(lo, hi),
    )(input)
}

fn class_single(input: &str) -> IResult<&str, ClassItem> {
    map(class_char, ClassItem::Single)(input)
}

fn class_char(input: &str) -> IResult<&str, char> {
    alt((
        map(preceded(complete::char('\\'), take(1usize)), |s: &str| s.chars().next().unwrap()),
        map(none_of("]"), |c| c),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::Action;

    fn fragment_accepts(pattern: &str, input: &[&str]) -> bool {
        let mut builder = Builder::new();
        let tokens = parse_postfix(pattern).unwrap();
        let fragment = build_fragment(&mut builder, &tokens);
        builder.finish_rule(fragment, Action::new(0, "T"));
        let nfa = builder.combine(vec![fragment.start]);
        nfa.accepts(input)
    }

    #[test]
    fn literal_concatenation() {
        assert!(fragment_accepts("ab", &["a", "b"]));
        assert!(!fragment_accepts("ab", &["a"]));
    }

    #[test]
    fn union_and_star() {
        assert!(fragment_accepts("(a|b)*", &["a", "b", "a"]));
        assert!(fragment_accepts("(a|b)*", &[]));
    }

    #[test]
    fn plus_requires_at_least_one() {
        assert!(fragment_accepts("a+", &["a"]));
        assert!(fragment_accepts("a+", &["a", "a", "a"]));
        assert!(!fragment_accepts("a+", &[]));
    }

    #[test]
    fn digit_class_matches_any_digit() {
        assert!(fragment_accepts(r"\d+", &["4", "2"]));
        assert!(!fragment_accepts(r"\d+", &["x"]));
    }

    #[test]
    fn bracket_range_and_negation() {
        assert!(fragment_accepts("[a-c]", &["b"]));
        assert!(!fragment_accepts("[a-c]", &["d"]));
        assert!(fragment_accepts("[^a-c]", &["d"]));
        assert!(!fragment_accepts("[^a-c]", &["a"]));
    }

    #[test]
    fn quoted_string_suspends_operators() {
        assert!(fragment_accepts("\"a|b\"", &["a", "|", "b"]));
    }
}
