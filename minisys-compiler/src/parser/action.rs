//! Interprets a production's semantic action string (spec.md §4.3/§9): a
//! tiny expression language of `$n` child references and
//! `newNode(name, ...)` constructors, e.g. `newNode(BinOp, $1, $2, $3)`.
//! Grammars that don't supply an action just keep the default
//! production-name-as-node-label tree ([`super::driver::Parser::parse`]),
//! so this module only runs for productions that override it.

use super::tree::SyntaxTreeNode;
use super::SyntaxError;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum ActionExpr {
    Ref(usize),
    NewNode(Rc<str>, Vec<ActionExpr>),
}

pub fn parse_action(src: &str) -> Result<ActionExpr, SyntaxError> {
    all_consuming(delimited(multispace0, expr, multispace0))(src)
        .map(|(_, e)| e)
        .map_err(|e| SyntaxError::InvalidAction(format!("{src:?}: {e}")))
}

fn expr(input: &str) -> IResult<&str, ActionExpr> {
    alt((reference, new_node))(input)
}

fn reference(input: &str) -> IResult<&str, ActionExpr> {
    map(preceded(char('$'), map_res(digit1, str::parse::<usize>)), ActionExpr::Ref)(input)
}

fn new_node(input: &str) -> IResult<&str, ActionExpr> {
    map(
        preceded(
            tag("newNode"),
            delimited(
                preceded(multispace0, char('(')),
                pair(
                    preceded(multispace0, identifier),
                    many0(preceded(delimited(multispace0, char(','), multispace0), expr)),
                ),
                preceded(multispace0, char(')')),
            ),
        ),
        |(name, args)| ActionExpr::NewNode(Rc::from(name), args),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_"))))))(input)
}

/// Evaluates an action expression against the children popped for one
/// reduction, `$n` being 1-indexed left to right.
pub fn eval_action(expr: &ActionExpr, children: &[SyntaxTreeNode]) -> SyntaxTreeNode {
    match expr {
        ActionExpr::Ref(n) => children[*n - 1].clone(),
        ActionExpr::NewNode(name, args) => SyntaxTreeNode::Internal {
            symbol: name.clone(),
            children: args.iter().map(|a| eval_action(a, children)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_reference() {
        assert_eq!(parse_action("$2").unwrap(), ActionExpr::Ref(2));
    }

    #[test]
    fn parses_new_node_with_mixed_args() {
        let expr = parse_action("newNode(BinOp, $1, $2, $3)").unwrap();
        assert_eq!(
            expr,
            ActionExpr::NewNode(Rc::from("BinOp"), vec![ActionExpr::Ref(1), ActionExpr::Ref(2), ActionExpr::Ref(3)])
        );
    }

    #[test]
    fn parses_nested_new_node() {
        let expr = parse_action("newNode(Outer, newNode(Inner, $1))").unwrap();
        assert_eq!(
            expr,
            ActionExpr::NewNode(
                Rc::from("Outer"),
                vec![ActionExpr::NewNode(Rc::from("Inner"), vec![ActionExpr::Ref(1)])]
            )
        );
    }
}
