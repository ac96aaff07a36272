//! The bootstrap lexer rule set for MiniC (spec.md §4.2): one pattern per
//! token kind, in priority order. Patterns earlier in [`RULES`] win ties
//! when two rules match the same longest prefix (e.g. the `IF` keyword
//! over `IDENT` both matching `"if"`) because each rule's `order` is its
//! index here and [`crate::automata::merge_actions`] keeps the
//! lowest-order action. `_COMMENT` and `_WHITESPACE` rules are matched like
//! any other but [`super::Lexer::tokenize`] discards the tokens they
//! produce instead of handing them to the parser.

use crate::automata::nfa::Builder;
use crate::automata::regex::{build_fragment, parse_postfix};
use crate::automata::{Action, Dfa};

struct Rule {
    pattern: &'static str,
    name: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: "__asm", name: "__ASM" },
    Rule { pattern: "int", name: "INT" },
    Rule { pattern: "void", name: "VOID" },
    Rule { pattern: "if", name: "IF" },
    Rule { pattern: "else", name: "ELSE" },
    Rule { pattern: "while", name: "WHILE" },
    Rule { pattern: "break", name: "BREAK" },
    Rule { pattern: "continue", name: "CONTINUE" },
    Rule { pattern: "return", name: "RETURN" },
    Rule { pattern: "const", name: "CONST" },
    Rule { pattern: "[a-zA-Z_][a-zA-Z_0-9]*", name: "IDENT" },
    Rule { pattern: "0[xX][0-9a-fA-F]+", name: "INT_CONST" },
    Rule { pattern: "0[0-7]*", name: "INT_CONST" },
    Rule { pattern: "[1-9][0-9]*", name: "INT_CONST" },
    Rule { pattern: "==", name: "EQ" },
    Rule { pattern: "!=", name: "NE" },
    Rule { pattern: "<=", name: "LE" },
    Rule { pattern: ">=", name: "GE" },
    Rule { pattern: "&&", name: "AND" },
    Rule { pattern: r"\|\|", name: "OR" },
    Rule { pattern: "<<", name: "LEFT_OP" },
    Rule { pattern: ">>", name: "RIGHT_OP" },
    Rule { pattern: "<", name: "LT" },
    Rule { pattern: ">", name: "GT" },
    Rule { pattern: "=", name: "ASSIGN" },
    Rule { pattern: "!", name: "NOT" },
    Rule { pattern: r"\+", name: "PLUS" },
    Rule { pattern: "-", name: "MINUS" },
    Rule { pattern: r"\*", name: "STAR" },
    Rule { pattern: "/", name: "SLASH" },
    Rule { pattern: "%", name: "PERCENT" },
    Rule { pattern: "&", name: "BITAND_OP" },
    Rule { pattern: r"\|", name: "BITOR_OP" },
    Rule { pattern: "\\^", name: "BITXOR_OP" },
    Rule { pattern: "~", name: "BITINV_OP" },
    Rule { pattern: "\\$", name: "DOLLAR" },
    Rule { pattern: r"\(", name: "LPAREN" },
    Rule { pattern: r"\)", name: "RPAREN" },
    Rule { pattern: "\\{", name: "LBRACE" },
    Rule { pattern: "\\}", name: "RBRACE" },
    Rule { pattern: r"\[", name: "LBRACKET" },
    Rule { pattern: r"\]", name: "RBRACKET" },
    Rule { pattern: ";", name: "SEMI" },
    Rule { pattern: ",", name: "COMMA" },
    Rule { pattern: "//.*", name: "_COMMENT" },
    // Classic C block-comment regex, adapted so the "any char but `*`"
    // classes also admit newlines (our `[^...]` negation only ranges over
    // printable ASCII, spec.md §4.1, so newline has to be joined in by hand).
    Rule {
        pattern: r"/\*([^*]|\n)*\*+(([^/*]|\n)([^*]|\n)*\*+)*/",
        name: "_COMMENT",
    },
    Rule { pattern: "[ \t\r\n]+", name: "_WHITESPACE" },
];

/// Builds the DFA the bootstrap lexer runs. Regenerating this from a
/// lexer-generator input file is the CLI's `--regenerate` path
/// (spec.md §4.2); this function is the fallback used whenever no
/// generated table is supplied.
pub fn bootstrap_dfa() -> Dfa {
    let mut builder = Builder::new();
    let mut starts = Vec::with_capacity(RULES.len());
    for (order, rule) in RULES.iter().enumerate() {
        let tokens = parse_postfix(rule.pattern)
            .unwrap_or_else(|e| panic!("bootstrap rule {:?} failed to parse: {e}", rule.pattern));
        let fragment = build_fragment(&mut builder, &tokens);
        builder.finish_rule(fragment, Action::new(order as u32, rule.name));
        starts.push(fragment.start);
    }
    let nfa = builder.combine(starts);
    Dfa::from_nfa(&nfa)
}
