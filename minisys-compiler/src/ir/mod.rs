//! # IRGen
//!
//! Walks the parser's syntax tree into three-address code (spec.md §4.4):
//! [`scope`] resolves names through scope-path lookup, [`pool`] hands out
//! fresh temporary/label names, [`generator::IrGenerator`] emits
//! [`quad::Quadruple`]s while running the checks that can happen inline,
//! [`checks`] runs the ones that need the whole program, and [`block`]
//! partitions each function's quadruples into basic blocks for codegen.

mod block;
mod checks;
mod error;
mod generator;
mod pool;
mod quad;
mod scope;

pub use block::BasicBlock;
pub use error::SemanticError;
pub use generator::{FunctionSignature, IrFunction, IrGenerator, IrProgram, Type};
pub use quad::{Op, Quadruple};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{bootstrap_dfa, Lexer};
    use crate::parser::{bootstrap_tables, Parser};
    use crate::error::Diagnostics;

    fn generate(src: &str) -> IrProgram {
        let dfa = bootstrap_dfa();
        let mut diags = Diagnostics::new(false);
        let tokens = Lexer::new(&dfa).tokenize(src, &mut diags).unwrap();
        let tables = bootstrap_tables();
        let tree = Parser::new(&tables).parse(tokens, &mut diags).unwrap();
        IrGenerator::new().generate(&tree).unwrap()
    }

    #[test]
    fn return_statement_emits_return_quad() {
        let program = generate("int main() { return 42; }");
        assert_eq!(program.functions.len(), 1);
        let main = &program.functions[0];
        assert_eq!(main.name.as_ref(), "main");
        assert!(main.returned);
        assert!(main.quadruples.iter().any(|q| matches!(q.op, Op::Return)));
    }

    #[test]
    fn empty_function_has_no_return_and_fails_the_check() {
        let dfa = bootstrap_dfa();
        let mut diags = Diagnostics::new(false);
        let tokens = Lexer::new(&dfa).tokenize("int main() { }", &mut diags).unwrap();
        let tables = bootstrap_tables();
        let tree = Parser::new(&tables).parse(tokens, &mut diags).unwrap();
        let result = IrGenerator::new().generate(&tree);
        assert!(matches!(result, Err(SemanticError::NonVoidWithoutReturn(_))));
    }

    #[test]
    fn basic_blocks_partition_the_function() {
        let program = generate("int main() { return 1; }");
        assert_eq!(program.functions[0].blocks.len(), 1);
    }
}
