use std::rc::Rc;
use thiserror::Error;

/// All semantic-analysis failures (spec.md §4.4 edge cases). Unlike lexical
/// and syntax errors, these are always fatal — the compiler never keeps
/// generating IR past one of these, and they are never routed through
/// `Diagnostics` (spec.md §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("'{0}' is already declared in this scope")]
    DuplicateDeclaration(Rc<str>),
    #[error("'{0}' is used before being initialized")]
    UseBeforeInit(Rc<str>),
    #[error("'void' used where a value is required")]
    VoidMisuse,
    #[error("array '{0}' cannot be declared with local (automatic) storage")]
    LocalArrayRejected(Rc<str>),
    #[error("function '{0}' returns a value of the wrong type")]
    ReturnTypeMismatch(Rc<str>),
    #[error("call to '{0}' passes {actual} argument(s), expected {expected}")]
    CallArityMismatch { name: Rc<str>, expected: usize, actual: usize },
    #[error("'main' may not call itself, directly or indirectly")]
    MainRecursion,
    #[error("call to undeclared function '{0}'")]
    UnknownFunction(Rc<str>),
    #[error("non-void function '{0}' may finish without returning a value")]
    NonVoidWithoutReturn(Rc<str>),
    #[error("'__asm' block contains no instructions")]
    AsmMisuse,
    #[error("program has no 'main' function")]
    MissingMain,
    #[error("interrupt handler '{0}' must be void and take no parameters")]
    InvalidInterruptHandler(Rc<str>),
    #[error("{0} semantic error(s) found")]
    Many(Vec<SemanticError>),
}
