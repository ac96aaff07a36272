use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("no stack slot assigned to '{0}'")]
    MissingSlot(Rc<str>),
    #[error("quadruple result '{0}' was never assigned a slot or register")]
    UnresolvedOperand(Rc<str>),
    #[error("jump target label '{0}' was never emitted")]
    UnknownLabel(Rc<str>),
    #[error("cannot spill temporary '{0}': it has no backing stack slot")]
    Unspillable(Rc<str>),
}
