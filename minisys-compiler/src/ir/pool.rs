//! Fresh-name pools for compiler-introduced temporaries and labels
//! (spec.md §4.4: `_var_`-prefixed synthetic identifiers so generated
//! names can never collide with a source identifier, which the lexer's
//! `IDENT` rule never produces with a leading underscore followed by
//! `var_`).

use std::rc::Rc;

#[derive(Debug, Default)]
pub struct TempPool {
    next_var: usize,
    next_label: usize,
}

impl TempPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_var(&mut self) -> Rc<str> {
        let name = format!("_var_{}", self.next_var);
        self.next_var += 1;
        Rc::from(name.as_str())
    }

    pub fn fresh_label(&mut self) -> Rc<str> {
        let name = format!("_label_{}", self.next_label);
        self.next_label += 1;
        Rc::from(name.as_str())
    }
}
