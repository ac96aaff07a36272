//! Scope-path-based variable resolution (spec.md §4.4): a stack of lexical
//! scope frames, each tagged with a unique path segment, searched
//! innermost-out on lookup. Declarations are checked against the current
//! frame only — shadowing an outer declaration is legal, redeclaring in the
//! same frame is not.

use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: Rc<str>,
    pub slot: Rc<str>,
    pub is_array: bool,
    pub is_const: bool,
    pub initialized: bool,
}

#[derive(Debug, Default)]
struct Frame {
    id: usize,
    symbols: HashMap<Rc<str>, Symbol>,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    next_id: usize,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        let id = self.next_id;
        self.next_id += 1;
        self.frames.push(Frame { id, symbols: HashMap::new() });
    }

    pub fn exit(&mut self) {
        self.frames.pop();
    }

    /// The path of scope ids from outermost to innermost, for diagnostics
    /// and for namespacing generated slot names.
    pub fn path(&self) -> Vec<usize> {
        self.frames.iter().map(|f| f.id).collect()
    }

    pub fn declare(&mut self, symbol: Symbol) -> Result<(), Rc<str>> {
        let frame = self.frames.last_mut().expect("declare requires an open scope");
        if frame.symbols.contains_key(&symbol.name) {
            return Err(symbol.name);
        }
        frame.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|f| f.symbols.get(name))
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.frames.iter_mut().rev().find_map(|f| f.symbols.get_mut(name))
    }

    pub fn is_global(&self) -> bool {
        self.frames.len() <= 1
    }
}
