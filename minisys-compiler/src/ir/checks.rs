//! Whole-program semantic checks that need every function's signature
//! before they can run (spec.md §4.4): a `main` function must exist,
//! callees must exist and be called with the right number of arguments,
//! `main` may not recurse (directly or indirectly), and non-`void`
//! functions must not be able to fall off the end without returning. Run
//! once after every function has been walked into IR.

use super::error::SemanticError;
use super::generator::{IrFunction, Type};
use std::collections::{HashMap, HashSet};

pub fn run(functions: &[IrFunction]) -> Result<(), SemanticError> {
    let mut errors = Vec::new();
    let signatures: HashMap<&str, &IrFunction> = functions.iter().map(|f| (f.name.as_ref(), f)).collect();

    if !signatures.contains_key("main") {
        errors.push(SemanticError::MissingMain);
    }

    for func in functions {
        for (callee, arity) in &func.calls {
            match signatures.get(callee.as_ref()) {
                None => errors.push(SemanticError::UnknownFunction(callee.clone())),
                Some(target) => {
                    if func.name.as_ref() == "main" && callee.as_ref() == "main" {
                        errors.push(SemanticError::MainRecursion);
                    }
                    if target.params.len() != *arity {
                        errors.push(SemanticError::CallArityMismatch {
                            name: callee.clone(),
                            expected: target.params.len(),
                            actual: *arity,
                        });
                    }
                }
            }
        }

        if func.return_type != Type::Void && !func.returned {
            errors.push(SemanticError::NonVoidWithoutReturn(func.name.clone()));
        }
    }

    if let Some(cycle) = calls_main_indirectly(functions) {
        if cycle {
            errors.push(SemanticError::MainRecursion);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(SemanticError::Many(errors))
    }
}

/// Detects indirect recursion back into `main` via a plain reachability
/// search over the call graph (excluding the direct self-call already
/// caught above).
fn calls_main_indirectly(functions: &[IrFunction]) -> Option<bool> {
    let by_name: HashMap<&str, &IrFunction> = functions.iter().map(|f| (f.name.as_ref(), f)).collect();
    let main = by_name.get("main")?;

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = main.calls.iter().map(|(c, _)| c.as_ref()).collect();
    while let Some(name) = stack.pop() {
        if name == "main" {
            return Some(true);
        }
        if !visited.insert(name) {
            continue;
        }
        if let Some(f) = by_name.get(name) {
            stack.extend(f.calls.iter().map(|(c, _)| c.as_ref()));
        }
    }
    Some(false)
}
