//! Deterministic finite automaton produced from an [`Nfa`] by subset
//! construction (spec.md §4.1). Grounded on `dandy::dfa::Dfa`/`DfaState`
//! and `dandy::nfa::Nfa::to_dfa`'s worklist-based powerset construction,
//! generalized to resolve the NFA's `AnyChar` alphabet entry into either a
//! collapsed `AnyChar` DFA edge or a distinct set of concrete edges plus an
//! `OtherChar` fallback, as spec.md §4.1 describes.

use crate::automata::{merge_actions, Action, AlphabetEntry, Nfa};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    pub name: Rc<str>,
    pub initial: bool,
    pub accepting: Option<Action>,
    /// One transition index per entry of [`Dfa::alphabet`], in the same
    /// order; `usize::MAX` means "no transition" (a dead/error state would
    /// be needed, but the lexer treats a missing transition as failure
    /// directly, so dead states are never materialized).
    pub transitions: Vec<usize>,
}

impl DfaState {
    pub fn is_accepting(&self) -> bool {
        self.accepting.is_some()
    }
}

pub const NO_TRANSITION: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub alphabet: Rc<[AlphabetEntry]>,
    pub states: Vec<DfaState>,
    pub initial_state: usize,
}

impl Dfa {
    /// Subset construction: builds a DFA equivalent to `nfa`.
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let concrete_indices: Vec<usize> = nfa
            .alphabet
            .iter()
            .enumerate()
            .filter(|(_, e)| !matches!(e, AlphabetEntry::AnyChar))
            .map(|(i, _)| i)
            .collect();
        let any_idx = nfa.any_index();

        let mut dfa_alphabet: Vec<AlphabetEntry> =
            concrete_indices.iter().map(|&i| nfa.alphabet[i].clone()).collect();
        let any_slot = any_idx.map(|_| {
            dfa_alphabet.push(AlphabetEntry::AnyChar);
            dfa_alphabet.len() - 1
        });
        let other_slot = any_idx.map(|_| {
            dfa_alphabet.push(AlphabetEntry::OtherChar);
            dfa_alphabet.len() - 1
        });

        let mut state_sets: Vec<Vec<usize>> = Vec::new();
        let mut set_index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut transitions: Vec<Vec<usize>> = Vec::new();
        let mut accepting: Vec<Option<Action>> = Vec::new();

        let initial_set = nfa.epsilon_closure(&[nfa.initial_state]);
        set_index.insert(initial_set.clone(), 0);
        state_sets.push(initial_set);
        transitions.push(vec![]);
        accepting.push(None);

        let mut worklist = vec![0usize];
        while let Some(state_id) = worklist.pop() {
            let set = state_sets[state_id].clone();
            let action = set
                .iter()
                .filter_map(|&s| nfa.states[s].accepting.as_ref())
                .fold(None, |acc, a| merge_actions(acc.as_ref(), Some(a)));
            accepting[state_id] = action;

            let mut row = vec![NO_TRANSITION; dfa_alphabet.len()];

            let mut concrete_targets: Vec<Option<usize>> = Vec::with_capacity(concrete_indices.len());
            for (col, &nfa_idx) in concrete_indices.iter().enumerate() {
                let moved = nfa.mv(&set, nfa_idx);
                if moved.is_empty() {
                    concrete_targets.push(None);
                    continue;
                }
                let closure = nfa.epsilon_closure(&moved);
                let target = Self::intern_set(closure, &mut state_sets, &mut set_index, &mut transitions, &mut accepting, &mut worklist);
                row[col] = target;
                concrete_targets.push(Some(target));
            }

            if let (Some(any_nfa_idx), Some(any_col), Some(other_col)) = (any_idx, any_slot, other_slot) {
                let moved = nfa.mv(&set, any_nfa_idx);
                if !moved.is_empty() {
                    let closure = nfa.epsilon_closure(&moved);
                    let any_target = Self::intern_set(closure, &mut state_sets, &mut set_index, &mut transitions, &mut accepting, &mut worklist);

                    let subsumes_all = concrete_targets
                        .iter()
                        .all(|t| matches!(t, None) || *t == Some(any_target));
                    if subsumes_all {
                        // (a) redundant concrete edges collapse into one "any" edge
                        for col in 0..concrete_indices.len() {
                            row[col] = NO_TRANSITION;
                        }
                        row[any_col] = any_target;
                    } else {
                        // (b) keep concrete edges, add an "other" fallback
                        row[other_col] = any_target;
                    }
                }
            }

            transitions[state_id] = row;
        }

        let states = state_sets
            .into_iter()
            .enumerate()
            .zip(accepting)
            .map(|((idx, _set), acc)| DfaState {
                name: Rc::from(idx.to_string().as_str()),
                initial: idx == 0,
                accepting: acc,
                transitions: transitions[idx].clone(),
            })
            .collect();

        Dfa {
            alphabet: Rc::from(dfa_alphabet),
            states,
            initial_state: 0,
        }
    }

    fn intern_set(
        closure: Vec<usize>,
        state_sets: &mut Vec<Vec<usize>>,
        set_index: &mut HashMap<Vec<usize>, usize>,
        transitions: &mut Vec<Vec<usize>>,
        accepting: &mut Vec<Option<Action>>,
        worklist: &mut Vec<usize>,
    ) -> usize {
        if let Some(&id) = set_index.get(&closure) {
            return id;
        }
        let id = state_sets.len();
        set_index.insert(closure.clone(), id);
        state_sets.push(closure);
        transitions.push(vec![]);
        accepting.push(None);
        worklist.push(id);
        id
    }

    /// Looks up the DFA alphabet column for a concrete character, falling
    /// back to `AnyChar`'s column (if present) and finally `OtherChar`'s.
    pub fn column_for(&self, ch: &str) -> Option<usize> {
        self.alphabet.iter().position(|e| matches!(e, AlphabetEntry::Char(c) if c.as_ref() == ch))
            .or_else(|| {
                if ch == "\n" {
                    None
                } else {
                    self.alphabet.iter().position(|e| *e == AlphabetEntry::AnyChar)
                }
            })
            .or_else(|| self.alphabet.iter().position(|e| *e == AlphabetEntry::OtherChar))
    }

    pub fn step(&self, state: usize, ch: &str) -> Option<usize> {
        let col = self.column_for(ch)?;
        let target = self.states[state].transitions[col];
        (target != NO_TRANSITION).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::Builder;

    fn char(c: char) -> AlphabetEntry {
        AlphabetEntry::Char(Rc::from(c.to_string().as_str()))
    }

    #[test]
    fn subset_construction_preserves_language() {
        let mut b = Builder::new();
        let a = b.atom(char('a'));
        let bb = b.atom(char('b'));
        let ab = b.concat(a, bb);
        let star = b.star(ab);
        b.finish_rule(star, Action::new(0, "return AB;"));
        let nfa = b.combine(vec![star.start]);
        let dfa = Dfa::from_nfa(&nfa);

        let run = |input: &[&str]| -> bool {
            let mut state = dfa.initial_state;
            for ch in input {
                match dfa.step(state, ch) {
                    Some(s) => state = s,
                    None => return false,
                }
            }
            dfa.states[state].is_accepting()
        };

        assert!(run(&[]));
        assert!(run(&["a", "b"]));
        assert!(run(&["a", "b", "a", "b"]));
        assert!(!run(&["a"]));
        assert!(!run(&["b"]));
    }

    #[test]
    fn any_char_collapses_when_it_subsumes_concrete_edges() {
        let mut b = Builder::new();
        let dot = b.atom(AlphabetEntry::AnyChar);
        let star = b.star(dot);
        b.finish_rule(star, Action::new(0, "return ANY;"));
        let nfa = b.combine(vec![star.start]);
        let dfa = Dfa::from_nfa(&nfa);
        // Only one state: everything loops back via AnyChar/OtherChar.
        assert_eq!(dfa.states.len(), 1);
        assert!(dfa.states[0].is_accepting());
    }
}
