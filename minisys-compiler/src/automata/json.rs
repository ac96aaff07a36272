//! JSON (de)serialization for [`Dfa`], supporting both on-disk schemas
//! spec.md §6 requires: the current ("new") schema and a "legacy" one that
//! must also still load. Reserved alphabet-entry names: `"ANY"` for
//! [`AlphabetEntry::AnyChar`] and `"OTHER"` for
//! [`AlphabetEntry::OtherChar`]; anything else is a concrete character.
//!
//! This is new relative to `dandy` (which only round-trips through its own
//! text table format); grounded on the same idiom `dandy::dfa::parse`
//! uses — a plain data struct mirroring the wire format, validated through
//! a fallible `TryFrom` into the real [`Dfa`] — but driven by `serde`
//! instead of `nom`, since the wire format here is JSON, not a bespoke text
//! table.

use crate::automata::dfa::NO_TRANSITION;
use crate::automata::{Action, AlphabetEntry, Dfa, DfaState};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DfaJsonError {
    #[error("no initial state listed")]
    MissingInitialState,
    #[error("state index {0} out of range (state count {1})")]
    StateIndexOutOfRange(usize, usize),
    #[error("symbol index {0} out of range (alphabet size {1})")]
    SymbolIndexOutOfRange(usize, usize),
    #[error("document matches neither the new nor the legacy DFA JSON schema")]
    UnrecognizedSchema,
}

fn entry_from_name(name: &str) -> AlphabetEntry {
    match name {
        "ANY" => AlphabetEntry::AnyChar,
        "OTHER" => AlphabetEntry::OtherChar,
        other => AlphabetEntry::Char(Rc::from(other)),
    }
}

fn name_from_entry(entry: &AlphabetEntry) -> String {
    match entry {
        AlphabetEntry::AnyChar => "ANY".to_string(),
        AlphabetEntry::OtherChar => "OTHER".to_string(),
        AlphabetEntry::Char(c) => c.to_string(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ActionJson {
    order: u32,
    payload: String,
}

impl From<&Action> for ActionJson {
    fn from(a: &Action) -> Self {
        ActionJson {
            order: a.order,
            payload: a.payload.to_string(),
        }
    }
}

impl From<ActionJson> for Action {
    fn from(a: ActionJson) -> Self {
        Action::new(a.order, a.payload)
    }
}

// ---- new schema ----

#[derive(Debug, Serialize, Deserialize)]
struct TransitionEntry {
    #[serde(rename = "inputSymbol")]
    input_symbol: usize,
    #[serde(rename = "targetStateIndex")]
    target_state_index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct AcceptingAction {
    #[serde(rename = "stateIndex")]
    state_index: usize,
    action: ActionJson,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewDfaJson {
    desc: Option<String>,
    #[serde(rename = "symbolSet")]
    symbol_set: Vec<String>,
    #[serde(rename = "stateCount")]
    state_count: usize,
    #[serde(rename = "initialStateIndices")]
    initial_state_indices: Vec<usize>,
    #[serde(rename = "acceptingStateIndices")]
    accepting_state_indices: Vec<usize>,
    #[serde(rename = "transitionTable")]
    transition_table: Vec<Vec<TransitionEntry>>,
    #[serde(rename = "acceptingStateActions")]
    accepting_state_actions: Vec<AcceptingAction>,
}

impl TryFrom<NewDfaJson> for Dfa {
    type Error = DfaJsonError;

    fn try_from(doc: NewDfaJson) -> Result<Self, Self::Error> {
        let alphabet: Vec<AlphabetEntry> = doc.symbol_set.iter().map(|s| entry_from_name(s)).collect();
        let initial_state = *doc
            .initial_state_indices
            .first()
            .ok_or(DfaJsonError::MissingInitialState)?;

        let mut accepting: Vec<Option<Action>> = vec![None; doc.state_count];
        for acc in &doc.accepting_state_actions {
            if acc.state_index >= doc.state_count {
                return Err(DfaJsonError::StateIndexOutOfRange(acc.state_index, doc.state_count));
            }
            accepting[acc.state_index] = Some(Action::from(ActionJson {
                order: acc.action.order,
                payload: acc.action.payload.clone(),
            }));
        }
        for &idx in &doc.accepting_state_indices {
            if idx >= doc.state_count {
                return Err(DfaJsonError::StateIndexOutOfRange(idx, doc.state_count));
            }
            accepting[idx].get_or_insert(Action::new(u32::MAX, ""));
        }

        let mut states = Vec::with_capacity(doc.state_count);
        for i in 0..doc.state_count {
            let mut row = vec![NO_TRANSITION; alphabet.len()];
            if let Some(entries) = doc.transition_table.get(i) {
                for t in entries {
                    if t.input_symbol >= alphabet.len() {
                        return Err(DfaJsonError::SymbolIndexOutOfRange(t.input_symbol, alphabet.len()));
                    }
                    if t.target_state_index >= doc.state_count {
                        return Err(DfaJsonError::StateIndexOutOfRange(t.target_state_index, doc.state_count));
                    }
                    row[t.input_symbol] = t.target_state_index;
                }
            }
            states.push(DfaState {
                name: Rc::from(i.to_string().as_str()),
                initial: i == initial_state,
                accepting: accepting[i].clone(),
                transitions: row,
            });
        }

        Ok(Dfa {
            alphabet: Rc::from(alphabet),
            states,
            initial_state,
        })
    }
}

impl Dfa {
    /// Serializes to the "new" JSON schema.
    pub fn to_json(&self) -> NewDfaJson {
        let symbol_set = self.alphabet.iter().map(name_from_entry).collect();
        let initial_state_indices = vec![self.initial_state];
        let mut accepting_state_indices = Vec::new();
        let mut accepting_state_actions = Vec::new();
        for (i, s) in self.states.iter().enumerate() {
            if let Some(action) = &s.accepting {
                accepting_state_indices.push(i);
                accepting_state_actions.push(AcceptingAction {
                    state_index: i,
                    action: ActionJson::from(action),
                });
            }
        }
        let transition_table = self
            .states
            .iter()
            .map(|s| {
                s.transitions
                    .iter()
                    .enumerate()
                    .filter(|(_, &t)| t != NO_TRANSITION)
                    .map(|(input_symbol, &target_state_index)| TransitionEntry {
                        input_symbol,
                        target_state_index,
                    })
                    .collect()
            })
            .collect();

        NewDfaJson {
            desc: None,
            symbol_set,
            state_count: self.states.len(),
            initial_state_indices,
            accepting_state_indices,
            transition_table,
            accepting_state_actions,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }
}

// ---- legacy schema ----

#[derive(Debug, Serialize, Deserialize)]
struct LegacyTransition {
    alpha: usize,
    target: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct LegacyAcceptAction {
    // Preserved verbatim: the legacy wire format really does misspell
    // this field, and both schemas must load as-is (spec.md §6).
    #[serde(rename = "accpetStateIndex")]
    accpet_state_index: usize,
    action: ActionJson,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyDfaJson {
    alphabet: Vec<String>,
    #[serde(rename = "startStatesIndex")]
    start_states_index: usize,
    #[serde(rename = "acceptStatesIndex")]
    accept_states_index: Vec<usize>,
    #[serde(rename = "transformAdjList")]
    transform_adj_list: Vec<Vec<LegacyTransition>>,
    #[serde(rename = "acceptActionMap")]
    accept_action_map: Vec<LegacyAcceptAction>,
}

impl TryFrom<LegacyDfaJson> for Dfa {
    type Error = DfaJsonError;

    fn try_from(doc: LegacyDfaJson) -> Result<Self, Self::Error> {
        let alphabet: Vec<AlphabetEntry> = doc.alphabet.iter().map(|s| entry_from_name(s)).collect();
        let state_count = doc.transform_adj_list.len();
        if doc.start_states_index >= state_count {
            return Err(DfaJsonError::StateIndexOutOfRange(doc.start_states_index, state_count));
        }

        let mut accepting: Vec<Option<Action>> = vec![None; state_count];
        for acc in &doc.accept_action_map {
            if acc.accpet_state_index >= state_count {
                return Err(DfaJsonError::StateIndexOutOfRange(acc.accpet_state_index, state_count));
            }
            accepting[acc.accpet_state_index] = Some(Action::from(ActionJson {
                order: acc.action.order,
                payload: acc.action.payload.clone(),
            }));
        }
        for &idx in &doc.accept_states_index {
            if idx >= state_count {
                return Err(DfaJsonError::StateIndexOutOfRange(idx, state_count));
            }
            accepting[idx].get_or_insert(Action::new(u32::MAX, ""));
        }

        let mut states = Vec::with_capacity(state_count);
        for (i, row) in doc.transform_adj_list.into_iter().enumerate() {
            let mut transitions = vec![NO_TRANSITION; alphabet.len()];
            for t in row {
                if t.alpha >= alphabet.len() {
                    return Err(DfaJsonError::SymbolIndexOutOfRange(t.alpha, alphabet.len()));
                }
                if t.target >= state_count {
                    return Err(DfaJsonError::StateIndexOutOfRange(t.target, state_count));
                }
                transitions[t.alpha] = t.target;
            }
            states.push(DfaState {
                name: Rc::from(i.to_string().as_str()),
                initial: i == doc.start_states_index,
                accepting: accepting[i].clone(),
                transitions,
            });
        }

        Ok(Dfa {
            alphabet: Rc::from(alphabet),
            states,
            initial_state: doc.start_states_index,
        })
    }
}

/// Parses a DFA from either the new or the legacy JSON schema.
pub fn parse_dfa_json(text: &str) -> Result<Dfa, DfaJsonError> {
    if let Ok(new_doc) = serde_json::from_str::<NewDfaJson>(text) {
        return Dfa::try_from(new_doc);
    }
    if let Ok(legacy_doc) = serde_json::from_str::<LegacyDfaJson>(text) {
        return Dfa::try_from(legacy_doc);
    }
    Err(DfaJsonError::UnrecognizedSchema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::nfa::Builder;

    fn char(c: char) -> AlphabetEntry {
        AlphabetEntry::Char(Rc::from(c.to_string().as_str()))
    }

    fn sample_dfa() -> Dfa {
        let mut b = Builder::new();
        let a = b.atom(char('a'));
        let bb = b.atom(char('b'));
        let ab = b.concat(a, bb);
        b.finish_rule(ab, Action::new(3, "return AB;"));
        let nfa = b.combine(vec![ab.start]);
        Dfa::from_nfa(&nfa)
    }

    #[test]
    fn round_trips_through_new_schema() {
        let dfa = sample_dfa();
        let json = dfa.to_json_string().unwrap();
        let back = parse_dfa_json(&json).unwrap();
        assert_eq!(dfa.states.len(), back.states.len());
        assert_eq!(dfa.alphabet, back.alphabet);
    }

    #[test]
    fn loads_legacy_schema() {
        let legacy = r#"{
            "alphabet": ["a", "b"],
            "startStatesIndex": 0,
            "acceptStatesIndex": [2],
            "transformAdjList": [
                [{"alpha": 0, "target": 1}],
                [{"alpha": 1, "target": 2}],
                []
            ],
            "acceptActionMap": [
                {"accpetStateIndex": 2, "action": {"order": 0, "payload": "return AB;"}}
            ]
        }"#;
        let dfa = parse_dfa_json(legacy).unwrap();
        assert_eq!(dfa.states.len(), 3);
        assert!(dfa.states[2].is_accepting());
    }
}
