//! Direct subset construction: regex AST + `followpos` → DFA (component E).

use crate::error::DfaError;
use crate::lexer::builder::GeneratorSession;
use crate::positions::PositionSet;
use crate::regex::{Kind, Node};
use std::collections::{HashMap, VecDeque};

/// Upper bound on the number of DFA states a single build may produce.
pub const MAX_STATES: usize = 4096;

/// Sentinel for "no transition" in the dense table, matching the reserved `-1` from the
/// external interface section.
pub const DEAD: i32 = -1;

/// One DFA state. State identity is `positions`; the builder enforces that no two states in a
/// finished `Dfa` share an equal `PositionSet`.
#[derive(Debug, Clone)]
pub struct DfaState {
    pub positions: PositionSet,
    pub token_id: Option<usize>,
}

impl DfaState {
    pub fn is_accept(&self) -> bool {
        self.token_id.is_some()
    }
}

/// A deterministic finite automaton with a dense `(state, byte) -> state` transition table.
/// The start state is always state `0`.
pub struct Dfa {
    pub states: Vec<DfaState>,
    /// Bytes that appear in some leaf of the source AST, in first-discovery order.
    pub alphabet: Vec<u8>,
    table: Vec<[i32; 128]>,
}

impl Dfa {
    /// `next_state[state][byte]`, or `DEAD` if there is no transition. Bytes outside `0..128`
    /// never have a transition.
    pub fn transition(&self, state: usize, byte: u8) -> i32 {
        if byte >= 128 {
            DEAD
        } else {
            self.table[state][byte as usize]
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Build a DFA from a combined regex AST whose `nullable`/`firstpos`/`lastpos`/`followpos`
    /// have already been computed (by `LexerAstBuilder::build`).
    pub fn build(root: &Node, session: &GeneratorSession) -> Result<Self, DfaError> {
        let (leaf_symbol, alphabet) = collect_leaves(root);

        let mut positions_of: Vec<PositionSet> = vec![root.firstpos];
        let mut index_of: HashMap<PositionSet, usize> = HashMap::new();
        index_of.insert(root.firstpos, 0);

        let mut worklist: VecDeque<usize> = VecDeque::new();
        worklist.push_back(0);

        // transitions[state][alphabet index] = successor state index, filled as discovered.
        let mut transitions: Vec<HashMap<u8, usize>> = vec![HashMap::new()];

        while let Some(state_index) = worklist.pop_front() {
            let positions = positions_of[state_index];

            for &symbol in &alphabet {
                let mut successor = PositionSet::init();
                for i in positions.iter() {
                    if leaf_symbol.get(&i) == Some(&symbol) {
                        successor.union_into(session.followpos(i));
                    }
                }
                if successor.is_empty() {
                    continue;
                }
                let next_index = match index_of.get(&successor) {
                    Some(&idx) => idx,
                    None => {
                        let idx = positions_of.len();
                        if idx >= MAX_STATES {
                            return Err(DfaError::StateBoundExceeded { bound: MAX_STATES });
                        }
                        positions_of.push(successor);
                        index_of.insert(successor, idx);
                        transitions.push(HashMap::new());
                        worklist.push_back(idx);
                        idx
                    }
                };
                transitions[state_index].insert(symbol, next_index);
            }
        }

        let states = positions_of
            .into_iter()
            .map(|positions| DfaState {
                positions,
                token_id: accepting_token(&positions, session),
            })
            .collect::<Vec<_>>();

        let mut table = vec![[DEAD; 128]; states.len()];
        for (state_index, trans) in transitions.into_iter().enumerate() {
            for (symbol, next) in trans {
                table[state_index][symbol as usize] = next as i32;
            }
        }

        session.trace(crate::error::Log::Verbose, || {
            format!("dfa build: discovered {} state(s) over an alphabet of {} byte(s)", states.len(), alphabet.len())
        });

        Ok(Dfa { states, alphabet, table })
    }
}

/// Smallest `token_id` among the end-marker positions contained in `positions`, realising
/// "earlier entry in the token list wins" (component E, accept labelling).
fn accepting_token(positions: &PositionSet, session: &GeneratorSession) -> Option<usize> {
    positions.iter().filter_map(|p| session.token_for(p)).min()
}

/// One depth-first walk collecting, for every leaf, its symbol (needed to compute successors)
/// and the distinct non-`#` symbols in first-discovery order (the alphabet).
fn collect_leaves(root: &Node) -> (HashMap<u32, u8>, Vec<u8>) {
    let mut leaf_symbol = HashMap::new();
    let mut alphabet = Vec::new();
    let mut seen = std::collections::HashSet::new();
    walk(root, &mut leaf_symbol, &mut alphabet, &mut seen);
    (leaf_symbol, alphabet)
}

fn walk(
    node: &Node,
    leaf_symbol: &mut HashMap<u32, u8>,
    alphabet: &mut Vec<u8>,
    seen: &mut std::collections::HashSet<u8>,
) {
    match &node.kind {
        Kind::Leaf { symbol, position } => {
            leaf_symbol.insert(*position, *symbol);
            if *symbol != b'#' && seen.insert(*symbol) {
                alphabet.push(*symbol);
            }
        }
        Kind::Concat(l, r) | Kind::Or(l, r) => {
            walk(l, leaf_symbol, alphabet, seen);
            walk(r, leaf_symbol, alphabet, seen);
        }
        Kind::Star(c) | Kind::Plus(c) | Kind::Question(c) => walk(c, leaf_symbol, alphabet, seen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::builder::LexerAstBuilder;

    #[test]
    fn no_two_states_share_a_position_set() {
        let (root, session) = LexerAstBuilder::build(&[(1, "a(b|c)*d")]).unwrap();
        let dfa = Dfa::build(&root, &session).unwrap();
        for i in 0..dfa.states.len() {
            for j in (i + 1)..dfa.states.len() {
                assert!(!dfa.states[i].positions.equal(&dfa.states[j].positions));
            }
        }
    }

    #[test]
    fn every_state_has_at_most_one_successor_per_byte() {
        let (root, session) = LexerAstBuilder::build(&[(1, "a(b|c)*d")]).unwrap();
        let dfa = Dfa::build(&root, &session).unwrap();
        for state in 0..dfa.states.len() {
            for byte in 0u8..128 {
                let t = dfa.transition(state, byte);
                assert!(t == DEAD || (t as usize) < dfa.states.len());
            }
        }
    }

    #[test]
    fn accept_state_token_id_is_the_minimum_contributing_end_marker() {
        let (root, session) = LexerAstBuilder::build(&[(5, "if"), (9, "[a-z]+")]).unwrap();
        let dfa = Dfa::build(&root, &session).unwrap();
        // "if" is also a valid "[a-z]+" match, so the state accepting "if" must prefer token 5.
        let mut state = 0usize;
        for b in b"if" {
            let next = dfa.transition(state, *b);
            assert_ne!(next, DEAD);
            state = next as usize;
        }
        assert_eq!(dfa.states[state].token_id, Some(5));
    }

    #[test]
    fn a_star_accepts_only_when_whole_input_is_empty() {
        let (root, session) = LexerAstBuilder::build(&[(1, "a*")]).unwrap();
        let dfa = Dfa::build(&root, &session).unwrap();
        assert!(dfa.states[0].is_accept());
    }
}
