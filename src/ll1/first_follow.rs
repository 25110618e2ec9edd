//! FIRST and FOLLOW fixed-point computation (component H).

use crate::grammar::{Grammar, NonTerminalId, Symbol, TerminalId};
use std::collections::{HashMap, HashSet};

/// Reserved column for end-of-input (`$`) inside FOLLOW sets; never a real token id a caller
/// registered through [`Grammar::add_terminal`].
pub const END_OF_INPUT: TerminalId = TerminalId::MAX;

/// FIRST of a nonterminal or a sequence: the terminals (and `$`, for FOLLOW only) that can begin
/// it, plus whether it can derive the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: HashSet<TerminalId>,
    pub nullable: bool,
}

pub struct FirstSets {
    by_nonterminal: HashMap<NonTerminalId, FirstSet>,
}

impl FirstSets {
    pub fn of_nonterminal(&self, nonterminal: NonTerminalId) -> &FirstSet {
        &self.by_nonterminal[&nonterminal]
    }

    /// FIRST of a symbol: a terminal's own singleton, or a nonterminal's computed set.
    pub fn of_symbol(&self, symbol: Symbol) -> FirstSet {
        match symbol {
            Symbol::Terminal(t) => FirstSet {
                terminals: HashSet::from([t]),
                nullable: false,
            },
            Symbol::NonTerminal(a) => self.of_nonterminal(a).clone(),
        }
    }

    /// FIRST of a sequence: union FIRST of each symbol in order, excluding ε, stopping at the
    /// first non-nullable symbol; nullable iff every symbol in the sequence is nullable.
    pub fn of_sequence(&self, sequence: &[Symbol]) -> FirstSet {
        let mut result = FirstSet::default();
        result.nullable = true;
        for &symbol in sequence {
            let first = self.of_symbol(symbol);
            result.terminals.extend(&first.terminals);
            if !first.nullable {
                result.nullable = false;
                break;
            }
        }
        result
    }
}

/// Computes FIRST for every nonterminal by fixed-point iteration until a full pass changes
/// nothing.
pub fn compute_first(grammar: &Grammar) -> FirstSets {
    let mut by_nonterminal: HashMap<NonTerminalId, FirstSet> = (0..grammar.nonterminal_count())
        .map(|id| (id, FirstSet::default()))
        .collect();

    loop {
        let mut changed = false;
        let snapshot = FirstSets {
            by_nonterminal: by_nonterminal.clone(),
        };
        for production in &grammar.productions {
            let rhs_first = snapshot.of_sequence(&production.right);
            let entry = by_nonterminal.get_mut(&production.left).unwrap();
            for t in &rhs_first.terminals {
                changed |= entry.terminals.insert(*t);
            }
            if rhs_first.nullable && !entry.nullable {
                entry.nullable = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    FirstSets { by_nonterminal }
}

/// Computes FOLLOW for every nonterminal by fixed-point iteration, seeded with `$` in
/// FOLLOW(start).
pub fn compute_follow(grammar: &Grammar, firsts: &FirstSets) -> HashMap<NonTerminalId, HashSet<TerminalId>> {
    let mut follow: HashMap<NonTerminalId, HashSet<TerminalId>> = (0..grammar.nonterminal_count())
        .map(|id| (id, HashSet::new()))
        .collect();
    follow.get_mut(&grammar.start_symbol()).unwrap().insert(END_OF_INPUT);

    loop {
        let mut changed = false;
        for production in &grammar.productions {
            for (i, symbol) in production.right.iter().enumerate() {
                let Symbol::NonTerminal(a) = *symbol else { continue };
                let beta = &production.right[i + 1..];
                let beta_first = firsts.of_sequence(beta);

                let mut additions: Vec<TerminalId> = beta_first.terminals.iter().copied().collect();
                if beta.is_empty() || beta_first.nullable {
                    additions.extend(follow[&production.left].iter().copied());
                }

                let entry = follow.get_mut(&a).unwrap();
                for t in additions {
                    changed |= entry.insert(t);
                }
            }
        }
        if !changed {
            break;
        }
    }

    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    // S -> a S b | eps
    fn balanced_brackets() -> Grammar {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let a = g.add_terminal("a", 0);
        let b = g.add_terminal("b", 1);
        g.add_production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(b)]);
        g.add_production(s, vec![]);
        g
    }

    #[test]
    fn first_of_start_is_a_and_epsilon() {
        let g = balanced_brackets();
        let firsts = compute_first(&g);
        let first_s = firsts.of_nonterminal(g.start_symbol());
        assert!(first_s.terminals.contains(&0));
        assert!(first_s.nullable);
        assert!(!first_s.terminals.contains(&1));
    }

    #[test]
    fn follow_of_start_is_b_and_end_of_input() {
        let g = balanced_brackets();
        let firsts = compute_first(&g);
        let follow = compute_follow(&g, &firsts);
        let follow_s = &follow[&g.start_symbol()];
        assert!(follow_s.contains(&1));
        assert!(follow_s.contains(&END_OF_INPUT));
    }
}
