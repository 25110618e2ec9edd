//! Grammar representation: symbols, productions, named lookup (component G).

pub mod loader;

use std::collections::HashMap;

pub type NonTerminalId = usize;
pub type TerminalId = usize;

/// A symbol on the right-hand side of a production: either a terminal, identified by the token
/// id a caller gave it through [`Grammar::add_terminal`], or a nonterminal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TerminalId),
    NonTerminal(NonTerminalId),
}

/// `left -> right`; an empty `right` denotes the production `left -> ε`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: NonTerminalId,
    pub right: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

/// Nonterminals, terminals, and productions, with idempotent name-based registration. Production
/// ids are their insertion-order index into `productions`, which is also the identity the LL(1)
/// table (component I) stores.
#[derive(Default)]
pub struct Grammar {
    nonterminal_names: Vec<String>,
    name_to_nonterminal: HashMap<String, NonTerminalId>,
    terminal_names: HashMap<TerminalId, String>,
    name_to_terminal: HashMap<String, TerminalId>,
    terminal_order: Vec<TerminalId>,
    pub productions: Vec<Production>,
    start: Option<NonTerminalId>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as a nonterminal, returning its existing index if already registered.
    /// The first nonterminal ever added becomes the start symbol, unless [`Grammar::set_start`]
    /// is called afterward.
    pub fn add_nonterminal(&mut self, name: &str) -> NonTerminalId {
        if let Some(&id) = self.name_to_nonterminal.get(name) {
            return id;
        }
        let id = self.nonterminal_names.len();
        self.nonterminal_names.push(name.to_string());
        self.name_to_nonterminal.insert(name.to_string(), id);
        if self.start.is_none() {
            self.start = Some(id);
        }
        id
    }

    /// Registers `name` as a terminal bound to `token_id`, returning `token_id`. Idempotent on
    /// name: a repeated name returns the token id it was first registered with.
    pub fn add_terminal(&mut self, name: &str, token_id: TerminalId) -> TerminalId {
        if let Some(&id) = self.name_to_terminal.get(name) {
            return id;
        }
        self.name_to_terminal.insert(name.to_string(), token_id);
        self.terminal_names.insert(token_id, name.to_string());
        self.terminal_order.push(token_id);
        token_id
    }

    /// Distinct terminal token ids, in first-registration order. Used to assign deterministic
    /// LL(1) table columns.
    pub fn terminals(&self) -> &[TerminalId] {
        &self.terminal_order
    }

    pub fn add_production(&mut self, left: NonTerminalId, right: Vec<Symbol>) -> usize {
        let id = self.productions.len();
        self.productions.push(Production { left, right });
        id
    }

    pub fn set_start(&mut self, nonterminal: NonTerminalId) {
        self.start = Some(nonterminal);
    }

    pub fn start_symbol(&self) -> NonTerminalId {
        self.start.expect("at least one nonterminal has been added")
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminal_names.len()
    }

    pub fn nonterminal_name(&self, id: NonTerminalId) -> &str {
        &self.nonterminal_names[id]
    }

    pub fn terminal_name(&self, id: TerminalId) -> Option<&str> {
        self.terminal_names.get(&id).map(String::as_str)
    }

    pub fn nonterminal_id(&self, name: &str) -> Option<NonTerminalId> {
        self.name_to_nonterminal.get(name).copied()
    }

    pub fn terminal_id(&self, name: &str) -> Option<TerminalId> {
        self.name_to_terminal.get(name).copied()
    }

    pub fn productions_of(&self, left: NonTerminalId) -> impl Iterator<Item = (usize, &Production)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.left == left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_nonterminal_is_idempotent_on_name() {
        let mut g = Grammar::new();
        let a = g.add_nonterminal("S");
        let b = g.add_nonterminal("S");
        assert_eq!(a, b);
    }

    #[test]
    fn first_nonterminal_is_the_start_symbol() {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        g.add_nonterminal("T");
        assert_eq!(g.start_symbol(), s);
    }

    #[test]
    fn add_terminal_is_idempotent_and_keeps_first_token_id() {
        let mut g = Grammar::new();
        assert_eq!(g.add_terminal("a", 5), 5);
        assert_eq!(g.add_terminal("a", 9), 5);
    }

    #[test]
    fn production_with_empty_right_is_epsilon() {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let p = g.add_production(s, vec![]);
        assert!(g.productions[p].is_epsilon());
    }
}
