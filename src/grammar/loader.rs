//! Line-oriented grammar-source loader (ambient, supplemental — §4.G / §12).
//!
//! Grounded in `generador_parser_ll1/grammar.c` and `first_&_follow.c`, which read exactly this
//! shape of text (one production head per `->` line, `|`-separated alternatives, optional
//! continuation lines) before the fixed-point computations run. This loader does no conflict
//! analysis; it only builds a [`Grammar`].

pub use crate::error::GrammarError;
use crate::grammar::{Grammar, NonTerminalId, Symbol, TerminalId};

/// Parses `source` into a [`Grammar`]. `classify` maps a symbol name to a terminal's token id;
/// any name it returns `None` for is registered as a nonterminal instead (auto-registered on
/// first mention, matching [`Grammar::add_nonterminal`]'s idempotence).
///
/// Syntax: `#` and `//` start a line comment, blank lines are ignored, a production head is
/// `LHS -> RHS (| RHS)*`, and a line beginning with `|` continues the previous head's
/// alternatives. `ε` or `eps` as the sole token of an alternative denotes the empty production.
pub fn load(
    source: &str,
    classify: impl Fn(&str) -> Option<TerminalId>,
) -> Result<Grammar, GrammarError> {
    let mut grammar = Grammar::new();
    let mut current_left: Option<NonTerminalId> = None;

    for (line_number, raw_line) in source.lines().enumerate() {
        let line_number = line_number + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let (left, alternatives_source) = if let Some(rest) = line.strip_prefix('|') {
            let left = current_left
                .ok_or_else(|| GrammarError::new(line_number, "continuation line with no preceding production head"))?;
            (left, rest)
        } else {
            let (head, rest) = line
                .split_once("->")
                .ok_or_else(|| GrammarError::new(line_number, "expected 'LHS -> RHS', found no '->'"))?;
            let head = head.trim();
            if head.is_empty() {
                return Err(GrammarError::new(line_number, "production head is empty"));
            }
            let left = grammar.add_nonterminal(head);
            current_left = Some(left);
            (left, rest)
        };

        for alternative in alternatives_source.split('|') {
            let tokens: Vec<&str> = alternative.split_whitespace().collect();
            let right = if tokens.is_empty() || (tokens.len() == 1 && is_epsilon(tokens[0])) {
                Vec::new()
            } else {
                tokens
                    .into_iter()
                    .map(|name| resolve_symbol(&mut grammar, name, &classify))
                    .collect()
            };
            grammar.add_production(left, right);
        }
    }

    Ok(grammar)
}

fn is_epsilon(token: &str) -> bool {
    token == "\u{03b5}" || token.eq_ignore_ascii_case("eps")
}

fn resolve_symbol(grammar: &mut Grammar, name: &str, classify: &impl Fn(&str) -> Option<TerminalId>) -> Symbol {
    match classify(name) {
        Some(token_id) => Symbol::Terminal(grammar.add_terminal(name, token_id)),
        None => Symbol::NonTerminal(grammar.add_nonterminal(name)),
    }
}

fn strip_comment(line: &str) -> &str {
    if let Some(idx) = line.find("//") {
        return &line[..idx];
    }
    if let Some(idx) = line.find('#') {
        return &line[..idx];
    }
    line
}
