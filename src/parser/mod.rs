//! Stack-driven predictive parser with panic-mode recovery (component J).

use crate::error::{ParseDiagnostic, StackOverflow};
use crate::grammar::{Grammar, NonTerminalId, Symbol, TerminalId};
use crate::lexer::{Token, TokenId};
use crate::ll1::{Ll1Table, END_OF_INPUT, NO_ENTRY, SYNC};
use crate::position::Position;

/// Default ceiling on simultaneous stack depth; a production push that would exceed it is a
/// fatal condition rather than a recoverable diagnostic.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackSymbol {
    End,
    Terminal(TerminalId),
    NonTerminal(NonTerminalId),
}

/// The result of one parse: whether the input was accepted, every recovered diagnostic in
/// encounter order, and the total error count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub accepted: bool,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub error_count: usize,
}

/// Runs the predictive parser over `tokens` (already filtered of whitespace/comment tokens by
/// the tokenizer) against `grammar`/`table`. Terminal token ids are assumed equal to the lexer's
/// own token ids. Stops recovering once `error_count` reaches `max_errors`; a stack depth beyond
/// `max_stack_depth` aborts immediately with `Err`.
pub fn parse(
    grammar: &Grammar,
    table: &Ll1Table,
    mut tokens: impl Iterator<Item = Token>,
    max_errors: usize,
    max_stack_depth: usize,
) -> Result<ParseOutcome, StackOverflow> {
    let mut stack = vec![StackSymbol::End, StackSymbol::NonTerminal(grammar.start_symbol())];
    let mut diagnostics = Vec::new();
    let mut error_count = 0usize;

    let mut lookahead = tokens.next();
    let mut last_position = Position::start();

    loop {
        if error_count >= max_errors {
            break;
        }

        let current_position = lookahead.as_ref().map(|t| t.start).unwrap_or(last_position);
        let terminal = terminal_of(&lookahead);

        let Some(&top) = stack.last() else {
            break;
        };

        match top {
            StackSymbol::End => {
                let at_eof = terminal == Some(END_OF_INPUT);
                if at_eof && error_count == 0 {
                    return Ok(ParseOutcome { accepted: true, diagnostics, error_count });
                }
                diagnostics.push(ParseDiagnostic {
                    at: current_position,
                    message: "trailing input after the start symbol was fully reduced".to_string(),
                });
                error_count += 1;
                break;
            }
            StackSymbol::Terminal(t) => {
                if terminal == Some(t) {
                    stack.pop();
                    last_position = current_position;
                    lookahead = tokens.next();
                } else {
                    diagnostics.push(ParseDiagnostic {
                        at: current_position,
                        message: format!(
                            "expected terminal {}, found {}",
                            t,
                            describe(&lookahead)
                        ),
                    });
                    error_count += 1;
                    stack.pop();
                }
            }
            StackSymbol::NonTerminal(a) => {
                let Some(terminal) = terminal else {
                    diagnostics.push(ParseDiagnostic {
                        at: current_position,
                        message: format!("unrecognised token {} has no terminal mapping", describe(&lookahead)),
                    });
                    error_count += 1;
                    lookahead = tokens.next();
                    continue;
                };

                let Some(cell) = table.get(a, terminal) else {
                    diagnostics.push(ParseDiagnostic {
                        at: current_position,
                        message: format!("terminal {} has no LL(1) table column", terminal),
                    });
                    error_count += 1;
                    lookahead = tokens.next();
                    continue;
                };

                if cell == NO_ENTRY {
                    diagnostics.push(ParseDiagnostic {
                        at: current_position,
                        message: format!("no production for [{}, {}]", grammar.nonterminal_name(a), describe(&lookahead)),
                    });
                    error_count += 1;
                    panic_mode_recover(table, &mut stack, a, &mut lookahead, &mut tokens);
                } else if cell == SYNC {
                    stack.pop();
                } else {
                    stack.pop();
                    let production = &grammar.productions[cell as usize];
                    if stack.len() + production.right.len() > max_stack_depth {
                        return Err(StackOverflow { bound: max_stack_depth });
                    }
                    for symbol in production.right.iter().rev() {
                        stack.push(match symbol {
                            Symbol::Terminal(t) => StackSymbol::Terminal(*t),
                            Symbol::NonTerminal(n) => StackSymbol::NonTerminal(*n),
                        });
                    }
                }
            }
        }
    }

    Ok(ParseOutcome { accepted: false, diagnostics, error_count })
}

/// Panic-mode recovery for an unmapped `[A, lookahead]` cell: skip tokens until the lookahead is
/// in FOLLOW(A) or EOF, popping `A` only once recovery lands on a FOLLOW member (or on EOF, only
/// if `$` is itself in FOLLOW(A)). Without a FOLLOW set, falls back to skipping a single token.
fn panic_mode_recover(
    table: &Ll1Table,
    stack: &mut Vec<StackSymbol>,
    a: NonTerminalId,
    lookahead: &mut Option<Token>,
    tokens: &mut impl Iterator<Item = Token>,
) {
    let Some(follow) = table.follow_of(a) else {
        *lookahead = tokens.next();
        return;
    };

    loop {
        let terminal = terminal_of(lookahead);
        match terminal {
            Some(END_OF_INPUT) => {
                if follow.contains(&END_OF_INPUT) {
                    stack.pop();
                }
                return;
            }
            Some(t) if follow.contains(&t) => {
                stack.pop();
                return;
            }
            _ => {
                *lookahead = tokens.next();
            }
        }
    }
}

fn terminal_of(token: &Option<Token>) -> Option<TerminalId> {
    match token {
        None => Some(END_OF_INPUT),
        Some(Token { token_id: TokenId::Token(id), .. }) => Some(*id as TerminalId),
        Some(Token { token_id: TokenId::Error, .. }) => None,
    }
}

fn describe(token: &Option<Token>) -> String {
    match token {
        None => "end of input".to_string(),
        Some(Token { token_id: TokenId::Token(id), .. }) => format!("token {}", id),
        Some(Token { token_id: TokenId::Error, .. }) => "an unrecognised byte".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::ll1::build;

    fn token(id: usize) -> Token {
        Token { token_id: TokenId::Token(id), lexeme: Vec::new(), start: Position::start() }
    }

    // S -> a S b | eps
    fn balanced_brackets() -> (Grammar, Ll1Table) {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let a = g.add_terminal("a", 0);
        let b = g.add_terminal("b", 1);
        g.add_production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(b)]);
        g.add_production(s, vec![]);
        let table = build(&g);
        (g, table)
    }

    #[test]
    fn accepts_well_formed_input() {
        let (g, table) = balanced_brackets();
        let tokens = vec![token(0), token(0), token(1), token(1)];
        let outcome = parse(&g, &table, tokens.into_iter(), 10, DEFAULT_MAX_STACK_DEPTH).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.error_count, 0);
    }

    #[test]
    fn reports_an_error_on_truncated_input() {
        let (g, table) = balanced_brackets();
        let tokens = vec![token(0), token(0), token(1)];
        let outcome = parse(&g, &table, tokens.into_iter(), 10, DEFAULT_MAX_STACK_DEPTH).unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.error_count >= 1);
    }

    #[test]
    fn stops_recovering_once_max_errors_is_reached() {
        // Five opens with no matching closes: after the opens run out, each pending `b` on the
        // stack mismatches against EOF in turn, so error_count grows until the cap stops it.
        let (g, table) = balanced_brackets();
        let tokens = vec![token(0); 5];
        let outcome = parse(&g, &table, tokens.into_iter(), 2, DEFAULT_MAX_STACK_DEPTH).unwrap();
        assert_eq!(outcome.error_count, 2);
    }
}
