//! Diagnostic types returned by the generator and runtime components.
//!
//! Every fallible entry point returns one of these instead of panicking or writing to stderr
//! itself; a caller decides how (and whether) to print them.

use crate::position::Position;
use std::fmt::{Display, Formatter};

/// A syntax error produced while parsing one regex source string (component C).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexError {
    pub at: usize,
    pub message: String,
}

impl RegexError {
    pub fn new(at: usize, message: impl Into<String>) -> Self {
        Self {
            at,
            message: message.into(),
        }
    }

    pub fn unexpected(at: usize, expected: &str, found: &str) -> Self {
        Self::new(at, format!("expected {}, found {}", expected, found))
    }

    pub fn unsupported(at: usize, what: &str) -> Self {
        Self::new(at, format!("{} is not supported", what))
    }
}

impl Display for RegexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "regex error at byte {}: {}", self.at, self.message)
    }
}

/// Fatal resource-exhaustion conditions while building a DFA (component E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DfaError {
    PositionBoundExceeded,
    StateBoundExceeded { bound: usize },
}

impl Display for DfaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DfaError::PositionBoundExceeded => {
                write!(f, "regex AST exceeds the maximum number of leaf positions")
            }
            DfaError::StateBoundExceeded { bound } => {
                write!(f, "DFA construction exceeded the state bound ({})", bound)
            }
        }
    }
}

/// A syntax error from the optional grammar-source loader (component G).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub line: usize,
    pub message: String,
}

impl GrammarError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "grammar source error at line {}: {}", self.line, self.message)
    }
}

/// One colliding LL(1) table cell (component I). Non-fatal: the table keeps the winning
/// alternative and construction continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConflict {
    pub nonterminal: usize,
    pub terminal_column: usize,
    pub kept_production: usize,
    pub discarded_production: usize,
}

impl Display for TableConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LL(1) conflict at [A{}, column {}]: kept production #{}, discarded #{}",
            self.nonterminal, self.terminal_column, self.kept_production, self.discarded_production
        )
    }
}

/// One recovered syntax error from the predictive parser (component J). Non-fatal unless the
/// parser's `max_errors` bound is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub at: Position,
    pub message: String,
}

impl ParseDiagnostic {
    pub fn new(at: Position, message: impl Into<String>) -> Self {
        Self {
            at,
            message: message.into(),
        }
    }
}

impl Display for ParseDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error at {}: {}", self.at, self.message)
    }
}

/// Fatal condition raised by the predictive parser (component J): the right-hand side of a
/// production would push the stack past its configured bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOverflow {
    pub bound: usize,
}

impl Display for StackOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "parser stack exceeded its bound of {} frames", self.bound)
    }
}

/// Verbosity knob for the optional tracing a few generator/runtime components support.
///
/// Mirrors the teacher crate's own debug-only `Log` type: this is developer tracing, gated
/// behind an explicit opt-in, never the channel error diagnostics travel through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Log {
    #[default]
    None,
    Summary,
    Verbose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_are_human_readable() {
        let e = RegexError::unexpected(3, "')'", "EOF");
        assert_eq!(e.to_string(), "regex error at byte 3: expected ')', found EOF");

        let c = TableConflict {
            nonterminal: 0,
            terminal_column: 2,
            kept_production: 1,
            discarded_production: 4,
        };
        assert!(c.to_string().contains("kept production #1"));
    }
}
