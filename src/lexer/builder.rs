//! Combines N per-token regex ASTs into one DFA-ready tree (component D), and owns the
//! per-invocation state (positions counter, `followpos`, `pos_to_token`) the rest of the
//! pipeline consults.
//!
//! `GeneratorSession` is the Rust shape of the distilled spec's Design Notes §9: the original
//! source kept `followpos`, `pos_to_token`, and the positions counter as process-wide globals,
//! reset at the start of each generator invocation. Here they are fields of a value that is
//! created fresh per `LexerAstBuilder::build` call, so nothing is shared across invocations
//! unless a caller chooses to share a session explicitly.

use crate::error::{Log, RegexError};
use crate::positions::{PositionSet, MAX_POSITIONS};
use crate::regex::{compute_followpos, compute_functions, Node, RegexParser};
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Owns the positions counter, `followpos` table, and `pos_to_token` map for one generator
/// invocation. See the module documentation for why this replaced a set of globals. Also owns
/// this invocation's debug-tracing verbosity, set at most once through [`GeneratorSession::set_log`]
/// and consulted by [`GeneratorSession::trace`] — the same `OnceCell<Log<..>>` shape the teacher
/// crate's `LexemeLogger` uses for its own debug printing.
pub struct GeneratorSession {
    next_position: u32,
    overflowed: bool,
    followpos: Box<[PositionSet; MAX_POSITIONS]>,
    pos_to_token: HashMap<u32, usize>,
    log: OnceCell<Log>,
}

impl GeneratorSession {
    /// Position `0` is reserved and never handed out.
    pub fn new() -> Self {
        Self {
            next_position: 1,
            overflowed: false,
            followpos: Box::new([PositionSet::init(); MAX_POSITIONS]),
            pos_to_token: HashMap::new(),
            log: OnceCell::new(),
        }
    }

    /// Sets this session's debug-tracing verbosity. Only the first call takes effect, mirroring
    /// `OnceCell::set`; later calls are silently ignored.
    pub fn set_log(&self, log: Log) {
        let _ = self.log.set(log);
    }

    fn log_level(&self) -> Log {
        self.log.get().copied().unwrap_or_default()
    }

    /// Prints `message()` when this session's verbosity is at least `level`. Debug builds only,
    /// gated the same way the teacher's `LexemeLogger::log_enter`/`log_result` are.
    pub fn trace(&self, level: Log, message: impl FnOnce() -> String) {
        let should_print = self.log_level() >= level;
        #[cfg(debug_assertions)]
        if should_print {
            println!("{}", message());
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = (should_print, message);
        }
    }

    pub fn next_position(&mut self) -> u32 {
        if (self.next_position as usize) >= MAX_POSITIONS {
            self.overflowed = true;
            return (MAX_POSITIONS - 1) as u32;
        }
        let p = self.next_position;
        self.next_position += 1;
        p
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn followpos(&self, p: u32) -> &PositionSet {
        &self.followpos[p as usize]
    }

    pub fn followpos_mut(&mut self, p: u32) -> &mut PositionSet {
        &mut self.followpos[p as usize]
    }

    pub fn set_token_for(&mut self, p: u32, token_id: usize) {
        self.pos_to_token.insert(p, token_id);
    }

    /// `None` for every position except the end-marker leaves appended by this builder.
    pub fn token_for(&self, p: u32) -> Option<usize> {
        self.pos_to_token.get(&p).copied()
    }
}

impl Default for GeneratorSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A regex syntax error, or a fatal position-bound overflow, raised while combining token ASTs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexerBuildError {
    Regex(RegexError),
    PositionBoundExceeded,
    NoTokens,
}

impl From<RegexError> for LexerBuildError {
    fn from(e: RegexError) -> Self {
        LexerBuildError::Regex(e)
    }
}

impl Display for LexerBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerBuildError::Regex(e) => write!(f, "{}", e),
            LexerBuildError::PositionBoundExceeded => {
                write!(f, "combined regex AST exceeds the maximum number of leaf positions")
            }
            LexerBuildError::NoTokens => write!(f, "at least one token definition is required"),
        }
    }
}

/// Combines an ordered list of `(token_id, regex_source)` pairs into one AST, appending an
/// end-marker leaf to each and recording its token id, then joining all per-token trees
/// left-to-right under `Or`. Priority is the position in the list: lower index wins ties in the
/// DFA's accept-state labelling (component E), because token ids are assumed to increase with
/// list position and the accept rule keeps the smallest token id.
pub struct LexerAstBuilder;

impl LexerAstBuilder {
    pub fn build(tokens: &[(usize, &str)]) -> Result<(Node, GeneratorSession), LexerBuildError> {
        let mut session = GeneratorSession::new();
        let mut combined: Option<Node> = None;

        for (token_id, pattern) in tokens {
            let atom = RegexParser::new(pattern).parse(&mut session)?;
            let end_position = session.next_position();
            session.set_token_for(end_position, *token_id);
            let with_end_marker = Node::concat(atom, Node::leaf(b'#', end_position));
            combined = Some(match combined {
                None => with_end_marker,
                Some(prev) => Node::or(prev, with_end_marker),
            });
        }

        let mut root = combined.ok_or(LexerBuildError::NoTokens)?;
        compute_functions(&mut root);
        compute_followpos(&root, &mut session);

        if session.overflowed() {
            return Err(LexerBuildError::PositionBoundExceeded);
        }

        session.trace(Log::Summary, || format!("combined {} token pattern(s) into one AST", tokens.len()));

        Ok((root, session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_markers_are_registered_by_priority_order() {
        let (_, session) = LexerAstBuilder::build(&[(1, "if"), (2, "[a-z]+")]).unwrap();
        // Two end-marker positions were minted: one for each token, after all of "if"'s and
        // "[a-z]+"'s own leaves.
        let mut marked: Vec<u32> = (1..MAX_POSITIONS as u32)
            .filter(|p| session.token_for(*p).is_some())
            .collect();
        marked.sort();
        assert_eq!(marked.len(), 2);
        assert_eq!(session.token_for(marked[0]), Some(1));
        assert_eq!(session.token_for(marked[1]), Some(2));
    }

    #[test]
    fn requires_at_least_one_token() {
        assert_eq!(LexerAstBuilder::build(&[]), Err(LexerBuildError::NoTokens));
    }

    #[test]
    fn log_level_defaults_to_none_and_set_log_only_takes_the_first_call() {
        let session = GeneratorSession::new();
        assert_eq!(session.log_level(), Log::None);
        session.set_log(Log::Verbose);
        assert_eq!(session.log_level(), Log::Verbose);
        session.set_log(Log::Summary);
        assert_eq!(session.log_level(), Log::Verbose);
    }
}
