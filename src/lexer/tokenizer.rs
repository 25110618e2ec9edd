//! Maximal-munch scanning over a `Dfa` (component F).

use crate::lexer::dfa::{Dfa, DEAD};
use crate::position::Position;

/// A single token recognised from the input. `lexeme` is an owned copy of the matched bytes;
/// `start` is the position of its first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_id: TokenId,
    pub lexeme: Vec<u8>,
    pub start: Position,
}

/// `Ok` for a DFA-recognised token, `Error` for the single-byte fallback emitted when the DFA
/// gets stuck with no prior accepting checkpoint (component F, error recovery).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    Token(usize),
    Error,
}

/// Scans `source` against `dfa` using maximal munch: the scanner keeps advancing while a
/// transition exists, remembering the most recent accepting state as a checkpoint, and emits the
/// longest match found once no further transition is possible. A caller-supplied `skip`
/// predicate filters whitespace/comment tokens out of the returned stream without the DFA ever
/// needing to know about them.
pub struct Tokenizer<'a> {
    dfa: &'a Dfa,
    source: &'a [u8],
    cursor: usize,
    position: Position,
}

impl<'a> Tokenizer<'a> {
    pub fn new(dfa: &'a Dfa, source: &'a [u8]) -> Self {
        Self {
            dfa,
            source,
            cursor: 0,
            position: Position::start(),
        }
    }

    /// Tokenizes the whole input, dropping any token for which `skip` returns `true`.
    pub fn tokenize(mut self, skip: impl Fn(&Token) -> bool) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            if !skip(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Option<Token> {
        if self.cursor >= self.source.len() {
            return None;
        }

        let start_cursor = self.cursor;
        let start_position = self.position;

        let mut state = 0usize;
        let mut cursor = self.cursor;
        let mut position = self.position;

        // Most recent accepting checkpoint: (length consumed, token id, position after it). The
        // start state accepting (a nullable token regex, e.g. `a*`) is deliberately not seeded
        // here: a zero-length match would never let `self.cursor` advance, and since this
        // function is only reached while input remains, a checkpoint must consume at least one
        // byte to be usable (§4.F step 4: a zero-length best match falls through to the one-byte
        // error token instead of being emitted).
        let mut checkpoint: Option<(usize, usize, Position)> = None;

        while cursor < self.source.len() {
            let byte = self.source[cursor];
            let next = self.dfa.transition(state, byte);
            if next == DEAD {
                break;
            }
            state = next as usize;
            cursor += 1;
            position.advance(byte);
            if self.dfa.states[state].is_accept() {
                checkpoint = Some((cursor - start_cursor, self.dfa.states[state].token_id.unwrap(), position));
            }
        }

        match checkpoint {
            Some((length, token_id, end_position)) => {
                let lexeme = self.source[start_cursor..start_cursor + length].to_vec();
                self.cursor = start_cursor + length;
                self.position = end_position;
                Some(Token {
                    token_id: TokenId::Token(token_id),
                    lexeme,
                    start: start_position,
                })
            }
            None => {
                // No accepting checkpoint at all: consume exactly one byte as an error token so
                // the scanner always makes progress.
                let byte = self.source[start_cursor];
                self.cursor = start_cursor + 1;
                self.position.advance(byte);
                Some(Token {
                    token_id: TokenId::Error,
                    lexeme: vec![byte],
                    start: start_position,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::builder::LexerAstBuilder;

    fn build_dfa(tokens: &[(usize, &str)]) -> Dfa {
        let (root, session) = LexerAstBuilder::build(tokens).unwrap();
        Dfa::build(&root, &session).unwrap()
    }

    #[test]
    fn maximal_munch_prefers_the_longest_match() {
        let dfa = build_dfa(&[(1, "if"), (2, "[a-z]+")]);
        let tokens = Tokenizer::new(&dfa, b"iffy").tokenize(|_| false);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_id, TokenId::Token(2));
        assert_eq!(tokens[0].lexeme, b"iffy");
    }

    #[test]
    fn priority_breaks_ties_at_equal_length() {
        let dfa = build_dfa(&[(1, "if"), (2, "[a-z]+")]);
        let tokens = Tokenizer::new(&dfa, b"if").tokenize(|_| false);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_id, TokenId::Token(1));
    }

    #[test]
    fn unrecognised_byte_becomes_an_error_token() {
        let dfa = build_dfa(&[(1, "[a-z]+")]);
        let tokens = Tokenizer::new(&dfa, b"a!b").tokenize(|_| false);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token_id, TokenId::Token(1));
        assert_eq!(tokens[1].token_id, TokenId::Error);
        assert_eq!(tokens[1].lexeme, b"!");
        assert_eq!(tokens[2].token_id, TokenId::Token(1));
    }

    #[test]
    fn skip_predicate_filters_whitespace() {
        let dfa = build_dfa(&[(1, "[a-z]+"), (2, " +")]);
        let tokens = Tokenizer::new(&dfa, b"a b").tokenize(|t| t.token_id == TokenId::Token(2));
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, b"a");
        assert_eq!(tokens[1].lexeme, b"b");
    }

    #[test]
    fn nullable_pattern_does_not_emit_a_zero_length_token() {
        let dfa = build_dfa(&[(1, "a*")]);
        let tokens = Tokenizer::new(&dfa, b"b").tokenize(|_| false);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_id, TokenId::Error);
        assert_eq!(tokens[0].lexeme, b"b");
    }

    #[test]
    fn nullable_pattern_matches_greedily_then_falls_back_on_the_remainder() {
        let dfa = build_dfa(&[(1, "a*")]);
        let tokens = Tokenizer::new(&dfa, b"aab").tokenize(|_| false);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_id, TokenId::Token(1));
        assert_eq!(tokens[0].lexeme, b"aa");
        assert_eq!(tokens[1].token_id, TokenId::Error);
        assert_eq!(tokens[1].lexeme, b"b");
    }

    #[test]
    fn line_and_column_advance_over_newlines() {
        let dfa = build_dfa(&[(1, "[a-z\n]+")]);
        let tokens = Tokenizer::new(&dfa, b"a\nb").tokenize(|_| false);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start, Position::new(1, 1));
    }
}
