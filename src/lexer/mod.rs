//! Regex-to-DFA lexer generator: session state, DFA construction, and the maximal-munch scanner
//! (components D, E, F).

pub mod builder;
pub mod dfa;
pub mod tokenizer;

pub use builder::{GeneratorSession, LexerAstBuilder, LexerBuildError};
pub use dfa::{Dfa, DfaState, MAX_STATES};
pub use tokenizer::{Token, TokenId, Tokenizer};
