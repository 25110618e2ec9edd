//! A lexer and LL(1) parser-table generator.
//!
//! # Overview
//!
//! Given a priority-ordered list of token regexes, this crate builds a direct DFA (no
//! intermediate NFA) by the Aho–Sethi–Ullman position-set construction, and hands back a
//! maximal-munch tokenizer over it. Given an arbitrary context-free grammar, it computes FIRST
//! and FOLLOW sets by fixed-point iteration, assembles an LL(1) predictive-parse table
//! (reporting conflicts rather than refusing to build one), and runs a stack-driven predictive
//! parser with panic-mode error recovery over a token stream.
//!
//! The three pieces compose but do not depend on each other: a grammar's terminals are plain
//! token ids, and nothing in [`grammar`] or [`ll1`] requires the tokens to have come from
//! [`lexer`].
//!
//! # Example
//!
//! ```
//! use dfa_ll1::lexer::{Dfa, LexerAstBuilder, Tokenizer, TokenId};
//!
//! let (root, session) = LexerAstBuilder::build(&[
//!     (1, "if"),
//!     (2, "[a-z]+"),
//!     (3, "[ \t]+"),
//! ])
//! .unwrap();
//! let dfa = Dfa::build(&root, &session).unwrap();
//!
//! let tokens = Tokenizer::new(&dfa, b"if foo").tokenize(|t| t.token_id == TokenId::Token(3));
//! assert_eq!(tokens.len(), 2);
//! ```
//!
//! ```
//! use dfa_ll1::grammar::{Grammar, Symbol};
//! use dfa_ll1::ll1;
//!
//! // S -> a S b | eps
//! let mut grammar = Grammar::new();
//! let s = grammar.add_nonterminal("S");
//! let a = grammar.add_terminal("a", 0);
//! let b = grammar.add_terminal("b", 1);
//! grammar.add_production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(b)]);
//! grammar.add_production(s, vec![]);
//!
//! let table = ll1::build(&grammar);
//! assert!(table.conflict_free);
//! ```
//!
//! # License
//! [dfa_ll1](crate) is provided under the MIT license. See [LICENSE](https://github.com/creative-forest/dfa-ll1/blob/main/LICENSE).

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod ll1;
pub mod parser;
pub mod position;
pub mod positions;
pub mod regex;

mod scenarios;

pub use error::Log;
pub use position::Position;
pub use positions::{PositionSet, MAX_POSITIONS};
