//! Recursive-descent recogniser for the regex source language (component C).
//!
//! The grammar is LL(1) by construction (see the component design), so it is implemented here
//! directly as a hand-written recursive descent over one token of lookahead, rather than by
//! bootstrapping the crate's own general-purpose LL(1) engine — that composition is a detail
//! the rest of the crate stays independent of.

use crate::error::RegexError;
use crate::lexer::builder::GeneratorSession;
use crate::regex::ast::Node;

/// Parses one regex source string against a shared [`GeneratorSession`], which supplies fresh
/// leaf positions. The session is shared across every token pattern a caller parses so that
/// positions stay unique across the whole combined AST (component D).
pub struct RegexParser<'s> {
    source: &'s [u8],
    cursor: usize,
}

impl<'s> RegexParser<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source: source.as_bytes(),
            cursor: 0,
        }
    }

    pub fn parse(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        let node = self.parse_regex(session)?;
        if self.cursor != self.source.len() {
            return Err(RegexError::unexpected(
                self.cursor,
                "end of pattern",
                &self.describe_current(),
            ));
        }
        Ok(node)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.cursor += 1;
        Some(b)
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(b) => format!("'{}'", b as char),
            None => "end of pattern".to_string(),
        }
    }

    fn fresh_leaf(&self, symbol: u8, session: &mut GeneratorSession) -> Node {
        Node::leaf(symbol, session.next_position())
    }

    // Regex -> Concat ConcatTail
    fn parse_regex(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        let mut node = self.parse_concat(session)?;
        while self.peek() == Some(b'|') {
            self.advance();
            let rhs = self.parse_concat(session)?;
            node = Node::or(node, rhs);
        }
        Ok(node)
    }

    // Concat -> Repeat Concat | ε
    fn parse_concat(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        let mut parts = Vec::new();
        while self.starts_atom() {
            parts.push(self.parse_repeat(session)?);
        }
        let mut parts = parts.into_iter();
        let first = parts.next().ok_or_else(|| {
            RegexError::new(
                self.cursor,
                "an empty alternative or empty pattern is not supported; patterns must not match the empty string",
            )
        })?;
        Ok(parts.fold(first, Node::concat))
    }

    fn starts_atom(&self) -> bool {
        match self.peek() {
            None | Some(b'|') | Some(b')') => false,
            _ => true,
        }
    }

    // Repeat -> Atom Postfix
    fn parse_repeat(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        let atom = self.parse_atom(session)?;
        Ok(match self.peek() {
            Some(b'*') => {
                self.advance();
                Node::star(atom)
            }
            Some(b'+') => {
                self.advance();
                Node::plus(atom)
            }
            Some(b'?') => {
                self.advance();
                Node::question(atom)
            }
            _ => atom,
        })
    }

    // Atom -> CHAR | ESCAPE | '(' Regex ')' | '[' CharClass ']' | '.'
    fn parse_atom(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        match self.peek() {
            Some(b'(') => {
                self.advance();
                let inner = self.parse_regex(session)?;
                match self.advance() {
                    Some(b')') => Ok(inner),
                    other => Err(RegexError::unexpected(
                        self.cursor,
                        "')'",
                        &other.map_or("end of pattern".into(), |b| format!("'{}'", b as char)),
                    )),
                }
            }
            Some(b'[') => {
                self.advance();
                let node = self.parse_char_class(session)?;
                match self.advance() {
                    Some(b']') => Ok(node),
                    other => Err(RegexError::unexpected(
                        self.cursor,
                        "']'",
                        &other.map_or("end of pattern".into(), |b| format!("'{}'", b as char)),
                    )),
                }
            }
            Some(b'.') => {
                self.advance();
                Ok(self.printable_ascii_class(session))
            }
            Some(b'\\') => {
                self.advance();
                let escaped = self
                    .advance()
                    .ok_or_else(|| RegexError::new(self.cursor, "dangling escape at end of pattern"))?;
                Ok(self.fresh_leaf(escaped, session))
            }
            Some(b) => {
                self.advance();
                Ok(self.fresh_leaf(b, session))
            }
            None => Err(RegexError::new(self.cursor, "expected an atom, found end of pattern")),
        }
    }

    // '.' desugars to an alternation over printable ASCII (32..126 inclusive, '\n' excluded).
    fn printable_ascii_class(&self, session: &mut GeneratorSession) -> Node {
        self.alternate_over_bytes((32..=126u8).filter(|b| *b != b'\n'), session)
    }

    fn alternate_over_bytes(&self, bytes: impl Iterator<Item = u8>, session: &mut GeneratorSession) -> Node {
        let mut leaves = bytes.map(|b| self.fresh_leaf(b, session));
        let first = leaves.next().expect("byte range is non-empty");
        leaves.fold(first, Node::or)
    }

    // CharClass -> '^'? CCItems
    fn parse_char_class(&mut self, session: &mut GeneratorSession) -> Result<Node, RegexError> {
        let negated = self.peek() == Some(b'^');
        if negated {
            self.advance();
        }

        let mut items: Vec<CcItem> = Vec::new();
        while self.peek().is_some() && self.peek() != Some(b']') {
            items.push(self.parse_cc_item()?);
        }
        if items.is_empty() {
            return Err(RegexError::new(self.cursor, "character class must not be empty"));
        }
        if negated {
            return Err(RegexError::unsupported(self.cursor, "negated character classes ('[^...]')"));
        }

        let mut leaves = items.into_iter().flat_map(|item| match item {
            CcItem::Single(b) => vec![b],
            CcItem::Range(lo, hi) => (lo..=hi).collect(),
        });
        let first_byte = leaves.next().expect("validated non-empty above");
        let first = self.fresh_leaf(first_byte, session);
        Ok(leaves.fold(first, |acc, b| Node::or(acc, self.fresh_leaf(b, session))))
    }

    // CCItem -> CHAR RangeOpt | ESCAPE
    fn parse_cc_item(&mut self) -> Result<CcItem, RegexError> {
        let lo = match self.advance() {
            Some(b'\\') => self
                .advance()
                .ok_or_else(|| RegexError::new(self.cursor, "dangling escape inside character class"))?,
            Some(b) => b,
            None => return Err(RegexError::new(self.cursor, "unterminated character class")),
        };
        if self.peek() == Some(b'-') && self.source.get(self.cursor + 1) != Some(&b']') {
            self.advance();
            let hi = self
                .advance()
                .ok_or_else(|| RegexError::new(self.cursor, "dangling range inside character class"))?;
            if hi < lo {
                return Err(RegexError::new(self.cursor, "character range is reversed"));
            }
            Ok(CcItem::Range(lo, hi))
        } else {
            Ok(CcItem::Single(lo))
        }
    }
}

enum CcItem {
    Single(u8),
    Range(u8, u8),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::ast::{compute_functions, Kind};

    fn parse(pattern: &str) -> Node {
        let mut session = GeneratorSession::new();
        let mut ast = RegexParser::new(pattern).parse(&mut session).expect("pattern parses");
        compute_functions(&mut ast);
        ast
    }

    #[test]
    fn literal_concat() {
        let ast = parse("ab");
        assert!(!ast.nullable);
        match ast.kind {
            Kind::Concat(_, _) => {}
            _ => panic!("expected concat"),
        }
    }

    #[test]
    fn alternation_of_two_letters() {
        let ast = parse("a|b");
        assert!(!ast.nullable);
        assert_eq!(ast.firstpos.iter().count(), 2);
    }

    #[test]
    fn star_is_nullable() {
        let ast = parse("a*");
        assert!(ast.nullable);
    }

    #[test]
    fn plus_is_not_nullable_over_non_nullable_child() {
        let ast = parse("a+");
        assert!(!ast.nullable);
    }

    #[test]
    fn character_class_desugars_to_alternation() {
        let ast = parse("[a-c]");
        assert_eq!(ast.firstpos.iter().count(), 3);
    }

    #[test]
    fn dot_excludes_newline() {
        let ast = parse(".");
        // 32..=126 excluding '\n' (10, outside that range anyway) => 95 bytes
        assert_eq!(ast.firstpos.iter().count(), 95);
    }

    #[test]
    fn negated_class_is_reported_unsupported() {
        let mut session = GeneratorSession::new();
        let err = RegexParser::new("[^a]").parse(&mut session).unwrap_err();
        assert!(err.message.contains("not supported"));
    }

    #[test]
    fn empty_pattern_is_an_error() {
        let mut session = GeneratorSession::new();
        assert!(RegexParser::new("").parse(&mut session).is_err());
    }

    #[test]
    fn escape_takes_the_following_byte_literally() {
        let ast = parse(r"\*");
        match ast.kind {
            Kind::Leaf { symbol, .. } => assert_eq!(symbol, b'*'),
            _ => panic!("expected leaf"),
        }
    }

    #[test]
    fn unbalanced_parenthesis_is_reported() {
        let mut session = GeneratorSession::new();
        assert!(RegexParser::new("(a").parse(&mut session).is_err());
    }
}
