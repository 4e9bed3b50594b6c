use std::str::Chars;

use calc_common::token::{Token, TokenKind};

/// Walks the source one `char` at a time and remembers where the token
/// being scanned began. Offsets are bytes into the source.
pub(crate) struct Cursor<'src> {
    source: &'src str,
    chars: Chars<'src>,
    start: u32,
    offset: u32,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            start: 0,
            offset: 0,
        }
    }

    /// Mark the current offset as the start of the next token.
    pub(crate) fn begin(&mut self) {
        self.start = self.offset;
    }

    pub(crate) fn first(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub(crate) fn second(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume `expected` if it is the current character.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.first() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.first().is_some_and(&mut predicate) {
            self.bump();
        }
    }

    /// Source text of the token scanned so far.
    pub(crate) fn lexeme(&self) -> &'src str {
        &self.source[self.start as usize..self.offset as usize]
    }

    /// Finish the current token.
    pub(crate) fn token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.start, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookahead_does_not_consume() {
        let cursor = Cursor::new("decl");
        assert_eq!(cursor.first(), Some('d'));
        assert_eq!(cursor.second(), Some('e'));
        assert_eq!(cursor.lexeme(), "");
    }

    #[test]
    fn offsets_count_bytes() {
        let mut cursor = Cursor::new("é1");
        cursor.begin();
        assert_eq!(cursor.bump(), Some('é'));
        assert_eq!(cursor.token(TokenKind::Error).span.end, 2);
        assert_eq!(cursor.bump(), Some('1'));
        assert_eq!(cursor.bump(), None);
    }

    #[test]
    fn lexeme_spans_from_begin() {
        let mut cursor = Cursor::new("  1234 rest");
        cursor.eat_while(char::is_whitespace);
        cursor.begin();
        cursor.eat_while(|c| c.is_ascii_digit());
        assert_eq!(cursor.lexeme(), "1234");
        assert!(!cursor.eat('x'));
        assert!(cursor.eat(' '));
    }
}
