//! Tokenizer for calc source text.
//!
//! The lexer never fails: characters it does not understand become
//! [`TokenKind::Error`] tokens and the parser reports them in context.

mod cursor;

use calc_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

/// Token stream over one source file, ending with exactly one `Eof`.
/// Comments are yielded as [`TokenKind::Comment`] tokens.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            done: false,
        }
    }

    /// Tokenize all of `source`, including the final `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn scan(&mut self) -> Token {
        self.cursor.eat_while(char::is_whitespace);
        self.cursor.begin();

        let Some(c) = self.cursor.bump() else {
            return self.cursor.token(TokenKind::Eof);
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            // `-24` is a literal; `- 24` and `(- x)` use the operator.
            '-' if self.cursor.first().is_some_and(|c| c.is_ascii_digit()) => self.number(),
            '-' => TokenKind::Minus,
            '=' => self.either('=', TokenKind::EqEq, TokenKind::Eq),
            '!' => self.either('=', TokenKind::NotEq, TokenKind::Bang),
            '<' => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '&' => self.either('&', TokenKind::AmpAmp, TokenKind::Error),
            '|' => self.either('|', TokenKind::PipePipe, TokenKind::Error),
            ';' => {
                self.cursor.eat_while(|c| c != '\n');
                TokenKind::Comment
            }
            '0'..='9' => self.number(),
            c if is_ident_start(c) => {
                self.cursor.eat_while(is_ident_continue);
                keyword_from_str(self.cursor.lexeme()).unwrap_or(TokenKind::Ident)
            }
            _ => TokenKind::Error,
        };
        self.cursor.token(kind)
    }

    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.cursor.eat(second) {
            double
        } else {
            single
        }
    }

    fn number(&mut self) -> TokenKind {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        // `12abc` is one malformed token, not a number followed by a name.
        if self.cursor.first().is_some_and(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            return TokenKind::Error;
        }
        TokenKind::IntLiteral
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.scan();
        self.done = token.kind == TokenKind::Eof;
        Some(token)
    }
}

// Identifiers are pasted into C names, so they stay ASCII.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_declaration() {
        assert_eq!(
            kinds("(decl main int 42)"),
            vec![
                TokenKind::LParen,
                TokenKind::Decl,
                TokenKind::Ident,
                TokenKind::IntKw,
                TokenKind::IntLiteral,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_negative_literal_vs_minus() {
        assert_eq!(
            kinds("-24 (- 5 3)"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::LParen,
                TokenKind::Minus,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || = ! < >"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Eq,
                TokenKind::Bang,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_comment_runs_to_end_of_line() {
        let tokens = Lexer::tokenize("; note\n1");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].span.end, 6);
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn lex_errors_recover() {
        assert_eq!(
            kinds("& 1 @ 2abc"),
            vec![
                TokenKind::Error,
                TokenKind::IntLiteral,
                TokenKind::Error,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_non_ascii_is_not_an_identifier() {
        let tokens = Lexer::tokenize("abé x");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Error,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!((tokens[0].span.start, tokens[0].span.end), (0, 2));
        assert_eq!((tokens[1].span.start, tokens[1].span.end), (2, 4));
    }

    #[test]
    fn lex_spans_accurate() {
        let tokens = Lexer::tokenize("(var a int)");
        assert_eq!((tokens[1].span.start, tokens[1].span.end), (1, 4));
        assert_eq!((tokens[2].span.start, tokens[2].span.end), (5, 6));
        assert_eq!((tokens[3].span.start, tokens[3].span.end), (7, 10));
    }

    #[test]
    fn eof_is_emitted_once() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(lexer.next(), None);
    }
}
