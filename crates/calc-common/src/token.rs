use serde::Serialize;

use crate::span::Span;

/// A token produced by the calc lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind and byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the calc language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Decl,
    Var,
    If,
    True,
    False,
    /// The `int` type name.
    IntKw,
    /// The `bool` type name.
    BoolKw,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `=`
    Eq,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,

    // ── Literals and names ─────────────────────────────────────────────
    /// Integer literal, e.g. `42` or `-24`.
    IntLiteral,
    Ident,
    /// `; ...` to end of line. Skipped by the parser.
    Comment,

    // ── Special ────────────────────────────────────────────────────────
    Eof,
    /// Invalid/unexpected input. Used for error recovery.
    Error,
}

impl TokenKind {
    /// Whether this token names an operator usable in head position.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::Bang
        )
    }

    /// Short description used in "expected X, found Y" parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Decl => "`decl`",
            TokenKind::Var => "`var`",
            TokenKind::If => "`if`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::IntKw => "`int`",
            TokenKind::BoolKw => "`bool`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Bang => "`!`",
            TokenKind::Eq => "`=`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::Ident => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid character",
        }
    }
}

/// Look up a keyword from its string representation.
///
/// The lexer calls this to distinguish keywords from identifiers after
/// scanning an identifier-shaped token.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "decl" => Some(TokenKind::Decl),
        "var" => Some(TokenKind::Var),
        "if" => Some(TokenKind::If),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "int" => Some(TokenKind::IntKw),
        "bool" => Some(TokenKind::BoolKw),
        _ => None,
    }
}
