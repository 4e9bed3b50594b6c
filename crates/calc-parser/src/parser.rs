//! Recursive descent parser for calc S-expressions.
//!
//! The parser works declaration by declaration. A malformed declaration
//! records one [`ParseError`] and the parser skips to the end of that
//! top-level form, so every broken declaration in a file is reported in a
//! single run.

use calc_common::span::{FileId, Pos, Span};
use calc_common::token::{Token, TokenKind};
use calc_lexer::Lexer;

use crate::ast::{BinaryOp, Decl, Expr, File, Ident, Param, TypeExpr, TypeName, UnaryOp};
use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'src> {
    /// Significant tokens (comments removed), always ending in `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    source: &'src str,
    file: FileId,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str, file: FileId) -> Self {
        let tokens = Lexer::new(source)
            .filter(|tok| tok.kind != TokenKind::Comment)
            .collect();
        Self {
            tokens,
            pos: 0,
            source,
            file,
            errors: Vec::new(),
        }
    }

    // ── Token access ───────────────────────────────────────────────────

    fn current(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Eof, |tok| tok.kind)
    }

    fn current_span(&self) -> Span {
        match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(tok) => tok.span,
            None => Span::new(0, 0),
        }
    }

    /// Consume the current token. `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let tok = match self.tokens.get(self.pos) {
            Some(tok) => tok.clone(),
            None => Token::new(TokenKind::Eof, 0, 0),
        };
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn text(&self, span: Span) -> &'src str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn at(&self, span: Span) -> Pos {
        Pos::new(self.file, span)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            format!("expected {expected}, found {}", self.current().describe()),
            self.current_span(),
        )
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.current() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Consume the `)` matching the `(` at `open`.
    fn expect_close(&mut self, open: Span) -> PResult<Token> {
        if self.current() == TokenKind::RParen {
            return Ok(self.advance());
        }
        Err(ParseError::unclosed(
            self.current().describe(),
            self.current_span(),
            open,
        ))
    }

    // ── Top level ──────────────────────────────────────────────────────

    pub(crate) fn parse_file(mut self) -> (File, Vec<ParseError>) {
        let mut decls = Vec::new();
        loop {
            match self.current() {
                TokenKind::Eof => break,
                TokenKind::LParen => {
                    let start = self.pos;
                    match self.parse_decl() {
                        Ok(decl) => decls.push(decl),
                        Err(err) => {
                            self.errors.push(err);
                            self.recover(start);
                        }
                    }
                }
                _ => {
                    let err = self.unexpected("`(` to start a declaration");
                    self.errors.push(err);
                    self.advance();
                    while !matches!(self.current(), TokenKind::LParen | TokenKind::Eof) {
                        self.advance();
                    }
                }
            }
        }
        (File { decls }, self.errors)
    }

    /// Skip the balanced form starting at token index `start`.
    fn recover(&mut self, start: usize) {
        self.pos = start;
        let mut depth = 0u32;
        loop {
            match self.current() {
                TokenKind::Eof => break,
                TokenKind::LParen => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_decl(&mut self) -> PResult<Decl> {
        let open = self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::Decl)?;
        let name = self.parse_ident()?;
        let params = if self.current() == TokenKind::LParen {
            self.parse_params()?
        } else {
            Vec::new()
        };
        let ret = self.parse_type()?;
        let body = self.parse_expr()?;
        let close = self.expect_close(open.span)?;
        Ok(Decl {
            name,
            params,
            ret,
            body,
            pos: self.at(open.span.merge(close.span)),
        })
    }

    /// `(a b int c bool)`: names accumulate until a type applies to all of them.
    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.advance(); // consume '('
        let mut params = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        loop {
            match self.current() {
                TokenKind::Ident => pending.push(self.parse_ident()?),
                TokenKind::IntKw | TokenKind::BoolKw => {
                    let ty = self.parse_type()?;
                    if pending.is_empty() {
                        return Err(ParseError::new(
                            format!("type `{}` has no parameter names before it", ty.name),
                            ty.pos.span,
                        ));
                    }
                    params.extend(pending.drain(..).map(|name| Param { name, ty }));
                }
                TokenKind::RParen => {
                    self.advance();
                    if let Some(first) = pending.first() {
                        return Err(ParseError::new(
                            format!("parameter `{}` is missing a type", first.name),
                            first.pos.span,
                        ));
                    }
                    return Ok(params);
                }
                _ => return Err(self.unexpected("parameter name or type")),
            }
        }
    }

    fn parse_ident(&mut self) -> PResult<Ident> {
        let tok = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: self.text(tok.span).to_string(),
            pos: self.at(tok.span),
        })
    }

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let name = match self.current() {
            TokenKind::IntKw => TypeName::Int,
            TokenKind::BoolKw => TypeName::Bool,
            _ => return Err(self.unexpected("type `int` or `bool`")),
        };
        let tok = self.advance();
        Ok(TypeExpr {
            name,
            pos: self.at(tok.span),
        })
    }

    fn at_type(&self) -> bool {
        matches!(self.current(), TokenKind::IntKw | TokenKind::BoolKw)
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> PResult<Expr> {
        match self.current() {
            TokenKind::IntLiteral => {
                let tok = self.advance();
                let text = self.text(tok.span);
                let value = text.parse::<i32>().map_err(|_| {
                    ParseError::new(format!("integer literal `{text}` is out of range"), tok.span)
                })?;
                Ok(Expr::Int {
                    value,
                    pos: self.at(tok.span),
                })
            }
            TokenKind::True | TokenKind::False => {
                let tok = self.advance();
                Ok(Expr::Bool {
                    value: tok.kind == TokenKind::True,
                    pos: self.at(tok.span),
                })
            }
            TokenKind::Ident => Ok(Expr::Name(self.parse_ident()?)),
            TokenKind::LParen => self.parse_list(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_list(&mut self) -> PResult<Expr> {
        let open = self.advance();
        match self.current() {
            kind if kind.is_operator() => self.parse_operator(open.span),
            TokenKind::If => self.parse_if(open.span),
            TokenKind::Var => self.parse_var(open.span),
            TokenKind::Eq => self.parse_assign(open.span),
            TokenKind::Ident => self.parse_call(open.span),
            TokenKind::LParen => self.parse_block(open.span),
            TokenKind::RParen => Err(ParseError::new(
                "empty expression `()`",
                open.span.merge(self.current_span()),
            )),
            TokenKind::Decl => Err(ParseError::new(
                "`decl` is only allowed at top level",
                self.current_span(),
            )),
            _ => Err(self.unexpected("operator, keyword or name after `(`")),
        }
    }

    /// Operands up to (not including) the closing `)`.
    fn parse_operands(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        while !matches!(self.current(), TokenKind::RParen | TokenKind::Eof) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_operator(&mut self, open: Span) -> PResult<Expr> {
        let op_tok = self.advance();
        let operands = self.parse_operands()?;
        let close = self.expect_close(open)?;
        let pos = self.at(open.merge(close.span));

        if operands.len() == 1 {
            let unary = match op_tok.kind {
                TokenKind::Minus => Some(UnaryOp::Neg),
                TokenKind::Bang => Some(UnaryOp::Not),
                _ => None,
            };
            if let Some(op) = unary {
                let operand = operands.into_iter().next().map(Box::new);
                if let Some(operand) = operand {
                    return Ok(Expr::Unary { op, operand, pos });
                }
                return Err(ParseError::new("missing operand", op_tok.span));
            }
        }

        let Some(op) = binary_op(op_tok.kind) else {
            return Err(ParseError::new(
                format!("{} takes exactly one operand", op_tok.kind.describe()),
                op_tok.span,
            ));
        };
        if operands.len() < 2 {
            return Err(ParseError::new(
                format!("`{op}` needs at least two operands"),
                op_tok.span,
            ));
        }

        // (+ a b c) is ((a + b) + c)
        let mut iter = operands.into_iter();
        let mut acc = match iter.next() {
            Some(first) => first,
            None => return Err(ParseError::new("missing operand", op_tok.span)),
        };
        for rhs in iter {
            acc = Expr::Binary {
                op,
                lhs: Box::new(acc),
                rhs: Box::new(rhs),
                pos,
            };
        }
        Ok(acc)
    }

    fn parse_if(&mut self, open: Span) -> PResult<Expr> {
        self.advance(); // consume 'if'
        let cond = self.parse_expr()?;
        let ty = if self.at_type() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let then_branch = self.parse_expr()?;
        let else_branch = if self.current() == TokenKind::RParen {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let close = self.expect_close(open)?;
        Ok(Expr::If {
            cond: Box::new(cond),
            ty,
            then_branch: Box::new(then_branch),
            else_branch,
            pos: self.at(open.merge(close.span)),
        })
    }

    fn parse_var(&mut self, open: Span) -> PResult<Expr> {
        self.advance(); // consume 'var'
        let (name, init) = match self.current() {
            TokenKind::Ident => (self.parse_ident()?, None),
            TokenKind::LParen => {
                let inner = self.advance();
                self.expect(TokenKind::Eq)?;
                let name = self.parse_ident()?;
                let init = self.parse_expr()?;
                self.expect_close(inner.span)?;
                (name, Some(Box::new(init)))
            }
            _ => return Err(self.unexpected("variable name or `(= name value)`")),
        };
        let ty = if self.at_type() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let close = self.expect_close(open)?;
        if ty.is_none() && init.is_none() {
            return Err(ParseError::new(
                format!("variable `{}` needs a type or an initializer", name.name),
                name.pos.span,
            ));
        }
        Ok(Expr::Var {
            name,
            ty,
            init,
            pos: self.at(open.merge(close.span)),
        })
    }

    fn parse_assign(&mut self, open: Span) -> PResult<Expr> {
        self.advance(); // consume '='
        let name = self.parse_ident()?;
        let value = self.parse_expr()?;
        let close = self.expect_close(open)?;
        Ok(Expr::Assign {
            name,
            value: Box::new(value),
            pos: self.at(open.merge(close.span)),
        })
    }

    fn parse_call(&mut self, open: Span) -> PResult<Expr> {
        let name = self.parse_ident()?;
        let args = self.parse_operands()?;
        let close = self.expect_close(open)?;
        Ok(Expr::Call {
            name,
            args,
            pos: self.at(open.merge(close.span)),
        })
    }

    fn parse_block(&mut self, open: Span) -> PResult<Expr> {
        let exprs = self.parse_operands()?;
        let close = self.expect_close(open)?;
        Ok(Expr::Block {
            exprs,
            pos: self.at(open.merge(close.span)),
        })
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}
