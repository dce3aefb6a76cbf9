//! Recursive-descent parser over the token stream.
//!
//! The grammar is tiny and uniform:
//!
//! ```text
//! program := expr*
//! expr    := atom | list | vector | map | quoted
//! list    := '(' expr* ')'
//! vector  := '[' expr* ']'
//! map     := '{' (expr expr)* '}'
//! quoted  := ("'" | '`' | '~' | '~@') expr
//! atom    := number | string | keyword | true | false | nil | symbol
//! ```
//!
//! The parser collects every error it meets and resynchronises past the
//! offending token, so a single bad form does not blank out the rest of the
//! program. Callers that want fail-fast behaviour (the host runner does)
//! take the first error from the returned list.

use crate::ast::{Expr, ExprKind, Lit};
use crate::lexer::{Pos, Token, TokenKind, tokenize};
use crate::{Error, ParseError, ParseErrorKind};

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Parser {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &'t Token {
        // The token stream is always Eof-terminated; clamp for safety.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> &'t Token {
        let token = self.peek();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&mut self, kind: ParseErrorKind, message: impl Into<String>, pos: Pos) {
        self.errors
            .push(ParseError::new(kind, message, pos.line, pos.column));
    }

    /// Parse one expression. Returns None after recording an error; every
    /// path except end-of-input consumes at least one token.
    fn parse_expr(&mut self) -> Option<Expr> {
        let token = self.peek();
        let pos = token.pos;
        match &token.kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Num(n)), pos))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Str(s)), pos))
            }
            TokenKind::Keyword(name) => {
                let name = name.clone();
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Keyword(name)), pos))
            }
            TokenKind::True => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Bool(true)), pos))
            }
            TokenKind::False => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Bool(false)), pos))
            }
            TokenKind::Nil => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(Lit::Nil), pos))
            }
            TokenKind::Symbol(name) => {
                let name = name.clone();
                self.bump();
                Some(Expr::new(ExprKind::Symbol(name), pos))
            }
            TokenKind::Quote => self.parse_prefixed(ExprKind::Quote, "'"),
            TokenKind::Quasiquote => self.parse_prefixed(ExprKind::Quasiquote, "`"),
            TokenKind::Unquote => self.parse_prefixed(ExprKind::Unquote, "~"),
            TokenKind::Splice => self.parse_prefixed(ExprKind::Splice, "~@"),
            TokenKind::LParen => self
                .parse_seq(TokenKind::RParen, "(", ")")
                .map(|items| Expr::new(ExprKind::List(items), pos)),
            TokenKind::LBracket => self
                .parse_seq(TokenKind::RBracket, "[", "]")
                .map(|items| Expr::new(ExprKind::Vector(items), pos)),
            TokenKind::LBrace => self.parse_map(),
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                let lexeme = token.lexeme.clone();
                self.bump();
                self.error(
                    ParseErrorKind::MismatchedDelimiter,
                    format!("unexpected closing delimiter '{lexeme}'"),
                    pos,
                );
                None
            }
            TokenKind::Error(message) => {
                let message = message.clone();
                self.bump();
                self.error(ParseErrorKind::InvalidToken, message, pos);
                None
            }
            TokenKind::Eof => {
                self.error(
                    ParseErrorKind::UnexpectedEof,
                    "unexpected end of input",
                    pos,
                );
                None
            }
        }
    }

    fn parse_prefixed(
        &mut self,
        make: fn(Box<Expr>) -> ExprKind,
        marker: &str,
    ) -> Option<Expr> {
        let pos = self.bump().pos;
        if self.peek().kind == TokenKind::Eof {
            self.error(
                ParseErrorKind::UnexpectedEof,
                format!("expected an expression after '{marker}'"),
                pos,
            );
            return None;
        }
        self.parse_expr()
            .map(|inner| Expr::new(make(Box::new(inner)), pos))
    }

    fn parse_seq(
        &mut self,
        close: TokenKind,
        open_lexeme: &str,
        close_lexeme: &str,
    ) -> Option<Vec<Expr>> {
        let open_pos = self.bump().pos;
        let mut items = Vec::new();
        loop {
            let token = self.peek();
            if token.kind == close {
                self.bump();
                return Some(items);
            }
            match &token.kind {
                TokenKind::Eof => {
                    self.error(
                        ParseErrorKind::UnexpectedEof,
                        format!("unterminated collection: '{open_lexeme}' is never closed"),
                        open_pos,
                    );
                    return None;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    let found = token.lexeme.clone();
                    let found_pos = token.pos;
                    self.bump();
                    self.error(
                        ParseErrorKind::MismatchedDelimiter,
                        format!("expected '{close_lexeme}', got '{found}'"),
                        found_pos,
                    );
                    return None;
                }
                _ => {
                    if let Some(expr) = self.parse_expr() {
                        items.push(expr);
                    }
                    // On None the error is recorded and at least one token
                    // was consumed; keep collecting the rest of the form.
                }
            }
        }
    }

    fn parse_map(&mut self) -> Option<Expr> {
        let open_pos = self.peek().pos;
        let items = self.parse_seq(TokenKind::RBrace, "{", "}")?;
        if items.len() % 2 != 0 {
            self.error(
                ParseErrorKind::UnexpectedToken,
                "map literal requires an even number of forms",
                open_pos,
            );
            return None;
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Some(Expr::new(ExprKind::Map(pairs), open_pos))
    }

    fn parse_program(mut self) -> (Vec<Expr>, Vec<ParseError>) {
        let mut exprs = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            if let Some(expr) = self.parse_expr() {
                exprs.push(expr);
            }
        }
        (exprs, self.errors)
    }
}

/// Parse a token stream into a program, collecting all errors.
pub fn parse_program(tokens: &[Token]) -> (Vec<Expr>, Vec<ParseError>) {
    Parser::new(tokens).parse_program()
}

/// Lex and parse a source string, failing fast on the first problem.
/// Lexer-originated errors surface as [`Error::LexError`].
pub fn parse_source(source: &str) -> Result<Vec<Expr>, Error> {
    let tokens = tokenize(source);
    let (exprs, errors) = parse_program(&tokens);
    match errors.into_iter().next() {
        None => Ok(exprs),
        Some(first) if first.kind == ParseErrorKind::InvalidToken => Err(Error::LexError(first)),
        Some(first) => Err(Error::ParseError(first)),
    }
}
