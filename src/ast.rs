//! The expression tree produced by the parser and consumed by the
//! evaluator and macro expander.
//!
//! Every surface construct is either a literal or a shape of "sequence of
//! expressions"; the surface special forms (`def`, `fn`, `let`, …) are
//! recognised by the evaluator, not here. Expressions are immutable once
//! parsed and carry optional source positions for error messages.

use std::fmt;

use crate::lexer::Pos;

/// Literal payloads. Keywords keep their name without the leading colon.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Num(f64),
    Str(String),
    Bool(bool),
    Keyword(String),
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Lit),
    Symbol(String),
    List(Vec<Expr>),
    Vector(Vec<Expr>),
    /// Key/value expression pairs in source order
    Map(Vec<(Expr, Expr)>),
    Quote(Box<Expr>),
    Quasiquote(Box<Expr>),
    /// Valid only inside a quasiquote
    Unquote(Box<Expr>),
    /// Valid only inside a quasiquote; splices a sequence
    Splice(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Option<Pos>,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Expr {
            kind,
            pos: Some(pos),
        }
    }

    /// An expression with no source position (synthesized by the macro
    /// expander).
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr { kind, pos: None }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

/// Positions are metadata: two expressions are equal when their shapes are.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

fn write_seq(f: &mut fmt::Formatter, open: char, items: &[Expr], close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

/// Renders the expression back to source-like text. Used in diagnostics
/// and round-trip tests; string literals print re-escaped.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(Lit::Num(n)) => write!(f, "{n}"),
            ExprKind::Literal(Lit::Str(s)) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")
            }
            ExprKind::Literal(Lit::Bool(b)) => write!(f, "{b}"),
            ExprKind::Literal(Lit::Keyword(name)) => write!(f, ":{name}"),
            ExprKind::Literal(Lit::Nil) => write!(f, "nil"),
            ExprKind::Symbol(name) => write!(f, "{name}"),
            ExprKind::List(items) => write_seq(f, '(', items, ')'),
            ExprKind::Vector(items) => write_seq(f, '[', items, ']'),
            ExprKind::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
            ExprKind::Quote(inner) => write!(f, "'{inner}"),
            ExprKind::Quasiquote(inner) => write!(f, "`{inner}"),
            ExprKind::Unquote(inner) => write!(f, "~{inner}"),
            ExprKind::Splice(inner) => write!(f, "~@{inner}"),
        }
    }
}
