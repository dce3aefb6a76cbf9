//! Runtime values produced by the evaluator.
//!
//! Values form a closed sum type. Collections are immutable and shared by
//! reference counting; closures keep their defining environment alive the
//! same way. Keywords store their name without the leading colon and are
//! equal to strings with the same textual content.

use std::fmt;
use std::rc::Rc;

use crate::ast::Expr;
use crate::builtins::Builtin;
use crate::evaluator::Env;

/// A user-defined function: parameter names, body expressions, and the
/// captured defining environment.
pub struct Closure {
    /// Present for `defn`-created functions, used in arity diagnostics
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Expr>,
    pub env: Rc<Env>,
}

/// An immutable insertion-ordered map. Keys are strings or keywords,
/// compared by textual content; inserting an existing key replaces the
/// value in place so the original position is kept.
#[derive(Clone, Default)]
pub struct MapData {
    entries: Vec<(Value, Value)>,
}

/// The key text of a string or keyword value.
pub(crate) fn key_text(value: &Value) -> Option<&str> {
    match value {
        Value::Str(s) | Value::Keyword(s) => Some(s),
        _ => None,
    }
}

impl MapData {
    pub fn new() -> Self {
        MapData::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut map = MapData::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Insert or replace. The key must be a string or keyword; the
    /// evaluator checks this before building a map.
    pub(crate) fn insert(&mut self, key: Value, value: Value) {
        let text = key_text(&key).map(str::to_owned);
        if let Some(text) = text
            && let Some(slot) = self
                .entries
                .iter_mut()
                .find(|(k, _)| key_text(k) == Some(text.as_str()))
        {
            slot.1 = value;
            return;
        }
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| key_text(k) == Some(key))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}

/// A runtime value. There is no "unknown" case: evaluation always yields
/// one of these.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    /// IEEE-754 double; the only number type in the language
    Num(f64),
    Str(String),
    /// Keyword name without the leading colon
    Keyword(String),
    List(Rc<Vec<Value>>),
    Vector(Rc<Vec<Value>>),
    Map(Rc<MapData>),
    Closure(Rc<Closure>),
    Primitive(&'static Builtin),
}

pub(crate) fn list(items: Vec<Value>) -> Value {
    Value::List(Rc::new(items))
}

pub(crate) fn vector(items: Vec<Value>) -> Value {
    Value::Vector(Rc::new(items))
}

impl Value {
    /// Falsy values are exactly `false` and `nil`; everything else,
    /// including 0, "" and empty collections, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The name reported by `type-of`. Keywords report as strings; the
    /// language treats the two as textually interchangeable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) | Value::Keyword(_) => "string",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Closure(_) | Value::Primitive(_) => "fn",
        }
    }

    /// Top-level formatting: bare strings print their raw text; inside a
    /// structural print they are quoted (see the `Display` impl).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// From conversions for ergonomic value construction in host code and tests.

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        list(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        list(items.into_iter().map(Into::into).collect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            // Keywords and strings are equal by textual content
            (Value::Str(a) | Value::Keyword(a), Value::Str(b) | Value::Keyword(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            // Map equality is order-insensitive
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        key_text(k).and_then(|text| b.get(text)) == Some(v)
                    })
            }
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => a.name == b.name,
            _ => false,
        }
    }
}

fn write_items(f: &mut fmt::Formatter, open: char, items: &[Value], close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

/// Structural formatting: strings are quoted with escapes, collections in
/// insertion order, callables as opaque handles. Numbers print in
/// canonical decimal with no trailing `.0` when integral.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => {
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
            Value::Keyword(name) => write!(f, ":{name}"),
            Value::List(items) => write_items(f, '(', items, ')'),
            Value::Vector(items) => write_items(f, '[', items, ']'),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
            Value::Closure(_) => write!(f, "#<fn>"),
            Value::Primitive(b) => write!(f, "#<primitive:{}>", b.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}
