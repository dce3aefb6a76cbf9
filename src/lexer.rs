//! Tokenizer for lilt source text.
//!
//! Converts a source string into a flat token stream with 1-based
//! line/column positions, terminated by an [`TokenKind::Eof`] token. The
//! lexer never fails: malformed tokens (unterminated strings, broken number
//! literals) become [`TokenKind::Error`] tokens that the parser reports as
//! fatal, and stray punctuation outside the token set is skipped.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize, value},
    sequence::preceded,
};

/// Non-alphanumeric characters allowed in symbol names. Most are operator
/// or predicate spellings; `#` only as a trailing gensym marker in macro
/// templates, `$` for host-side identifiers.
pub(crate) const SYMBOL_SPECIAL_CHARS: &str = "+-*/%<>=!?_$#";

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

/// Token classification. Literal payloads are already decoded (escape
/// sequences resolved, numbers parsed to doubles).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Number(f64),
    Str(String),
    Keyword(String),
    Symbol(String),
    True,
    False,
    Nil,
    /// `'`
    Quote,
    /// `` ` ``
    Quasiquote,
    /// `~`
    Unquote,
    /// `~@` (also the compatibility aliases `@` and `^`)
    Splice,
    /// A malformed token; the payload is the diagnostic message
    Error(String),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Pos,
}

pub(crate) fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || SYMBOL_SPECIAL_CHARS.contains(c)
}

/// Check if a candidate identifier is a valid symbol name.
/// Valid: non-empty, no leading digit or gensym hash, no "-digit" prefix
/// (that spelling belongs to number literals).
pub(crate) fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(first) => {
            if first.is_ascii_digit() || first == '#' {
                return false;
            }
            if first == '-'
                && let Some(second) = chars.next()
                && second.is_ascii_digit()
            {
                return false;
            }
            name.chars().all(is_symbol_char)
        }
    }
}

/// Byte-offset to line/column translation table.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.char_indices().filter_map(|(i, c)| (c == '\n').then_some(i + 1)));
        LineIndex { starts }
    }

    fn pos(&self, offset: usize) -> Pos {
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1] + 1;
        Pos {
            line: line as u32,
            column: column as u32,
        }
    }
}

/// Skip whitespace and `;;` line comments.
fn skip_trivia(source: &str) -> &str {
    let mut rest = source;
    loop {
        let trimmed = rest.trim_start();
        if let Some(comment) = trimmed.strip_prefix(";;") {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else {
            return trimmed;
        }
    }
}

fn lex_delimiter(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
        value(TokenKind::LBracket, char('[')),
        value(TokenKind::RBracket, char(']')),
        value(TokenKind::LBrace, char('{')),
        value(TokenKind::RBrace, char('}')),
    ))
    .parse(input)
}

fn lex_reader_macro(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Splice, tag("~@")),
        value(TokenKind::Unquote, char('~')),
        value(TokenKind::Quote, char('\'')),
        value(TokenKind::Quasiquote, char('`')),
        value(TokenKind::Splice, char('@')),
        value(TokenKind::Splice, char('^')),
    ))
    .parse(input)
}

/// Lex a double-quoted string literal. Escapes `\n`, `\t` and `\r` decode
/// to their control characters; any other escaped character is itself.
/// Reaching end of input produces an error token instead of failing.
fn lex_string(input: &str) -> IResult<&str, TokenKind> {
    let (mut remaining, _) = char('"').parse(input)?;
    let mut decoded = String::new();
    loop {
        let mut iter = remaining.chars();
        match iter.next() {
            Some('"') => return Ok((iter.as_str(), TokenKind::Str(decoded))),
            Some('\\') => {
                match iter.next() {
                    Some('n') => decoded.push('\n'),
                    Some('t') => decoded.push('\t'),
                    Some('r') => decoded.push('\r'),
                    Some(other) => decoded.push(other),
                    None => {
                        return Ok(("", TokenKind::Error("unterminated string literal".into())));
                    }
                }
                remaining = iter.as_str();
            }
            Some(c) => {
                decoded.push(c);
                remaining = iter.as_str();
            }
            None => return Ok(("", TokenKind::Error("unterminated string literal".into()))),
        }
    }
}

/// Lex a number: optional `-`, then a hexadecimal (`0x…`), octal (`0o…`)
/// or decimal body with optional fraction and exponent. All numbers parse
/// to double-precision floats. A number immediately followed by symbol
/// characters (`123abc`) is a single malformed token.
fn lex_number(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = recognize((
        opt(char('-')),
        alt((
            recognize(preceded(
                tag("0x"),
                take_while1(|c: char| c.is_ascii_hexdigit()),
            )),
            recognize(preceded(tag("0o"), take_while1(|c: char| ('0'..='7').contains(&c)))),
            recognize((
                digit1,
                opt(preceded(char('.'), digit1)),
                opt((one_of("eE"), opt(one_of("+-")), digit1)),
            )),
        )),
    ))
    .parse(input)?;

    if rest.chars().next().is_some_and(is_symbol_char) {
        let (rest, _) = take_while(is_symbol_char).parse(rest)?;
        return Ok((
            rest,
            TokenKind::Error(format!("malformed number literal starting with '{text}'")),
        ));
    }

    match parse_number_text(text) {
        Some(n) => Ok((rest, TokenKind::Number(n))),
        None => Ok((rest, TokenKind::Error(format!("malformed number literal '{text}'")))),
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(b) => (true, b),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = body.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()? as f64
    } else if let Some(oct) = body.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()? as f64
    } else {
        body.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn lex_keyword(input: &str) -> IResult<&str, TokenKind> {
    let (rest, name) = preceded(char(':'), take_while1(is_symbol_char)).parse(input)?;
    if is_valid_symbol(name) {
        Ok((rest, TokenKind::Keyword(name.into())))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )))
    }
}

fn lex_symbol(input: &str) -> IResult<&str, TokenKind> {
    let (rest, name) = take_while1(is_symbol_char).parse(input)?;
    if !is_valid_symbol(name) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )));
    }
    let kind = match name {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        _ => TokenKind::Symbol(name.into()),
    };
    Ok((rest, kind))
}

fn lex_token(input: &str) -> IResult<&str, TokenKind> {
    alt((
        lex_delimiter,
        lex_reader_macro,
        lex_string,
        lex_number,
        lex_keyword,
        lex_symbol,
    ))
    .parse(input)
}

/// Tokenize a complete source string. Always returns at least the final
/// `Eof` token; lexical problems surface as `Error` tokens, never panics
/// or `Err` results.
pub fn tokenize(source: &str) -> Vec<Token> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        rest = skip_trivia(rest);
        let offset = source.len() - rest.len();
        let pos = index.pos(offset);
        let Some(first) = rest.chars().next() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                pos,
            });
            return tokens;
        };
        match lex_token(rest) {
            Ok((next, kind)) => {
                let lexeme = source[offset..source.len() - next.len()].to_owned();
                tokens.push(Token { kind, lexeme, pos });
                rest = next;
            }
            Err(_) => {
                if !first.is_ascii_punctuation() {
                    tokens.push(Token {
                        kind: TokenKind::Error(format!("unexpected character '{first}'")),
                        lexeme: first.to_string(),
                        pos,
                    });
                }
                // stray punctuation outside the token set is skipped
                rest = &rest[first.len_utf8()..];
            }
        }
    }
}
