// ============================================
// Field Literal Parser
// ============================================
//
// Catalog and user exports store nested values as textual literals inside a
// single CSV cell:
//
//   genre        ['Fantasy', 'Classic']
//   preferences  ["Children's Books", 'Fantasy']
//   book_history [{'book': 'Emma', 'author': 'Jane Austen', 'genre': 'Classic', 'rating': 4.5}]
//
// This module turns such a cell into a `Literal` tree once, so consumers work
// with structured values instead of re-parsing text.

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Deepest list/dict nesting accepted in one cell.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a string key in a `Dict`.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Dict(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Parse a complete literal; surrounding whitespace is allowed.
pub fn parse(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        Some(&(offset, _)) => Err(LiteralError::TrailingInput(offset)),
        None => Ok(value),
    }
}

/// Parse a list of strings, e.g. a genre or preference cell.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, LiteralError> {
    match parse(input)? {
        Literal::List(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Literal::Str(s) => Some(s),
                _ => None,
            })
            .collect()),
        Literal::Str(s) => Ok(vec![s]),
        _ => Err(LiteralError::UnexpectedChar {
            ch: input.trim_start().chars().next().unwrap_or(' '),
            offset: 0,
        }),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Result<(usize, char), LiteralError> {
        self.skip_whitespace();
        self.chars.peek().copied().ok_or(LiteralError::UnexpectedEnd)
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        let (offset, ch) = self.peek()?;
        if ch != expected {
            return Err(LiteralError::UnexpectedChar { ch, offset });
        }
        self.chars.next();
        Ok(())
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        let (offset, ch) = self.peek()?;
        match ch {
            '[' => self.nested(|p| p.sequence('[', ']').map(Literal::List)),
            '(' => self.nested(|p| p.sequence('(', ')').map(Literal::List)),
            '{' => self.nested(Self::dict),
            '\'' | '"' => self.string().map(Literal::Str),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => Err(LiteralError::UnexpectedChar { ch, offset }),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Literal, LiteralError>
    where
        F: FnOnce(&mut Self) -> Result<Literal, LiteralError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(LiteralError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn sequence(&mut self, open: char, close: char) -> Result<Vec<Literal>, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            let (_, ch) = self.peek()?;
            if ch == close {
                self.chars.next();
                return Ok(items);
            }
            items.push(self.value()?);

            let (offset, ch) = self.peek()?;
            match ch {
                ',' => {
                    self.chars.next();
                }
                c if c == close => {}
                _ => return Err(LiteralError::UnexpectedChar { ch, offset }),
            }
        }
    }

    fn dict(&mut self) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            let (_, ch) = self.peek()?;
            if ch == '}' {
                self.chars.next();
                return Ok(Literal::Dict(entries));
            }
            let key = self.value()?;
            self.expect(':')?;
            let value = self.value()?;
            entries.push((key, value));

            let (offset, ch) = self.peek()?;
            match ch {
                ',' => {
                    self.chars.next();
                }
                '}' => {}
                _ => return Err(LiteralError::UnexpectedChar { ch, offset }),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let (_, quote) = self.chars.next().ok_or(LiteralError::UnexpectedEnd)?;
        let mut out = String::new();
        loop {
            let (_, ch) = self.chars.next().ok_or(LiteralError::UnexpectedEnd)?;
            match ch {
                c if c == quote => return Ok(out),
                '\\' => {
                    let (offset, escaped) = self.chars.next().ok_or(LiteralError::UnexpectedEnd)?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        'x' => out.push(self.hex_escape(2, offset)?),
                        'u' => out.push(self.hex_escape(4, offset)?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let (pos, ch) = self.chars.next().ok_or(LiteralError::UnexpectedEnd)?;
            let digit = ch
                .to_digit(16)
                .ok_or(LiteralError::UnexpectedChar { ch, offset: pos })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::UnexpectedChar { ch: 'x', offset })
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | 'e' | 'E' | '_') {
                if ch != '_' {
                    text.push(ch);
                }
                self.chars.next();
            } else {
                break;
            }
        }

        let is_float = text.contains(['.', 'e', 'E']);
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Literal::Int(value));
            }
        }
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| LiteralError::InvalidNumber(text))
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let (offset, first) = self.peek()?;
        let mut word = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => Err(LiteralError::UnexpectedChar { ch: first, offset }),
        }
    }
}

/// Render a string list back into the literal form the exports use.
pub fn format_string_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let quoted: Vec<String> = items.into_iter().map(quote).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(s: &str) -> String {
    // Same quoting choice as the exporter: single quotes unless the text has one.
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}
