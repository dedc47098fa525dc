//! Parser for search expressions typed at the prompt.
//!
//! Users write filters the way the OLD documentation shows them, as Python list
//! literals with single-quoted strings and regex patterns full of backslashes.
//! JSON is accepted too, since it is nearly a subset.

use super::expr::QueryExpression;
use crate::error::{CrossOldError, Result};
use serde_json::{Number, Value};

/// Parse a Python- or JSON-style list literal into a query expression.
pub fn parse_query_literal(source: &str) -> Result<QueryExpression> {
    let mut parser = Parser::new(source);
    parser.skip_trivia();
    // Tuples and parenthesised values are not lists, even when they hold one.
    if !matches!(parser.peek(), Some('[') | None) {
        return Err(parser.error("a search expression must be a list"));
    }
    let value = parser.parse_value()?;
    parser.skip_trivia();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{c}' after the expression")));
    }
    QueryExpression::from_value(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl AsRef<str>) -> CrossOldError {
        CrossOldError::malformed_input(format!("{} (at character {})", message.as_ref(), self.pos))
    }

    /// Skip whitespace and `#` comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.parse_sequence('[', ']'),
            Some('(') => self.parse_sequence('(', ')'),
            Some('\'') | Some('"') => self.parse_string(false).map(Value::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Result<Value> {
        debug_assert_eq!(self.peek(), Some(open));
        self.pos += 1;
        let mut items = Vec::new();
        let mut commas = 0;
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Self::finish_sequence(open, items, commas));
            }
            items.push(self.parse_value()?);
            self.skip_trivia();
            match self.bump() {
                Some(',') => commas += 1,
                Some(c) if c == close => return Ok(Self::finish_sequence(open, items, commas)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or '{close}', found '{c}'")));
                }
                None => return Err(self.error(format!("missing '{close}'"))),
            }
        }
    }

    /// `(x)` is just `x`; only `(x,)` is a one-element tuple.
    fn finish_sequence(open: char, mut items: Vec<Value>, commas: usize) -> Value {
        if open == '(' && commas == 0 && items.len() == 1 {
            if let Some(item) = items.pop() {
                return item;
            }
        }
        Value::Array(items)
    }

    /// Identifiers: constants, or a `u`/`r` prefix in front of a string.
    fn parse_word(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();

        if matches!(self.peek(), Some('\'') | Some('"')) {
            let prefix = word.to_ascii_lowercase();
            return match prefix.as_str() {
                "u" | "b" => self.parse_string(false).map(Value::String),
                "r" | "ur" | "br" | "rb" => self.parse_string(true).map(Value::String),
                _ => {
                    self.pos = start;
                    Err(self.error(format!("unknown string prefix '{word}'")))
                }
            };
        }

        match word.as_str() {
            "None" | "null" => Ok(Value::Null),
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error(format!("unknown name '{word}'")))
            }
        }
    }

    fn parse_string(&mut self, raw: bool) -> Result<String> {
        let start = self.pos;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a string")),
        };
        let mut out = String::new();
        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => {
                    self.pos = start;
                    return Err(self.error("unterminated string"));
                }
            };
            if c == quote {
                return Ok(out);
            }
            if c == '\n' {
                self.pos = start;
                return Err(self.error("unterminated string"));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let Some(next) = self.bump() else {
                self.pos = start;
                return Err(self.error("unterminated string"));
            };
            if raw {
                // Raw strings keep the backslash, even before a quote.
                out.push('\\');
                out.push(next);
                continue;
            }
            match next {
                '\n' => {}
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{07}'),
                'b' => out.push('\u{08}'),
                'f' => out.push('\u{0C}'),
                'v' => out.push('\u{0B}'),
                '0' => out.push('\0'),
                'x' => out.push(self.parse_hex_escape(2)?),
                'u' => out.push(self.parse_hex_escape(4)?),
                'U' => out.push(self.parse_hex_escape(8)?),
                // Unknown escapes such as `\d` keep their backslash.
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("invalid escape sequence '{hex}'")))?;
        let c = char::from_u32(code)
            .ok_or_else(|| self.error(format!("invalid code point '{hex}'")))?;
        self.pos = end;
        Ok(c)
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' | 'e' | 'E' => is_float = true,
                '+' | '-' if matches!(self.chars.get(self.pos - 1), Some('e' | 'E')) => {}
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        // Python 2 long suffix
        if matches!(self.peek(), Some('L' | 'l')) {
            self.pos += 1;
        }

        let number = if is_float {
            text.parse::<f64>().ok().and_then(Number::from_f64)
        } else {
            text.parse::<i64>().ok().map(Number::from)
        };
        number.map(Value::Number).ok_or_else(|| {
            self.pos = start;
            self.error(format!("invalid number '{text}'"))
        })
    }
}
