//! Recursive-descent parser for the text format
//!
//! ```text
//! value  := object | array | string | number | bool | null
//! object := '{' [ string ':' value { ',' string ':' value } ] '}'
//! array  := '[' [ value { ',' value } ] ']'
//! string := '"' chars '"' | '\'' chars '\''
//! number := [+-.0-9] { [0-9+-.eE] }
//! bool   := [tT] "rue" | [fF] "alse"
//! null   := [Nn] [UuOo] [LlNn] [LlEe]
//! ```
//!
//! Whitespace is allowed between any two tokens.

use super::cursor::Cursor;
use crate::config::{CodecConfig, StringFactory};
use recwire_core::{DecodeError, Dict, Production, Value};

/// Allowed chars at each position of a null literal
const NULL_PATTERN: [&str; 4] = ["Nn", "UuOo", "LlNn", "LlEe"];

pub(crate) struct Parser<'c, C> {
    cursor: C,
    strings: StringFactory<'c>,
    max_depth: usize,
    depth: usize,
}

impl<'c, C: Cursor> Parser<'c, C> {
    pub(crate) fn new(cursor: C, strings: StringFactory<'c>, config: &CodecConfig) -> Self {
        Parser {
            cursor,
            strings,
            max_depth: config.max_depth,
            depth: 0,
        }
    }

    /// Parse a whole document: one value surrounded by optional whitespace
    pub(crate) fn parse_document(&mut self) -> Result<Value, DecodeError> {
        let value = self.next_value()?.ok_or(DecodeError::EmptyInput)?;
        self.cursor.skip_whitespace()?;
        if self.cursor.peek()?.is_some() {
            return Err(self.cursor.malformed(Production::TrailingCharacters));
        }
        Ok(value)
    }

    /// Parse the next value, or `None` if only whitespace remains
    pub(crate) fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        self.depth = 0;
        self.cursor.skip_whitespace()?;
        if self.cursor.peek()?.is_none() {
            return Ok(None);
        }
        self.parse_value().map(Some)
    }

    fn parse_value(&mut self) -> Result<Value, DecodeError> {
        self.cursor.skip_whitespace()?;
        match self.cursor.peek()? {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some(quote @ ('"' | '\'')) => {
                self.cursor.skip();
                let s = self.cursor.read_string_body(quote, self.strings)?;
                Ok(Value::String(s))
            }
            Some('+' | '-' | '.' | '0'..='9') => self.parse_number(),
            Some('t' | 'T' | 'f' | 'F') => self.parse_bool(),
            Some('n' | 'N') => self.parse_null(),
            _ => Err(self.cursor.malformed(Production::Value)),
        }
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.max_depth {
            return Err(self.cursor.malformed(Production::NestingTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_object(&mut self) -> Result<Value, DecodeError> {
        self.cursor.skip();
        self.enter()?;
        let mut dict = Dict::new();

        self.cursor.skip_whitespace()?;
        if self.cursor.peek()? == Some('}') {
            self.cursor.skip();
            self.depth -= 1;
            return Ok(Value::Dict(dict));
        }

        loop {
            let key = self.parse_value()?;
            if !matches!(key, Value::String(_)) {
                return Err(self.cursor.malformed(Production::KeyNotString));
            }
            self.cursor.skip_whitespace()?;
            if self.cursor.read()? != Some(':') {
                return Err(self.cursor.malformed(Production::KeyMissingValue));
            }
            let value = self.parse_value()?;
            dict.insert(key, value);

            self.cursor.skip_whitespace()?;
            match self.cursor.read()? {
                Some(',') => {}
                Some('}') => break,
                _ => return Err(self.cursor.malformed(Production::Object)),
            }
        }

        self.depth -= 1;
        Ok(Value::Dict(dict))
    }

    fn parse_array(&mut self) -> Result<Value, DecodeError> {
        self.cursor.skip();
        self.enter()?;
        let mut items = Vec::new();

        self.cursor.skip_whitespace()?;
        if self.cursor.peek()? == Some(']') {
            self.cursor.skip();
            self.depth -= 1;
            return Ok(Value::List(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.cursor.skip_whitespace()?;
            match self.cursor.read()? {
                Some(',') => {}
                Some(']') => break,
                _ => return Err(self.cursor.malformed(Production::Array)),
            }
        }

        self.depth -= 1;
        Ok(Value::List(items))
    }

    /// Numbers are integers unless a `.`, an exponent, or a sign after the
    /// first char shows up. A sign after the first char that does not follow
    /// `e`/`E` starts an implicit exponent: `4+2` is `4e+2`.
    ///
    /// A float that overflows to infinity is invalid; the encoder could not
    /// write it back.
    fn parse_number(&mut self) -> Result<Value, DecodeError> {
        let mut text = std::mem::take(self.cursor.scratch());
        text.clear();
        let mut integral = true;

        while let Some(c) = self.cursor.peek()? {
            match c {
                '0'..='9' => {}
                '.' | 'e' | 'E' => integral = false,
                '+' | '-' => {
                    if !text.is_empty() {
                        integral = false;
                        if !text.ends_with(['e', 'E']) {
                            text.push('e');
                        }
                    }
                }
                _ => break,
            }
            text.push(c);
            self.cursor.skip();
        }

        let parsed = if integral {
            text.parse::<i64>().ok().map(Value::Int)
        } else {
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float)
        };
        *self.cursor.scratch() = text;
        match parsed {
            Some(value) => Ok(value),
            None => Err(self.cursor.malformed(Production::Number)),
        }
    }

    fn parse_bool(&mut self) -> Result<Value, DecodeError> {
        let (rest, value) = match self.cursor.read()? {
            Some('t' | 'T') => ("rue", true),
            _ => ("alse", false),
        };
        for expected in rest.chars() {
            if self.cursor.read()? != Some(expected) {
                return Err(self.cursor.malformed(Production::Boolean));
            }
        }
        Ok(Value::Bool(value))
    }

    fn parse_null(&mut self) -> Result<Value, DecodeError> {
        for allowed in NULL_PATTERN {
            match self.cursor.read()? {
                Some(c) if allowed.contains(c) => {}
                _ => return Err(self.cursor.malformed(Production::Null)),
            }
        }
        Ok(Value::Null)
    }
}
