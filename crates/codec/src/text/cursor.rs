//! Character sources for the text parser
//!
//! The grammar in `decode` is written once against the `Cursor` trait. Two
//! sources implement it:
//!
//! - `BufferedCursor` walks a `&str` in place. Strings without escapes are
//!   interned straight from the input slice, and errors quote a window around
//!   the failing position.
//! - `ReaderCursor` decodes UTF-8 from a `BufRead` one char at a time with a
//!   single char of pushback. Strings are assembled in a reused scratch buffer,
//!   and errors quote the input that follows.

use crate::config::StringFactory;
use recwire_core::{DecodeError, Production, SharedString};
use std::io::{self, BufRead};

/// Chars of input quoted after a streaming error
const READER_CONTEXT_CHARS: usize = 20;
/// Chars quoted before the failing position of a buffered error
const WINDOW_BACK: usize = 5;
/// Total chars in a buffered error window
const WINDOW_WIDTH: usize = 10;

pub(crate) trait Cursor {
    /// The next char without consuming it; `None` at end of input
    fn peek(&mut self) -> Result<Option<char>, DecodeError>;

    /// Consume and return the next char
    fn read(&mut self) -> Result<Option<char>, DecodeError>;

    /// Consume the char returned by the last `peek`
    fn skip(&mut self);

    /// Where the cursor is, for error messages
    fn error_context(&mut self) -> String;

    /// Reusable buffer for string and number text
    fn scratch(&mut self) -> &mut String;

    fn malformed(&mut self, production: Production) -> DecodeError {
        DecodeError::malformed(production, self.error_context())
    }

    fn skip_whitespace(&mut self) -> Result<(), DecodeError> {
        while let Some(c) = self.peek()? {
            if !matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C') {
                break;
            }
            self.skip();
        }
        Ok(())
    }

    /// Read a string body up to and including the closing `quote`
    ///
    /// The opening quote has already been consumed.
    fn read_string_body(
        &mut self,
        quote: char,
        strings: StringFactory<'_>,
    ) -> Result<SharedString, DecodeError> {
        let mut buf = std::mem::take(self.scratch());
        buf.clear();
        let result = self
            .read_string_into(quote, &mut buf)
            .map(|()| strings.make(&buf));
        *self.scratch() = buf;
        result
    }

    /// Slow path: unescape chars into `buf` until the closing quote
    fn read_string_into(&mut self, quote: char, buf: &mut String) -> Result<(), DecodeError> {
        loop {
            match self.read()? {
                None => return Err(self.malformed(Production::String)),
                Some('\\') => self.read_escape(buf)?,
                Some(c) if c == quote => return Ok(()),
                Some(c) => buf.push(c),
            }
        }
    }

    /// Decode one escape sequence; the backslash has been consumed
    fn read_escape(&mut self, buf: &mut String) -> Result<(), DecodeError> {
        let c = match self.read()? {
            Some(c @ ('"' | '\'' | '\\' | '/')) => c,
            Some('b') => '\x08',
            Some('f') => '\x0C',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => self.read_unicode_escape()?,
            _ => return Err(self.malformed(Production::Escape)),
        };
        buf.push(c);
        Ok(())
    }

    /// `XXXX` after `\u`, combining a surrogate pair into one char
    fn read_unicode_escape(&mut self) -> Result<char, DecodeError> {
        let unit = self.read_hex4()?;
        let code = match unit {
            0xD800..=0xDBFF => {
                if self.read()? != Some('\\') || self.read()? != Some('u') {
                    return Err(self.malformed(Production::Escape));
                }
                let low = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.malformed(Production::Escape));
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => unit,
        };
        // Lone low surrogates land here too
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => Err(self.malformed(Production::Escape)),
        }
    }

    fn read_hex4(&mut self) -> Result<u32, DecodeError> {
        let mut unit = 0;
        for _ in 0..4 {
            match self.read()?.and_then(|c| c.to_digit(16)) {
                Some(digit) => unit = (unit << 4) | digit,
                None => return Err(self.malformed(Production::Escape)),
            }
        }
        Ok(unit)
    }
}

/// Cursor over an in-memory document
pub(crate) struct BufferedCursor<'a> {
    input: &'a str,
    /// Byte offset of the next char
    pos: usize,
    scratch: String,
}

impl<'a> BufferedCursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        BufferedCursor {
            input,
            pos: 0,
            scratch: String::new(),
        }
    }
}

impl Cursor for BufferedCursor<'_> {
    fn peek(&mut self) -> Result<Option<char>, DecodeError> {
        Ok(self.input[self.pos..].chars().next())
    }

    fn read(&mut self) -> Result<Option<char>, DecodeError> {
        let next = self.input[self.pos..].chars().next();
        if let Some(c) = next {
            self.pos += c.len_utf8();
        }
        Ok(next)
    }

    fn skip(&mut self) {
        if let Some(c) = self.input[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn error_context(&mut self) -> String {
        let at = self.input[..self.pos].chars().count();
        let window: String = self
            .input
            .chars()
            .skip(at.saturating_sub(WINDOW_BACK))
            .take(WINDOW_WIDTH)
            .collect();
        format!("at character {}: ...{}...", at, window)
    }

    fn scratch(&mut self) -> &mut String {
        &mut self.scratch
    }

    fn read_string_body(
        &mut self,
        quote: char,
        strings: StringFactory<'_>,
    ) -> Result<SharedString, DecodeError> {
        // Quotes and backslash are ASCII, so a byte scan lands on char boundaries
        let rest = &self.input.as_bytes()[self.pos..];
        let quote_byte = quote as u8;
        match rest.iter().position(|&b| b == quote_byte || b == b'\\') {
            Some(end) if rest[end] == quote_byte => {
                let s = strings.make(&self.input[self.pos..self.pos + end]);
                self.pos += end + 1;
                Ok(s)
            }
            Some(backslash) => {
                let mut buf = std::mem::take(&mut self.scratch);
                buf.clear();
                buf.push_str(&self.input[self.pos..self.pos + backslash]);
                self.pos += backslash;
                let result = self
                    .read_string_into(quote, &mut buf)
                    .map(|()| strings.make(&buf));
                self.scratch = buf;
                result
            }
            None => {
                self.pos = self.input.len();
                Err(self.malformed(Production::String))
            }
        }
    }
}

/// Cursor over a byte stream
pub(crate) struct ReaderCursor<R> {
    reader: R,
    peeked: Option<char>,
    scratch: String,
}

impl<R: BufRead> ReaderCursor<R> {
    pub(crate) fn new(reader: R) -> Self {
        ReaderCursor {
            reader,
            peeked: None,
            scratch: String::new(),
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            };
            if byte.is_some() {
                self.reader.consume(1);
            }
            return Ok(byte);
        }
    }

    fn next_char(&mut self) -> Result<Option<char>, DecodeError> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(DecodeError::InvalidUtf8),
        };
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or(DecodeError::InvalidUtf8)?;
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(DecodeError::InvalidUtf8)
    }
}

impl<R: BufRead> Cursor for ReaderCursor<R> {
    fn peek(&mut self) -> Result<Option<char>, DecodeError> {
        if self.peeked.is_none() {
            self.peeked = self.next_char()?;
        }
        Ok(self.peeked)
    }

    fn read(&mut self) -> Result<Option<char>, DecodeError> {
        match self.peeked.take() {
            Some(c) => Ok(Some(c)),
            None => self.next_char(),
        }
    }

    fn skip(&mut self) {
        self.peeked = None;
    }

    fn error_context(&mut self) -> String {
        let mut ahead = String::new();
        while ahead.chars().count() < READER_CONTEXT_CHARS {
            match self.read() {
                Ok(Some(c)) => ahead.push(c),
                _ => break,
            }
        }
        format!("at ...{}...", ahead)
    }

    fn scratch(&mut self) -> &mut String {
        &mut self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use recwire_core::InternCache;

    fn body<C: Cursor>(cursor: &mut C, quote: char) -> Result<SharedString, DecodeError> {
        let cache = InternCache::new();
        let strings = StringFactory::new(&cache, &CodecConfig::default());
        cursor.read_string_body(quote, strings)
    }

    #[test]
    fn test_buffered_peek_read_skip() {
        let mut c = BufferedCursor::new("aé");
        assert_eq!(c.peek().unwrap(), Some('a'));
        c.skip();
        assert_eq!(c.read().unwrap(), Some('é'));
        assert_eq!(c.peek().unwrap(), None);
        assert_eq!(c.read().unwrap(), None);
    }

    #[test]
    fn test_reader_decodes_multibyte_chars() {
        let mut c = ReaderCursor::new("é🦀x".as_bytes());
        assert_eq!(c.read().unwrap(), Some('é'));
        assert_eq!(c.peek().unwrap(), Some('🦀'));
        assert_eq!(c.peek().unwrap(), Some('🦀'));
        c.skip();
        assert_eq!(c.read().unwrap(), Some('x'));
        assert_eq!(c.read().unwrap(), None);
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let mut c = ReaderCursor::new(&[b'a', 0xFF][..]);
        assert_eq!(c.read().unwrap(), Some('a'));
        assert!(matches!(c.read(), Err(DecodeError::InvalidUtf8)));

        let mut truncated = ReaderCursor::new(&[0xE2, 0x82][..]);
        assert!(matches!(truncated.read(), Err(DecodeError::InvalidUtf8)));
    }

    #[test]
    fn test_skip_whitespace() {
        let mut c = BufferedCursor::new(" \t\r\n\x0Cz");
        c.skip_whitespace().unwrap();
        assert_eq!(c.peek().unwrap(), Some('z'));
    }

    #[test]
    fn test_clean_string_fast_path() {
        let mut c = BufferedCursor::new("plain\" rest");
        assert_eq!(body(&mut c, '"').unwrap(), "plain");
        assert_eq!(c.read().unwrap(), Some(' '));
    }

    #[test]
    fn test_escaped_string_both_cursors() {
        let text = r#"a\"b\nc\/é🦀" tail"#;
        let mut buffered = BufferedCursor::new(text);
        let mut streamed = ReaderCursor::new(text.as_bytes());
        assert_eq!(body(&mut buffered, '"').unwrap(), "a\"b\nc/é🦀");
        assert_eq!(body(&mut streamed, '"').unwrap(), "a\"b\nc/é🦀");
    }

    #[test]
    fn test_other_quote_style_is_literal() {
        let mut c = BufferedCursor::new(r#"it's"'"#);
        assert_eq!(body(&mut c, '"').unwrap(), "it's");
        let mut c = ReaderCursor::new(r#"say "hi"'"#.as_bytes());
        assert_eq!(body(&mut c, '\'').unwrap(), "say \"hi\"");
    }

    #[test]
    fn test_bad_escapes() {
        for text in [r#"\x""#, r#"\u12G4""#, r#"\ud800""#, r#"\udc00""#, r#"\ud800A""#] {
            let err = body(&mut BufferedCursor::new(text), '"').unwrap_err();
            assert_eq!(err.production(), Some(Production::Escape), "input {:?}", text);
        }
    }

    #[test]
    fn test_unterminated_string() {
        let err = body(&mut BufferedCursor::new("never ends"), '"').unwrap_err();
        assert_eq!(err.production(), Some(Production::String));
        let err = body(&mut ReaderCursor::new("esc\\n".as_bytes()), '"').unwrap_err();
        assert_eq!(err.production(), Some(Production::String));
    }

    #[test]
    fn test_buffered_error_window() {
        let mut c = BufferedCursor::new("0123456789abcdef");
        for _ in 0..8 {
            c.skip();
        }
        assert_eq!(c.error_context(), "at character 8: ...3456789abc...");
    }

    #[test]
    fn test_reader_error_context_shows_upcoming_input() {
        let mut c = ReaderCursor::new("xy: the rest of a fairly long line".as_bytes());
        c.skip_whitespace().unwrap();
        assert_eq!(c.read().unwrap(), Some('x'));
        assert_eq!(c.error_context(), "at ...y: the rest of a fai...");
    }
}
