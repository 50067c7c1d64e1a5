//! Text codec
//!
//! A human-readable object-literal format:
//!
//! ```text
//! {"id":17, "tags":["a", "b"], "score":0.5, "parent":null}
//! ```
//!
//! Decoding is lenient in the ways records written by other tools tend to
//! be: single-quoted strings, `None`/`NULL` for null, `True`/`False`.
//! Encoding is strict and byte-stable.
//!
//! # Example
//!
//! ```rust,ignore
//! use recwire_codec::text;
//!
//! let value = text::decode(r#"{"k": [1, 2.5]}"#)?;
//! assert_eq!(text::encode(&value)?, r#"{"k":[1, 2.5]}"#);
//! ```

mod cursor;
mod decode;
mod encode;

use crate::config::{CodecConfig, StringFactory};
use cursor::{BufferedCursor, ReaderCursor};
use decode::Parser;
use recwire_core::{DecodeError, EncodeError, InternCache, Value, intern};
use serde::Serialize;
use std::fmt;
use std::io::{self, BufReader, Read};

/// Encode a value as text
pub fn encode(value: &Value) -> Result<String, EncodeError> {
    let mut out = String::new();
    encode::write_value(&mut out, value)?;
    Ok(out)
}

/// Append the text form of a value to `out`
pub fn encode_to<W: fmt::Write>(value: &Value, out: &mut W) -> Result<(), EncodeError> {
    encode::write_value(out, value)
}

/// Write the text form of a value to a byte sink
pub fn write_to<W: io::Write>(value: &Value, mut writer: W) -> Result<(), EncodeError> {
    let text = encode(value)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Encode any `Serialize` type as text
pub fn encode_host<T: Serialize + ?Sized>(host: &T) -> Result<String, EncodeError> {
    encode(&recwire_core::to_value(host)?)
}

/// Decode one text document using the global intern cache
pub fn decode(input: &str) -> Result<Value, DecodeError> {
    TextDecoder::new().decode_str(input)
}

/// Decode one text document from a reader using the global intern cache
pub fn decode_reader<R: Read>(reader: R) -> Result<Value, DecodeError> {
    TextDecoder::new().decode_reader(reader)
}

/// Text decoder with its own configuration and intern cache
#[derive(Debug, Clone, Copy)]
pub struct TextDecoder<'c> {
    config: CodecConfig,
    cache: &'c InternCache,
}

impl TextDecoder<'static> {
    /// Default configuration, global intern cache
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        TextDecoder {
            config,
            cache: intern::global(),
        }
    }
}

impl Default for TextDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> TextDecoder<'c> {
    /// Default configuration, strings interned into `cache`
    pub fn with_cache(cache: &'c InternCache) -> Self {
        TextDecoder {
            config: CodecConfig::default(),
            cache,
        }
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    fn strings(&self) -> StringFactory<'c> {
        StringFactory::new(self.cache, &self.config)
    }

    /// Decode a whole in-memory document
    pub fn decode_str(&self, input: &str) -> Result<Value, DecodeError> {
        Parser::new(BufferedCursor::new(input), self.strings(), &self.config).parse_document()
    }

    /// Decode a whole document from a reader
    ///
    /// The reader is consumed to its end; anything after the value other
    /// than whitespace is an error.
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Value, DecodeError> {
        let cursor = ReaderCursor::new(BufReader::new(reader));
        Parser::new(cursor, self.strings(), &self.config).parse_document()
    }

    /// Read consecutive whitespace-separated values from a reader
    pub fn stream<R: Read>(&self, reader: R) -> ValueStream<'c, R> {
        let cursor = ReaderCursor::new(BufReader::new(reader));
        ValueStream {
            parser: Parser::new(cursor, self.strings(), &self.config),
            failed: false,
        }
    }
}

/// Values read one after another from a text stream
///
/// The stream ends after the first error: the parser's position inside a
/// malformed value is not a safe place to resume.
pub struct ValueStream<'c, R> {
    parser: Parser<'c, ReaderCursor<BufReader<R>>>,
    failed: bool,
}

impl<R: Read> ValueStream<'_, R> {
    /// The next value, `Ok(None)` once the input is exhausted
    pub fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        if self.failed {
            return Ok(None);
        }
        let next = self.parser.next_value();
        self.failed = next.is_err();
        next
    }
}

impl<R: Read> Iterator for ValueStream<'_, R> {
    type Item = Result<Value, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recwire_core::SharedString;

    #[test]
    fn test_encode_decode() {
        let value = decode(r#"{"k": [1, 2.5, "x"]}"#).unwrap();
        assert_eq!(encode(&value).unwrap(), r#"{"k":[1, 2.5, "x"]}"#);
    }

    #[test]
    fn test_encode_to_appends() {
        let mut out = String::from("value=");
        encode_to(&Value::Int(3), &mut out).unwrap();
        assert_eq!(out, "value=3");
    }

    #[test]
    fn test_write_to_bytes() {
        let mut out = Vec::new();
        write_to(&Value::from(vec!["é"]), &mut out).unwrap();
        assert_eq!(out, br#"["\u00e9"]"#);
    }

    #[test]
    fn test_encode_host() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("b", vec![1u8, 2]);
        map.insert("a", vec![]);
        assert_eq!(encode_host(&map).unwrap(), r#"{"a":[], "b":[1, 2]}"#);
        assert!(matches!(
            encode_host(&u64::MAX),
            Err(EncodeError::Unsupported(_))
        ));
    }

    #[test]
    fn test_decode_reader_rejects_trailing() {
        assert_eq!(decode_reader(" [1] ".as_bytes()).unwrap(), Value::from(vec![1]));
        let err = decode_reader("[1] x".as_bytes()).unwrap_err();
        assert_eq!(
            err.production(),
            Some(recwire_core::Production::TrailingCharacters)
        );
    }

    #[test]
    fn test_private_cache() {
        let cache = InternCache::new();
        let decoder = TextDecoder::with_cache(&cache);
        let v = decoder.decode_str(r#"["dup", "dup"]"#).unwrap();
        let items = v.as_list().unwrap();
        let a = items[0].as_shared_str().unwrap();
        let b = items[1].as_shared_str().unwrap();
        assert!(SharedString::ptr_eq(a, b));
        assert_eq!(cache.live_count(), 1);
    }

    #[test]
    fn test_interning_disabled() {
        let cache = InternCache::new();
        let decoder =
            TextDecoder::with_cache(&cache).config(CodecConfig::new().without_interning());
        let v = decoder.decode_str(r#"["dup", "dup", ""]"#).unwrap();
        let items = v.as_list().unwrap();
        let a = items[0].as_shared_str().unwrap();
        let b = items[1].as_shared_str().unwrap();
        assert_eq!(a, b);
        assert!(!SharedString::ptr_eq(a, b));
        assert!(SharedString::ptr_eq(
            items[2].as_shared_str().unwrap(),
            &SharedString::empty()
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stream_stops_after_error() {
        let cache = InternCache::new();
        let decoder = TextDecoder::with_cache(&cache);
        let results: Vec<_> = decoder.stream("1 {bad} 3".as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &Value::Int(1));
        assert!(results[1].is_err());
    }

    #[test]
    fn test_stream_of_records() {
        let cache = InternCache::new();
        let input = "{\"id\":1}\n{\"id\":2}\n\n{\"id\":3}\n";
        let ids: Vec<i64> = TextDecoder::with_cache(&cache)
            .stream(input.as_bytes())
            .map(|r| r.unwrap().get("id").and_then(Value::as_i64).unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
