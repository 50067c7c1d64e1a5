//! Compact binary codec
//!
//! Every value starts with a one-byte tag:
//!
//! | Tag | Type   | Payload                                      |
//! |-----|--------|----------------------------------------------|
//! | 0   | null   | none                                         |
//! | 1   | string | vint byte length, UTF-8 bytes                |
//! | 2   | list   | vint count, values                           |
//! | 3   | dict   | vint count, key/value pairs (key first)      |
//! | 4   | int    | vint (32-bit range)                          |
//! | 5   | float  | 8-byte big-endian IEEE 754 double            |
//! | 6   | true   | none                                         |
//! | 7   | false  | none                                         |
//!
//! Dict keys are full values, so int- or list-keyed dicts survive a round
//! trip. Ints outside the 32-bit range are refused rather than truncated.
//! The stream carries no version header; record files are simply values
//! written back to back.

mod decode;
mod encode;
mod vint;

use crate::config::{CodecConfig, StringFactory};
use decode::BinaryReader;
use recwire_core::{DecodeError, EncodeError, InternCache, Value, intern};
use serde::Serialize;
use std::io::{Read, Write};

pub const TAG_NULL: u8 = 0;
pub const TAG_STRING: u8 = 1;
pub const TAG_LIST: u8 = 2;
pub const TAG_DICT: u8 = 3;
pub const TAG_INT: u8 = 4;
pub const TAG_FLOAT: u8 = 5;
pub const TAG_TRUE: u8 = 6;
pub const TAG_FALSE: u8 = 7;

/// Encode a value into a new buffer
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode::write_value(&mut out, value)?;
    Ok(out)
}

/// Write the binary form of a value to `out`
pub fn encode_to<W: Write>(value: &Value, out: &mut W) -> Result<(), EncodeError> {
    encode::write_value(out, value)
}

/// Encode any `Serialize` type
pub fn encode_host<T: Serialize + ?Sized>(host: &T) -> Result<Vec<u8>, EncodeError> {
    encode(&recwire_core::to_value(host)?)
}

/// Decode a buffer holding exactly one value, using the global intern cache
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    BinaryDecoder::new().decode(bytes)
}

/// Decode one value from a reader, using the global intern cache
pub fn decode_from<R: Read>(reader: R) -> Result<Value, DecodeError> {
    BinaryDecoder::new().decode_from(reader)
}

/// Binary decoder with its own configuration and intern cache
#[derive(Debug, Clone, Copy)]
pub struct BinaryDecoder<'c> {
    config: CodecConfig,
    cache: &'c InternCache,
}

impl BinaryDecoder<'static> {
    /// Default configuration, global intern cache
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        BinaryDecoder {
            config,
            cache: intern::global(),
        }
    }
}

impl Default for BinaryDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> BinaryDecoder<'c> {
    /// Default configuration, strings interned into `cache`
    pub fn with_cache(cache: &'c InternCache) -> Self {
        BinaryDecoder {
            config: CodecConfig::default(),
            cache,
        }
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    fn reader<R: Read>(&self, input: R) -> BinaryReader<'c, R> {
        BinaryReader::new(input, StringFactory::new(self.cache, &self.config), &self.config)
    }

    /// Decode a buffer holding exactly one value
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut reader = self.reader(bytes);
        let value = reader.next_value()?.ok_or(DecodeError::EmptyInput)?;
        let rest = reader.into_inner();
        if !rest.is_empty() {
            return Err(DecodeError::TrailingBytes(rest.len()));
        }
        Ok(value)
    }

    /// Decode the next value from a reader, leaving anything after it unread
    ///
    /// The reader is read in small pieces; wrap files in a `BufReader`.
    pub fn decode_from<R: Read>(&self, reader: R) -> Result<Value, DecodeError> {
        self.reader(reader)
            .next_value()?
            .ok_or(DecodeError::EmptyInput)
    }

    /// Read values written back to back until the input ends
    pub fn stream<R: Read>(&self, reader: R) -> BinaryStream<'c, R> {
        BinaryStream {
            reader: self.reader(reader),
            failed: false,
        }
    }
}

/// Values read one after another from a binary record stream
///
/// Ends cleanly when the input ends on a value boundary. Input that ends
/// inside a value yields `UnexpectedEof`; the stream stops after any error.
pub struct BinaryStream<'c, R> {
    reader: BinaryReader<'c, R>,
    failed: bool,
}

impl<R: Read> BinaryStream<'_, R> {
    /// The next value, `Ok(None)` at end of input
    pub fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        if self.failed {
            return Ok(None);
        }
        let next = self.reader.next_value();
        self.failed = next.is_err();
        next
    }
}

impl<R: Read> Iterator for BinaryStream<'_, R> {
    type Item = Result<Value, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}
