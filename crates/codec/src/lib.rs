//! Recwire Codec: text and binary wire formats for recwire values
//!
//! Both codecs turn a `recwire_core::Value` into bytes and back. They share
//! nothing but the value model, the decoder configuration, and the string
//! intern cache.
//!
//! # Modules
//!
//! - `text`: Human-readable object-literal format (buffered and streaming decode)
//! - `binary`: Tagged, length-prefixed compact format
//! - `config`: `CodecConfig` (nesting limit, interning)
//! - `record`: Lazily decoded text records and `key<TAB>value` record lines
//! - `results`: Merging partial result dicts from many tasks

pub mod binary;
pub mod config;
pub mod record;
pub mod results;
pub mod text;

pub use binary::{BinaryDecoder, BinaryStream};
pub use config::CodecConfig;
pub use record::{RecordLine, RecordReader, TextRecord};
pub use results::{CollectError, ResultCollector};
pub use text::{TextDecoder, ValueStream};

// Core types callers always need alongside the codecs
pub use recwire_core::{
    DecodeError, Dict, EncodeError, InternCache, Production, SharedString, Value,
};
