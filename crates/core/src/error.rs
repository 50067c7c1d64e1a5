//! Codec errors
//!
//! `DecodeError` covers both wire formats: text productions report which
//! grammar rule rejected the input plus a slice of the surrounding text,
//! binary failures report the structural problem. `EncodeError` covers
//! values (or host types) a wire format cannot carry.

use std::fmt;
use std::io;

/// Grammar production that rejected a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Value,
    String,
    Object,
    Array,
    Escape,
    Boolean,
    Null,
    Number,
    KeyNotString,
    KeyMissingValue,
    TrailingCharacters,
    NestingTooDeep,
}

impl Production {
    pub fn as_str(self) -> &'static str {
        match self {
            Production::Value => "invalid value",
            Production::String => "invalid string value",
            Production::Object => "invalid object",
            Production::Array => "invalid array",
            Production::Escape => "invalid escape sequence",
            Production::Boolean => "invalid boolean value",
            Production::Null => "invalid null value",
            Production::Number => "invalid number value",
            Production::KeyNotString => "key must be string",
            Production::KeyMissingValue => "key missing value",
            Production::TrailingCharacters => "trailing characters",
            Production::NestingTooDeep => "nesting too deep",
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed input
#[derive(Debug)]
pub enum DecodeError {
    /// Nothing to decode
    EmptyInput,
    /// Text rejected by a grammar production
    ///
    /// `context` locates the failure: a window around the character position
    /// for buffered input, the upcoming characters for streamed input.
    Malformed {
        production: Production,
        context: String,
    },
    /// Input ended inside a value
    UnexpectedEof,
    /// Unknown binary type tag
    InvalidTag(u8),
    /// Negative binary length or element count
    InvalidLength(i64),
    /// Binary integer wider than 32 bits
    IntegerOverflow,
    /// String bytes are not UTF-8
    InvalidUtf8,
    /// Bytes left over after a whole-buffer decode
    TrailingBytes(usize),
    /// Underlying reader failed
    Io(io::Error),
}

impl DecodeError {
    pub fn malformed(production: Production, context: impl Into<String>) -> Self {
        DecodeError::Malformed {
            production,
            context: context.into(),
        }
    }

    /// The rejecting production, for text errors
    pub fn production(&self) -> Option<Production> {
        match self {
            DecodeError::Malformed { production, .. } => Some(*production),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::EmptyInput => write!(f, "Empty input"),
            DecodeError::Malformed {
                production,
                context,
            } => write!(f, "Error {} {}", production, context),
            DecodeError::UnexpectedEof => write!(f, "Unexpected end of input"),
            DecodeError::InvalidTag(tag) => write!(f, "invalid token value {}", tag),
            DecodeError::InvalidLength(len) => write!(f, "Invalid length: {}", len),
            DecodeError::IntegerOverflow => {
                write!(f, "Integer does not fit in 32 bits")
            }
            DecodeError::InvalidUtf8 => write!(f, "Invalid UTF-8 in string"),
            DecodeError::TrailingBytes(n) => {
                write!(f, "{} trailing bytes after value", n)
            }
            DecodeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::UnexpectedEof,
            io::ErrorKind::InvalidData => DecodeError::InvalidUtf8,
            _ => DecodeError::Io(e),
        }
    }
}

/// Unsupported value
#[derive(Debug)]
pub enum EncodeError {
    /// Host value with no `Value` representation
    Unsupported(String),
    /// NaN or infinity has no text form
    NonFiniteFloat(f64),
    /// Integer outside the binary format's 32-bit range
    IntegerOutOfRange(i64),
    /// Underlying writer failed
    Io(io::Error),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Unsupported(what) => write!(f, "Unsupported value: {}", what),
            EncodeError::NonFiniteFloat(v) => {
                write!(f, "Cannot encode non-finite float: {}", v)
            }
            EncodeError::IntegerOutOfRange(v) => {
                write!(f, "Integer {} does not fit in 32 bits", v)
            }
            EncodeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::Io(e)
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EncodeError::Unsupported(msg.to_string())
    }
}
