//! Text encoder
//!
//! Output is byte-stable: the same value always encodes to the same text.
//!
//! - Strings are double-quoted. `" \ \b \f \n \r \t` use short escapes, any
//!   other char outside `' '..='~'` is written as `\uXXXX` (lowercase hex,
//!   surrogate pairs above U+FFFF).
//! - Floats use the shortest form that reads back to the same bits and
//!   always contains `.` or `e`, so they never decode as ints.
//! - Lists are `[a, b]`, dicts `{"k":v, "k2":v2}`. A non-string dict key is
//!   written as the quoted text of its own encoding.

use recwire_core::{EncodeError, Value};
use std::fmt::{self, Write};
use std::io;

const HEX: &[u8; 16] = b"0123456789abcdef";

fn sink_error(_: fmt::Error) -> EncodeError {
    EncodeError::Io(io::Error::other("text sink rejected write"))
}

pub(crate) fn write_value<W: Write>(out: &mut W, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Null => out.write_str("null").map_err(sink_error),
        Value::Bool(b) => out
            .write_str(if *b { "true" } else { "false" })
            .map_err(sink_error),
        Value::Int(i) => write!(out, "{}", i).map_err(sink_error),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(EncodeError::NonFiniteFloat(*f));
            }
            write!(out, "{:?}", f).map_err(sink_error)
        }
        Value::String(s) => write_string(out, s).map_err(sink_error),
        Value::List(items) => {
            out.write_char('[').map_err(sink_error)?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ").map_err(sink_error)?;
                }
                write_value(out, item)?;
            }
            out.write_char(']').map_err(sink_error)
        }
        Value::Dict(dict) => {
            out.write_char('{').map_err(sink_error)?;
            for (i, (key, val)) in dict.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ").map_err(sink_error)?;
                }
                write_key(out, key)?;
                out.write_char(':').map_err(sink_error)?;
                write_value(out, val)?;
            }
            out.write_char('}').map_err(sink_error)
        }
    }
}

fn write_key<W: Write>(out: &mut W, key: &Value) -> Result<(), EncodeError> {
    match key {
        Value::String(s) => write_string(out, s).map_err(sink_error),
        other => {
            let mut text = String::new();
            write_value(&mut text, other)?;
            write_string(out, &text).map_err(sink_error)
        }
    }
}

pub(crate) fn write_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    // Copy clean runs in one call, stop only at chars that need escaping
    let mut clean_from = 0;
    for (i, c) in s.char_indices() {
        let short = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\x08' => "\\b",
            '\x0C' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            ' '..='~' => continue,
            _ => "",
        };
        out.write_str(&s[clean_from..i])?;
        clean_from = i + c.len_utf8();
        if short.is_empty() {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write_unicode_escape(out, *unit)?;
            }
        } else {
            out.write_str(short)?;
        }
    }
    out.write_str(&s[clean_from..])?;
    out.write_char('"')
}

fn write_unicode_escape<W: Write>(out: &mut W, unit: u16) -> fmt::Result {
    out.write_str("\\u")?;
    for shift in [12, 8, 4, 0] {
        out.write_char(char::from(HEX[usize::from((unit >> shift) & 0xF)]))?;
    }
    Ok(())
}
