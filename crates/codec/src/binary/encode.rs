use super::vint::write_vint;
use super::{TAG_DICT, TAG_FALSE, TAG_FLOAT, TAG_INT, TAG_LIST, TAG_NULL, TAG_STRING, TAG_TRUE};
use recwire_core::{EncodeError, Value};
use std::io::Write;

pub(crate) fn write_value<W: Write>(out: &mut W, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Null => out.write_all(&[TAG_NULL])?,
        Value::Bool(true) => out.write_all(&[TAG_TRUE])?,
        Value::Bool(false) => out.write_all(&[TAG_FALSE])?,
        Value::Int(i) => {
            let narrow = i32::try_from(*i).map_err(|_| EncodeError::IntegerOutOfRange(*i))?;
            out.write_all(&[TAG_INT])?;
            write_vint(out, i64::from(narrow))?;
        }
        Value::Float(f) => {
            out.write_all(&[TAG_FLOAT])?;
            out.write_all(&f.to_be_bytes())?;
        }
        Value::String(s) => {
            out.write_all(&[TAG_STRING])?;
            write_len(out, s.len())?;
            out.write_all(s.as_bytes())?;
        }
        Value::List(items) => {
            out.write_all(&[TAG_LIST])?;
            write_len(out, items.len())?;
            for item in items {
                write_value(out, item)?;
            }
        }
        Value::Dict(dict) => {
            out.write_all(&[TAG_DICT])?;
            write_len(out, dict.len())?;
            for (key, val) in dict {
                write_value(out, key)?;
                write_value(out, val)?;
            }
        }
    }
    Ok(())
}

fn write_len<W: Write>(out: &mut W, len: usize) -> Result<(), EncodeError> {
    let len = i32::try_from(len).map_err(|_| {
        EncodeError::Unsupported(format!("length {} exceeds the 32-bit binary limit", len))
    })?;
    write_vint(out, i64::from(len))?;
    Ok(())
}
