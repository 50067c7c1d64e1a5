use super::vint::{read_vint, read_vint32};
use super::{TAG_DICT, TAG_FALSE, TAG_FLOAT, TAG_INT, TAG_LIST, TAG_NULL, TAG_STRING, TAG_TRUE};
use crate::config::{CodecConfig, StringFactory};
use recwire_core::{DecodeError, Dict, Production, Value};
use std::io::{self, Read};

/// Upper bound on capacity reserved from an untrusted element count
const PREALLOC_LIMIT: usize = 1024;

pub(crate) struct BinaryReader<'c, R> {
    input: R,
    strings: StringFactory<'c>,
    max_depth: usize,
    depth: usize,
    scratch: Vec<u8>,
}

impl<'c, R: Read> BinaryReader<'c, R> {
    pub(crate) fn new(input: R, strings: StringFactory<'c>, config: &CodecConfig) -> Self {
        BinaryReader {
            input,
            strings,
            max_depth: config.max_depth,
            depth: 0,
            scratch: Vec::new(),
        }
    }

    pub(crate) fn into_inner(self) -> R {
        self.input
    }

    /// The next value, or `None` if the input ends cleanly before a tag
    pub(crate) fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        self.depth = 0;
        match self.read_tag()? {
            Some(tag) => self.read_tagged(tag).map(Some),
            None => Ok(None),
        }
    }

    fn read_tag(&mut self) -> Result<Option<u8>, DecodeError> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
    }

    fn read_value(&mut self) -> Result<Value, DecodeError> {
        match self.read_tag()? {
            Some(tag) => self.read_tagged(tag),
            None => Err(DecodeError::UnexpectedEof),
        }
    }

    fn read_tagged(&mut self, tag: u8) -> Result<Value, DecodeError> {
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_INT => Ok(Value::Int(i64::from(read_vint32(&mut self.input)?))),
            TAG_FLOAT => {
                let mut bytes = [0u8; 8];
                self.input.read_exact(&mut bytes)?;
                Ok(Value::Float(f64::from_be_bytes(bytes)))
            }
            TAG_STRING => self.read_string(),
            TAG_LIST => {
                let count = self.read_len()?;
                self.enter()?;
                let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    items.push(self.read_value()?);
                }
                self.depth -= 1;
                Ok(Value::List(items))
            }
            TAG_DICT => {
                let count = self.read_len()?;
                self.enter()?;
                let mut dict = Dict::with_capacity(count.min(PREALLOC_LIMIT));
                for _ in 0..count {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    dict.insert(key, value);
                }
                self.depth -= 1;
                Ok(Value::Dict(dict))
            }
            other => Err(DecodeError::InvalidTag(other)),
        }
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::malformed(
                Production::NestingTooDeep,
                format!("at depth {}", self.depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = read_vint(&mut self.input)?;
        let len = i32::try_from(len).map_err(|_| DecodeError::IntegerOverflow)?;
        usize::try_from(len).map_err(|_| DecodeError::InvalidLength(i64::from(len)))
    }

    fn read_string(&mut self) -> Result<Value, DecodeError> {
        let len = self.read_len()?;
        self.scratch.clear();
        (&mut self.input)
            .take(len as u64)
            .read_to_end(&mut self.scratch)?;
        if self.scratch.len() < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let s = std::str::from_utf8(&self.scratch).map_err(|_| DecodeError::InvalidUtf8)?;
        Ok(Value::String(self.strings.make(s)))
    }
}
