//! Text records and record lines
//!
//! Batch input arrives as lines of `key<TAB>value`, where the value is a
//! text-encoded record. Most stages only route or sort records, so a
//! `TextRecord` keeps the text and decodes it only when someone looks inside.

use crate::text::{self, TextDecoder};
use recwire_core::{DecodeError, EncodeError, Value};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead};
use std::sync::OnceLock;

/// A record held as text, decoded on first access
///
/// Equality, ordering and hashing use the text form, so records sort and
/// group without being decoded.
#[derive(Debug, Clone)]
pub struct TextRecord {
    text: String,
    value: OnceLock<Value>,
}

impl TextRecord {
    /// Wrap serialized text; nothing is decoded yet
    pub fn from_text(text: impl Into<String>) -> Self {
        TextRecord {
            text: text.into(),
            value: OnceLock::new(),
        }
    }

    /// Encode a value now, keeping the value as the decoded form
    pub fn from_value(value: Value) -> Result<Self, EncodeError> {
        let text = text::encode(&value)?;
        Ok(TextRecord {
            text,
            value: OnceLock::from(value),
        })
    }

    /// The serialized text
    pub fn serialized(&self) -> &str {
        &self.text
    }

    pub fn is_decoded(&self) -> bool {
        self.value.get().is_some()
    }

    /// The decoded value, decoding and caching it on first call
    pub fn value(&self) -> Result<&Value, DecodeError> {
        self.decode_with(&TextDecoder::new())
    }

    /// Like [`value`](Self::value), decoding with a specific decoder
    pub fn decode_with(&self, decoder: &TextDecoder<'_>) -> Result<&Value, DecodeError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let decoded = decoder.decode_str(&self.text)?;
        Ok(self.value.get_or_init(|| decoded))
    }

    pub fn into_value(self) -> Result<Value, DecodeError> {
        match self.value.into_inner() {
            Some(value) => Ok(value),
            None => text::decode(&self.text),
        }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl PartialEq for TextRecord {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TextRecord {}

impl PartialOrd for TextRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Hash for TextRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for TextRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One `key<SEP>record` input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLine {
    pub key: String,
    pub record: TextRecord,
}

impl RecordLine {
    /// Split a line at the first `separator`
    ///
    /// A line without the separator is all record, with an empty key.
    pub fn parse(line: &str, separator: char) -> Self {
        let (key, text) = line.split_once(separator).unwrap_or(("", line));
        RecordLine {
            key: key.to_string(),
            record: TextRecord::from_text(text),
        }
    }

    /// Render the line with `separator` between key and record
    ///
    /// An empty key renders as the bare record.
    pub fn to_line(&self, separator: char) -> String {
        if self.key.is_empty() {
            self.record.serialized().to_string()
        } else {
            format!("{}{}{}", self.key, separator, self.record)
        }
    }
}

impl fmt::Display for RecordLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.record)
        } else {
            write!(f, "{}\t{}", self.key, self.record)
        }
    }
}

/// Iterator over the record lines of a reader
///
/// Yields `(line_number, line)` with 1-based line numbers. Blank lines are
/// skipped but still counted.
pub struct RecordReader<R> {
    lines: io::Lines<R>,
    separator: Option<char>,
    line_no: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Lines of `key<separator>record`
    pub fn new(reader: R, separator: char) -> Self {
        RecordReader {
            lines: reader.lines(),
            separator: Some(separator),
            line_no: 0,
        }
    }

    /// Lines holding only a record; every key is empty
    pub fn unkeyed(reader: R) -> Self {
        RecordReader {
            lines: reader.lines(),
            separator: None,
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<(usize, RecordLine)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = match self.separator {
                Some(separator) => RecordLine::parse(&line, separator),
                None => RecordLine {
                    key: String::new(),
                    record: TextRecord::from_text(line),
                },
            };
            return Some(Ok((self.line_no, record)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_decode() {
        let record = TextRecord::from_text(r#"{"n":1}"#);
        assert!(!record.is_decoded());
        assert_eq!(record.value().unwrap().get("n"), Some(&Value::Int(1)));
        assert!(record.is_decoded());
    }

    #[test]
    fn test_decode_error_is_not_cached() {
        let record = TextRecord::from_text("{broken");
        assert!(record.value().is_err());
        assert!(!record.is_decoded());
        assert!(record.into_value().is_err());
    }

    #[test]
    fn test_from_value_encodes_eagerly() {
        let record = TextRecord::from_value(Value::from(vec![1, 2])).unwrap();
        assert!(record.is_decoded());
        assert_eq!(record.serialized(), "[1, 2]");
        assert_eq!(record.into_value().unwrap(), Value::from(vec![1, 2]));

        assert!(TextRecord::from_value(Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_ordering_uses_text() {
        let mut records = vec![
            TextRecord::from_text("[2]"),
            TextRecord::from_text("[10]"),
            TextRecord::from_text("\"a\""),
        ];
        records.sort();
        let texts: Vec<&str> = records.iter().map(TextRecord::serialized).collect();
        assert_eq!(texts, vec!["\"a\"", "[10]", "[2]"]);

        // Same value, different spelling: different records
        assert_ne!(TextRecord::from_text("[1,2]"), TextRecord::from_text("[1, 2]"));
    }

    #[test]
    fn test_parse_line() {
        let line = RecordLine::parse("user-7\t{\"a\":\"x\ty\"}", '\t');
        assert_eq!(line.key, "user-7");
        assert_eq!(line.record.serialized(), "{\"a\":\"x\ty\"}");
        assert_eq!(line.to_string(), "user-7\t{\"a\":\"x\ty\"}");

        let bare = RecordLine::parse("[1]", '\t');
        assert_eq!(bare.key, "");
        assert_eq!(bare.to_string(), "[1]");

        let custom = RecordLine::parse("k|null", '|');
        assert_eq!(custom.to_line('|'), "k|null");
        assert_eq!(custom.record.value().unwrap(), &Value::Null);
    }

    #[test]
    fn test_reader_skips_blank_lines_and_counts_them() {
        let input = "a\t1\n\n   \nb\t[2]\r\n";
        let lines: Vec<(usize, RecordLine)> = RecordReader::new(input.as_bytes(), '\t')
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, 1);
        assert_eq!(lines[1].0, 4);
        assert_eq!(lines[1].1.key, "b");
        assert_eq!(lines[1].1.record.serialized(), "[2]");
    }

    #[test]
    fn test_unkeyed_reader_keeps_tabs_in_record() {
        let input = "{\"a\":\"x\ty\"}\n";
        let lines: Vec<(usize, RecordLine)> = RecordReader::unkeyed(input.as_bytes())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines[0].1.key, "");
        assert_eq!(lines[0].1.record.serialized(), "{\"a\":\"x\ty\"}");
    }

    #[test]
    fn test_decode_with_custom_decoder() {
        use crate::config::CodecConfig;
        use recwire_core::InternCache;

        let cache = InternCache::new();
        let shallow = TextDecoder::with_cache(&cache).config(CodecConfig::new().with_max_depth(1));
        let record = TextRecord::from_text("[[1]]");
        assert!(record.decode_with(&shallow).is_err());
        assert!(record.value().is_ok());
    }
}
