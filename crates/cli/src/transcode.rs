//! Record transcoding
//!
//! The operations behind the CLI subcommands. Each one reads from a
//! `BufRead` and writes to a `Write`, so they run the same on files, pipes
//! and in-memory buffers.
//!
//! Text side: one record per line, optionally `key<SEP>record`.
//! Binary side: concatenated binary values, or one hex-encoded value per
//! line with `--hex`. A keyed record travels in binary as the two-element
//! list `[key, value]`.

use crate::config::{CliConfig, ErrorPolicy};
use crate::error::CliError;
use recwire_codec::{
    BinaryDecoder, RecordLine, RecordReader, ResultCollector, TextDecoder, TextRecord, binary,
    text,
};
use recwire_core::{DecodeError, Value};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Counts reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub skipped: usize,
}

/// Result of `check_records`
#[derive(Debug, Default)]
pub struct CheckReport {
    pub records: usize,
    pub failures: Vec<(usize, DecodeError)>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply the error policy to a failed record
fn recover(policy: ErrorPolicy, err: CliError, summary: &mut Summary) -> Result<(), CliError> {
    match policy {
        ErrorPolicy::Abort => Err(err),
        ErrorPolicy::Skip => {
            warn!("skipping record: {}", err);
            summary.skipped += 1;
            Ok(())
        }
    }
}

fn text_lines<R: BufRead>(input: R, config: &CliConfig, keyed: bool) -> RecordReader<R> {
    if keyed {
        RecordReader::new(input, config.records.separator)
    } else {
        RecordReader::unkeyed(input)
    }
}

/// Text records in, binary records out
pub fn encode_records<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    config: &CliConfig,
    keyed: bool,
    hex: bool,
) -> Result<Summary, CliError> {
    let decoder = TextDecoder::with_config(config.codec);
    let policy = config.records.on_error;
    let mut summary = Summary::default();

    for item in text_lines(input, config, keyed) {
        let (line, record_line) = item?;
        let RecordLine { key, record } = record_line;

        if let Err(source) = record.decode_with(&decoder).map(|_| ()) {
            recover(policy, CliError::Decode { line, source }, &mut summary)?;
            continue;
        }
        let value = record
            .into_value()
            .map_err(|source| CliError::Decode { line, source })?;
        let value = if keyed {
            Value::List(vec![Value::from(key), value])
        } else {
            value
        };

        let bytes = match binary::encode(&value) {
            Ok(bytes) => bytes,
            Err(source) => {
                recover(policy, CliError::Encode { line, source }, &mut summary)?;
                continue;
            }
        };
        if hex {
            writeln!(out, "{}", hex::encode(&bytes))?;
        } else {
            out.write_all(&bytes)?;
        }
        summary.records += 1;
    }

    out.flush()?;
    info!(
        records = summary.records,
        skipped = summary.skipped,
        "encoded records"
    );
    Ok(summary)
}

/// Render one decoded binary value as an output line
fn to_text_line(
    value: Value,
    keyed: bool,
    separator: char,
    line: usize,
) -> Result<String, CliError> {
    if !keyed {
        return text::encode(&value).map_err(|source| CliError::Encode { line, source });
    }
    let (key, value) = match value {
        Value::List(items) if items.len() == 2 => {
            let mut items = items.into_iter();
            match (items.next(), items.next()) {
                (Some(Value::String(key)), Some(value)) => (key.to_string(), value),
                _ => return Err(keyed_shape_error(line)),
            }
        }
        _ => return Err(keyed_shape_error(line)),
    };
    let record =
        TextRecord::from_value(value).map_err(|source| CliError::Encode { line, source })?;
    Ok(RecordLine { key, record }.to_line(separator))
}

fn keyed_shape_error(line: usize) -> CliError {
    CliError::Invalid {
        line,
        message: "keyed record must be a [key, value] list with a string key".to_string(),
    }
}

/// Binary records in, text records out
///
/// Raw binary input cannot resynchronize after a bad value, so a decode
/// failure there always stops the run. Hex input is line based and follows
/// the configured error policy.
pub fn decode_records<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    config: &CliConfig,
    keyed: bool,
    hex: bool,
) -> Result<Summary, CliError> {
    let decoder = BinaryDecoder::with_config(config.codec);
    let policy = config.records.on_error;
    let separator = config.records.separator;
    let mut summary = Summary::default();

    if hex {
        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let digits = line.trim();
            if digits.is_empty() {
                continue;
            }
            let bytes = match hex::decode(digits) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let err = CliError::Invalid {
                        line: line_no,
                        message: format!("invalid hex: {}", e),
                    };
                    recover(policy, err, &mut summary)?;
                    continue;
                }
            };
            let rendered = decoder
                .decode(&bytes)
                .map_err(|source| CliError::Decode {
                    line: line_no,
                    source,
                })
                .and_then(|value| to_text_line(value, keyed, separator, line_no));
            match rendered {
                Ok(text_line) => {
                    writeln!(out, "{}", text_line)?;
                    summary.records += 1;
                }
                Err(err) => recover(policy, err, &mut summary)?,
            }
        }
    } else {
        let mut stream = decoder.stream(input);
        let mut index = 0;
        loop {
            index += 1;
            let value = match stream.next_value() {
                Ok(Some(value)) => value,
                Ok(None) => break,
                Err(source) => {
                    return Err(CliError::Decode {
                        line: index,
                        source,
                    });
                }
            };
            match to_text_line(value, keyed, separator, index) {
                Ok(text_line) => {
                    writeln!(out, "{}", text_line)?;
                    summary.records += 1;
                }
                Err(err) => recover(policy, err, &mut summary)?,
            }
        }
    }

    out.flush()?;
    info!(
        records = summary.records,
        skipped = summary.skipped,
        "decoded records"
    );
    Ok(summary)
}

/// Decode every text record and report the ones that fail
pub fn check_records<R: BufRead>(
    input: R,
    config: &CliConfig,
    keyed: bool,
) -> Result<CheckReport, CliError> {
    let decoder = TextDecoder::with_config(config.codec);
    let mut report = CheckReport::default();
    for item in text_lines(input, config, keyed) {
        let (line, record_line) = item?;
        report.records += 1;
        if let Err(e) = record_line.record.decode_with(&decoder) {
            debug!(line, "record failed to decode");
            report.failures.push((line, e));
        }
    }
    info!(
        records = report.records,
        failures = report.failures.len(),
        "checked records"
    );
    Ok(report)
}

/// Merge binary partial results and write the merged dict as text
///
/// A directory contributes every result file inside it.
pub fn merge<W: Write>(
    paths: &[PathBuf],
    out: &mut W,
    config: &CliConfig,
) -> Result<Summary, CliError> {
    let mut collector = ResultCollector::with_config(config.codec);
    for path in paths {
        if path.is_dir() {
            let files = collector.collect_dir(path)?;
            debug!(dir = %path.display(), files, "merged result directory");
        } else {
            collector.add_file(path)?;
        }
    }
    let summary = Summary {
        records: collector.partial_count(),
        skipped: 0,
    };
    let merged = collector.finish();
    text::write_to(&merged, &mut *out).map_err(|source| CliError::Encode { line: 0, source })?;
    writeln!(out)?;
    out.flush()?;
    info!(partials = summary.records, "merged results");
    Ok(summary)
}
