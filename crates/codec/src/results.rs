//! Merging partial results
//!
//! Each task of a batch job may leave behind a dict of results, stored as a
//! binary file. `ResultCollector` folds those partial dicts into one dict in
//! which every key maps to the list of values the partials gave it, in the
//! order the partials arrived.
//!
//! ```text
//! {"rows": 10, "errors": 1}  +  {"rows": 7}   =>   {"rows": [10, 7], "errors": [1]}
//! ```

use crate::binary::BinaryDecoder;
use crate::config::CodecConfig;
use indexmap::IndexMap;
use recwire_core::{DecodeError, Dict, Value};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Extension of result files picked up by `collect_dir`
pub const RESULT_FILE_EXTENSION: &str = "bin";

/// Error while collecting partial results
#[derive(Debug)]
pub enum CollectError {
    /// A partial result was not a dict (carries its type name)
    NotADict(&'static str),
    /// A result file did not decode
    Decode { path: PathBuf, source: DecodeError },
    /// A result file or directory could not be read
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::NotADict(found) => {
                write!(f, "Partial result must be a dict, found {}", found)
            }
            CollectError::Decode { path, source } => {
                write!(f, "Failed to decode '{}': {}", path.display(), source)
            }
            CollectError::Io { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::NotADict(_) => None,
            CollectError::Decode { source, .. } => Some(source),
            CollectError::Io { source, .. } => Some(source),
        }
    }
}

/// Accumulates partial result dicts
#[derive(Debug, Default)]
pub struct ResultCollector {
    merged: IndexMap<Value, Vec<Value>>,
    partials: usize,
    config: CodecConfig,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode result files with `config` instead of the defaults
    pub fn with_config(config: CodecConfig) -> Self {
        ResultCollector {
            config,
            ..Self::default()
        }
    }

    /// Merge one partial result
    pub fn add(&mut self, partial: Value) -> Result<(), CollectError> {
        let dict = match partial {
            Value::Dict(dict) => dict,
            other => return Err(CollectError::NotADict(other.type_name())),
        };
        for (key, value) in dict {
            self.merged.entry(key).or_default().push(value);
        }
        self.partials += 1;
        Ok(())
    }

    /// Decode a binary partial result and merge it
    pub fn add_file(&mut self, path: &Path) -> Result<(), CollectError> {
        let file = File::open(path).map_err(|source| CollectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let partial = BinaryDecoder::with_config(self.config)
            .decode_from(BufReader::new(file))
            .map_err(|source| CollectError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        self.add(partial)?;
        trace!(path = %path.display(), keys = self.merged.len(), "merged result file");
        Ok(())
    }

    /// Merge every file in `paths`, in order
    pub fn collect_files<I, P>(&mut self, paths: I) -> Result<(), CollectError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.add_file(path.as_ref())?;
        }
        Ok(())
    }

    /// Merge every `*.bin` file directly inside `dir`, in file name order
    ///
    /// Returns the number of files merged. Subdirectories are ignored.
    pub fn collect_dir(&mut self, dir: &Path) -> Result<usize, CollectError> {
        let io_error = |source| CollectError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let is_result = path
                .extension()
                .is_some_and(|ext| ext == RESULT_FILE_EXTENSION);
            if is_result && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        self.collect_files(&files)?;
        Ok(files.len())
    }

    /// Number of partial results merged so far
    pub fn partial_count(&self) -> usize {
        self.partials
    }

    /// The merged dict: every key maps to a list of its values
    pub fn finish(self) -> Value {
        let dict: Dict = self
            .merged
            .into_iter()
            .map(|(key, values)| (key, Value::List(values)))
            .collect();
        Value::Dict(dict)
    }
}
