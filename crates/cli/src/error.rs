//! CLI error type

use recwire_codec::CollectError;
use recwire_core::{DecodeError, EncodeError};
use std::fmt;
use std::io;

/// Error from a CLI operation
///
/// `line` is the 1-based input line, or the record index for raw binary
/// input.
#[derive(Debug)]
pub enum CliError {
    Io(io::Error),
    Config(String),
    Decode { line: usize, source: DecodeError },
    Encode { line: usize, source: EncodeError },
    Collect(CollectError),
    Invalid { line: usize, message: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Decode { line, source } => write!(f, "line {}: {}", line, source),
            CliError::Encode { line, source } => write!(f, "line {}: {}", line, source),
            CliError::Collect(e) => write!(f, "{}", e),
            CliError::Invalid { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Decode { source, .. } => Some(source),
            CliError::Encode { source, .. } => Some(source),
            CliError::Collect(e) => Some(e),
            CliError::Config(_) | CliError::Invalid { .. } => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<CollectError> for CliError {
    fn from(e: CollectError) -> Self {
        CliError::Collect(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recwire_core::Production;
    use std::error::Error;

    #[test]
    fn test_line_errors_name_the_line() {
        let err = CliError::Decode {
            line: 4,
            source: DecodeError::malformed(Production::Array, "at ...x..."),
        };
        assert_eq!(err.to_string(), "line 4: Error invalid array at ...x...");
        assert!(err.source().is_some());

        let err = CliError::Invalid {
            line: 2,
            message: "bad shape".to_string(),
        };
        assert_eq!(err.to_string(), "line 2: bad shape");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_error_is_its_message() {
        let err = CliError::Config("Failed to parse config: oops".to_string());
        assert_eq!(err.to_string(), "Failed to parse config: oops");
        assert!(err.source().is_none());
    }
}
