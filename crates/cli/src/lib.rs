//! Recwire CLI library
//!
//! Configuration and the transcoding operations behind the `recwire` binary.

pub mod config;
pub mod error;
pub mod transcode;

pub use config::{CliConfig, ErrorPolicy, RecordsConfig};
pub use error::CliError;
pub use transcode::{CheckReport, Summary};
