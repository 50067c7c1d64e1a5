//! Recwire Core: the dynamic record value shared by every recwire codec
//!
//! Records in a batch pipeline are trees of loosely typed values. This crate
//! defines that tree and the pieces both wire formats lean on.
//!
//! # Modules
//!
//! - `value`: The `Value` enum (Null, Bool, Int, Float, String, List, Dict)
//! - `shared_string`: Immutable reference-counted strings held by values
//! - `intern`: Weak-entry intern cache that deduplicates decoded strings
//! - `host`: `serde::Serialize` types to `Value`
//! - `error`: `DecodeError` and `EncodeError`

pub mod error;
pub mod host;
pub mod intern;
pub mod shared_string;
pub mod value;

pub use error::{DecodeError, EncodeError, Production};
pub use host::to_value;
pub use intern::InternCache;
pub use shared_string::SharedString;
pub use value::{Dict, Value};
