//! Decoder configuration
//!
//! ```rust,ignore
//! use recwire_codec::{CodecConfig, TextDecoder};
//!
//! let config = CodecConfig::new().with_max_depth(64).without_interning();
//! let value = TextDecoder::with_config(config).decode_str("[[1]]")?;
//! ```

use recwire_core::{InternCache, SharedString};
use serde::Deserialize;

/// Default bound on list/dict nesting
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Settings shared by the text and binary decoders
///
/// Deserializes from the `[codec]` table of a TOML config file; missing keys
/// keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Lists and dicts nested deeper than this are rejected
    pub max_depth: usize,
    /// Deduplicate decoded strings through the intern cache
    ///
    /// When off, every non-empty string is its own allocation. The empty
    /// string is canonical either way.
    pub intern_strings: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            intern_strings: true,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn without_interning(mut self) -> Self {
        self.intern_strings = false;
        self
    }
}

/// Where decoded strings come from
#[derive(Clone, Copy)]
pub(crate) struct StringFactory<'c> {
    cache: &'c InternCache,
    intern: bool,
}

impl<'c> StringFactory<'c> {
    pub(crate) fn new(cache: &'c InternCache, config: &CodecConfig) -> Self {
        StringFactory {
            cache,
            intern: config.intern_strings,
        }
    }

    pub(crate) fn make(&self, content: &str) -> SharedString {
        if self.intern {
            self.cache.intern(content)
        } else {
            SharedString::new(content)
        }
    }
}
