//! SharedString - Immutable, Reference-Counted String
//!
//! Every string held by a `Value` is a `SharedString`. Cloning one is a
//! reference-count bump, so decoded records that repeat the same text (field
//! names, enum-like values) can point at a single allocation handed out by the
//! intern cache.
//!
//! A SharedString is always its own heap allocation. It never borrows from the
//! buffer it was decoded out of, so a small string kept from a large input does
//! not keep the input alive.
//!
//! # Identity vs equality
//!
//! `==` compares content. Use [`SharedString::ptr_eq`] to ask whether two
//! handles are the *same* instance (what interning guarantees).

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, LazyLock, Weak};

/// The one canonical empty string
static EMPTY: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from(""));

/// Immutable string shared by reference count
#[derive(Clone)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a fresh (not interned) shared string
    ///
    /// Empty content always maps to the canonical empty instance.
    pub fn new(s: &str) -> Self {
        if s.is_empty() {
            Self::empty()
        } else {
            SharedString(Arc::from(s))
        }
    }

    /// The canonical empty string
    pub fn empty() -> Self {
        SharedString(Arc::clone(&EMPTY))
    }

    /// Get string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if both handles point at the same allocation
    pub fn ptr_eq(a: &SharedString, b: &SharedString) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Number of live handles to this allocation
    pub fn strong_count(this: &SharedString) -> usize {
        Arc::strong_count(&this.0)
    }

    pub(crate) fn from_arc(arc: Arc<str>) -> Self {
        SharedString(arc)
    }

    pub(crate) fn downgrade(&self) -> Weak<str> {
        Arc::downgrade(&self.0)
    }
}

impl PartialEq for SharedString {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SharedString {}

impl PartialEq<str> for SharedString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SharedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for SharedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl PartialOrd for SharedString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SharedString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Deref for SharedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SharedString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedString({:?})", self.as_str())
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        if s.is_empty() {
            SharedString::empty()
        } else {
            SharedString(Arc::from(s))
        }
    }
}

impl From<char> for SharedString {
    fn from(c: char) -> Self {
        let mut buf = [0u8; 4];
        SharedString::new(c.encode_utf8(&mut buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_as_str() {
        let s = SharedString::new("Hello, shared!");
        assert_eq!(s.as_str(), "Hello, shared!");
        assert_eq!(s.len(), 14);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_empty_is_canonical() {
        let a = SharedString::empty();
        let b = SharedString::new("");
        let c = SharedString::from(String::new());
        assert!(SharedString::ptr_eq(&a, &b));
        assert!(SharedString::ptr_eq(&b, &c));
        assert!(a.is_empty());
    }

    #[test]
    fn test_clone_shares_allocation() {
        let s1 = SharedString::new("test");
        let s2 = s1.clone();
        assert!(SharedString::ptr_eq(&s1, &s2));
        assert_eq!(SharedString::strong_count(&s1), 2);
    }

    #[test]
    fn test_equality_is_by_content() {
        let s1 = SharedString::new("test");
        let s2 = SharedString::from("test".to_string());
        let s3 = SharedString::new("different");

        assert_eq!(s1, s2);
        assert!(!SharedString::ptr_eq(&s1, &s2));
        assert_ne!(s1, s3);
        assert_eq!(s1, "test");
    }

    #[test]
    fn test_ordering_follows_content() {
        let mut items = vec![
            SharedString::new("pear"),
            SharedString::new("apple"),
            SharedString::new("fig"),
        ];
        items.sort();
        let sorted: Vec<&str> = items.iter().map(|s| s.as_str()).collect();
        assert_eq!(sorted, vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_debug_and_display() {
        let s = SharedString::new("debug");
        assert_eq!(format!("{:?}", s), "SharedString(\"debug\")");
        assert_eq!(format!("{}", s), "debug");
    }

    #[test]
    fn test_unicode() {
        let s = SharedString::new("Hello, 世界! 🦀");
        assert_eq!(s.as_str(), "Hello, 世界! 🦀");
        assert!(s.len() > 10); // UTF-8 bytes, not chars
    }

    #[test]
    fn test_from_char() {
        assert_eq!(SharedString::from('é'), "é");
    }
}
