//! String Intern Cache
//!
//! Decoding millions of small records produces the same strings over and
//! over: field names, status words, repeated ids. The intern cache hands out
//! one `SharedString` per distinct content for as long as someone holds it.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           InternCache (one Mutex)            │
//! ├──────────────────────────────────────────────┤
//! │ entries: IndexSet<WeakKey>                   │
//! │                                              │
//! │   hash("name") ──▶ Arc<str> ◀── Value A      │
//! │   hash("id")   ──▶ Arc<str> ◀── Value A, B   │
//! │   hash("old")  ──▶ (dead)                    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! An entry is the content hash plus a weak reference to the string itself, so
//! each interned string is a single allocation shared by the table and its
//! users. Lookups compare content through the weak reference.
//!
//! The table only holds weak references, so interned strings are freed as soon
//! as the last value using them is dropped. Dead entries are swept when the
//! table has doubled since the last sweep, which keeps the table proportional
//! to the live population and makes the sweep cost amortized O(1) per insert.
//!
//! Interned strings are independent allocations, never views into the decode
//! buffer, so nothing a caller passes in is retained.

use crate::shared_string::SharedString;
use indexmap::{Equivalent, IndexSet};
use std::hash::{BuildHasher, Hash, Hasher, RandomState};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

/// Tables smaller than this are never swept
const MIN_SWEEP_THRESHOLD: usize = 1024;

/// Process-wide cache used by the codecs unless one is supplied
static GLOBAL: LazyLock<InternCache> = LazyLock::new(InternCache::new);

/// The process-wide intern cache
pub fn global() -> &'static InternCache {
    &GLOBAL
}

/// Thread-safe string intern cache with weak entries
#[derive(Debug)]
pub struct InternCache {
    table: Mutex<InternTable>,
}

#[derive(Debug)]
struct InternTable {
    entries: IndexSet<WeakKey>,
    hasher: RandomState,
    /// Sweep dead entries once the table reaches this size
    sweep_at: usize,
    min_sweep_at: usize,
}

impl InternCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::with_sweep_threshold(MIN_SWEEP_THRESHOLD)
    }

    /// Create an empty cache that starts sweeping dead entries at `threshold`
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        InternCache {
            table: Mutex::new(InternTable {
                entries: IndexSet::new(),
                hasher: RandomState::new(),
                sweep_at: threshold,
                min_sweep_at: threshold,
            }),
        }
    }

    /// Return the shared instance for `content`, creating it on a miss
    ///
    /// The content is copied into a fresh allocation on a miss; a hit
    /// allocates nothing.
    pub fn intern(&self, content: &str) -> SharedString {
        if content.is_empty() {
            return SharedString::empty();
        }
        let mut table = self.lock();
        if let Some(shared) = table.lookup(content) {
            return shared;
        }
        let shared = SharedString::from_arc(Arc::from(content));
        table.insert(content, &shared);
        shared
    }

    /// Like [`intern`](Self::intern), taking an owned string
    ///
    /// A hit drops `content` without allocating.
    pub fn intern_owned(&self, content: String) -> SharedString {
        if content.is_empty() {
            return SharedString::empty();
        }
        let mut table = self.lock();
        if let Some(shared) = table.lookup(&content) {
            return shared;
        }
        let shared = SharedString::from_arc(Arc::from(content));
        table.insert(&shared, &shared);
        shared
    }

    /// True if `content` currently has a live interned instance
    pub fn contains(&self, content: &str) -> bool {
        self.lock().lookup(content).is_some()
    }

    /// Number of table entries, including dead ones not yet swept
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Number of entries whose string is still reachable
    pub fn live_count(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.weak.strong_count() > 0)
            .count()
    }

    /// Drop every dead entry now; returns how many were removed
    pub fn purge(&self) -> usize {
        self.lock().sweep()
    }

    fn lock(&self) -> MutexGuard<'_, InternTable> {
        // The table stays consistent even if a holder panicked mid-call
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InternCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A table entry: the content hash and a weak reference to the interned string
///
/// Two entries are equal only if they point at the same allocation.
#[derive(Debug)]
struct WeakKey {
    hash: u64,
    weak: Weak<str>,
}

impl Hash for WeakKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for WeakKey {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak, &other.weak)
    }
}

impl Eq for WeakKey {}

/// Borrowed lookup key matching the live entry with the same content
struct ContentKey<'a> {
    hash: u64,
    content: &'a str,
}

impl Hash for ContentKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl Equivalent<WeakKey> for ContentKey<'_> {
    fn equivalent(&self, key: &WeakKey) -> bool {
        self.hash == key.hash
            && key
                .weak
                .upgrade()
                .is_some_and(|interned| *interned == *self.content)
    }
}

impl InternTable {
    fn content_key<'a>(&self, content: &'a str) -> ContentKey<'a> {
        ContentKey {
            hash: self.hasher.hash_one(content),
            content,
        }
    }

    fn lookup(&self, content: &str) -> Option<SharedString> {
        self.entries
            .get(&self.content_key(content))
            .and_then(|entry| entry.weak.upgrade())
            .map(SharedString::from_arc)
    }

    fn insert(&mut self, content: &str, shared: &SharedString) {
        if self.entries.len() >= self.sweep_at {
            let before = self.entries.len();
            let removed = self.sweep();
            debug!(
                before,
                removed,
                live = self.entries.len(),
                "swept dead intern cache entries"
            );
        }
        let hash = self.hasher.hash_one(content);
        self.entries.insert(WeakKey {
            hash,
            weak: shared.downgrade(),
        });
    }

    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.weak.strong_count() > 0);
        self.sweep_at = (self.entries.len() * 2).max(self.min_sweep_at);
        before - self.entries.len()
    }
}
