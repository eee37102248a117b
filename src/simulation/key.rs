//! Vertex identity for the simulation graph

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::SimError;

/// Unique, immutable identifier of a graph vertex
///
/// Equality and hashing use the wrapped integer only. Keys have no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u64);

impl Key {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl TryFrom<Option<u64>> for Key {
    type Error = SimError;

    fn try_from(id: Option<u64>) -> Result<Self, Self::Error> {
        id.map(Key)
            .ok_or_else(|| SimError::InvalidArgument("key requires an id".to_string()))
    }
}

impl FromStr for Key {
    type Err = SimError;

    /// Accepts both `key:<id>` and a bare `<id>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("key:").unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(Key)
            .map_err(|_| SimError::InvalidArgument(format!("'{}' is not a key", s)))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key:{}", self.0)
    }
}

/// Monotonic id counter shared by everything that mints keys
///
/// Starts at 0. Ids are never reset or recycled.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter value, then increments it
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_key(&self) -> Key {
        Key(self.next_id())
    }

    /// The id the next call to `next_id` will hand out
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
