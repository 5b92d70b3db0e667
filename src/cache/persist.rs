//! Persistent cache tier abstraction
//!
//! The persistent tier survives restarts. Every operation may fail (disk
//! full, database locked, storage disabled); callers treat failures as a
//! cache miss and carry on with the memory tier.

use super::store::CacheEntry;
use crate::error::CacheError;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Key/value storage for cache entries that outlive the process.
pub trait PersistentStore: Send {
    /// Load an entry regardless of freshness
    fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or replace an entry
    fn save(&self, entry: &CacheEntry) -> Result<()>;

    /// Delete one entry; returns whether it existed
    fn remove(&self, key: &str) -> Result<bool>;

    /// Delete every entry whose key contains `pattern`
    fn remove_matching(&self, pattern: &str) -> Result<usize>;

    /// Delete entries whose key contains `pattern` and were written before `millis`
    fn remove_matching_written_before(&self, pattern: &str, millis: i64) -> Result<usize>;

    /// Number of stored entries, fresh or not
    fn len(&self) -> Result<usize>;

    /// Keep the `keep` most recently written entries, delete the rest
    fn evict_oldest(&self, keep: usize) -> Result<usize>;

    /// Delete everything
    fn clear(&self) -> Result<usize>;

    /// Summary for `cache status`
    fn stats(&self, now_millis: i64) -> Result<PersistentStats>;
}

/// Statistics about the persistent tier
#[derive(Debug, Default, Clone)]
pub struct PersistentStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

#[cfg(test)]
pub use memory::MemoryPersistence;
