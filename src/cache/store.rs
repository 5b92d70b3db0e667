//! Two-tier cache store
//!
//! The memory tier receives every entry. Entries whose TTL is longer than
//! [`PERSISTENT_THRESHOLD`] are also written to the persistent tier, which is
//! capped at [`PERSISTENT_CAP`] entries (oldest evicted first). Persistent
//! entries are promoted back into memory the first time they are read.
//!
//! Persistent-tier failures are logged and dropped; the memory tier stays
//! authoritative.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::task::JoinHandle;

use super::clock::{Clock, SystemClock};
use super::persist::{PersistentStats, PersistentStore};
use super::{PERSISTENT_CAP, PERSISTENT_THRESHOLD};

/// A cached response. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub data: serde_json::Value,
    /// Epoch milliseconds of the write
    pub timestamp: i64,
    pub ttl_ms: i64,
}

impl CacheEntry {
    pub fn expires_at(&self) -> i64 {
        self.timestamp.saturating_add(self.ttl_ms)
    }

    pub fn is_fresh(&self, now_millis: i64) -> bool {
        now_millis < self.expires_at()
    }
}

struct Tiers {
    memory: HashMap<String, CacheEntry>,
    persistent: Option<Box<dyn PersistentStore>>,
    last_day_check: Option<NaiveDate>,
}

/// Memory + persistent cache with TTL expiry.
///
/// All operations are synchronous and run to completion under one lock.
pub struct CacheStore {
    tiers: Mutex<Tiers>,
    clock: Arc<dyn Clock>,
    persistent_cap: usize,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

/// Snapshot of both tiers
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub memory_fresh: usize,
    pub persistent: Option<PersistentStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic elsewhere must not take the cache down with it
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CacheStore {
    pub fn new(persistent: Option<Box<dyn PersistentStore>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tiers: Mutex::new(Tiers {
                memory: HashMap::new(),
                persistent,
                last_day_check: None,
            }),
            clock,
            persistent_cap: PERSISTENT_CAP,
            sweeper: Mutex::new(None),
        }
    }

    /// Memory-only store on the system clock
    pub fn memory_only() -> Self {
        Self::new(None, Arc::new(SystemClock))
    }

    /// Override the persistent-tier entry cap
    pub fn with_persistent_cap(mut self, cap: usize) -> Self {
        self.persistent_cap = cap;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fresh entry for `key`, promoting from the persistent tier if needed
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now_millis();
        let mut tiers = lock(&self.tiers);

        match tiers.memory.get(key) {
            Some(entry) if entry.is_fresh(now) => return Some(entry.clone()),
            Some(_) => {
                tiers.memory.remove(key);
            }
            None => {}
        }

        let persistent = tiers.persistent.as_ref()?;
        let entry = match persistent.load(key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("Persistent cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if !entry.is_fresh(now) {
            if let Err(e) = persistent.remove(key) {
                log::debug!("Failed to drop stale persistent entry {}: {}", key, e);
            }
            return None;
        }

        log::debug!("Promoted {} from persistent cache", key);
        tiers.memory.insert(key.to_string(), entry.clone());
        Some(entry)
    }

    /// Fresh cached value for `key`, if it deserializes as `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.get_entry(key)?;
        match serde_json::from_value(entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Cached value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Store `data` under `key` for `ttl`
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("Not caching {}: {}", key, e);
                return;
            }
        };

        let entry = CacheEntry {
            key: key.to_string(),
            data,
            timestamp: self.clock.now_millis(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        };

        let mut tiers = lock(&self.tiers);

        if ttl > PERSISTENT_THRESHOLD
            && let Some(persistent) = tiers.persistent.as_ref()
        {
            self.persist(persistent.as_ref(), &entry);
        }

        tiers.memory.insert(entry.key.clone(), entry);
    }

    fn persist(&self, persistent: &dyn PersistentStore, entry: &CacheEntry) {
        if let Err(e) = persistent.save(entry) {
            log::debug!("Persistent cache write failed for {}: {}", entry.key, e);
            return;
        }

        match persistent.len() {
            Ok(count) if count > self.persistent_cap => {
                match persistent.evict_oldest(self.persistent_cap) {
                    Ok(evicted) => log::debug!("Evicted {} persistent entries", evicted),
                    Err(e) => log::debug!("Persistent cache eviction failed: {}", e),
                }
            }
            Ok(_) => {}
            Err(e) => log::debug!("Persistent cache count failed: {}", e),
        }
    }

    /// Remove a single key from both tiers
    pub fn remove(&self, key: &str) -> bool {
        let mut tiers = lock(&self.tiers);
        let in_memory = tiers.memory.remove(key).is_some();
        let on_disk = match tiers.persistent.as_ref().map(|p| p.remove(key)) {
            Some(Ok(removed)) => removed,
            Some(Err(e)) => {
                log::debug!("Persistent cache remove failed for {}: {}", key, e);
                false
            }
            None => false,
        };
        in_memory || on_disk
    }

    /// Remove every entry whose key contains `pattern`, in both tiers.
    ///
    /// Idempotent; returns the number of entries removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut tiers = lock(&self.tiers);

        let before = tiers.memory.len();
        tiers.memory.retain(|key, _| !key.contains(pattern));
        let mut removed = before - tiers.memory.len();

        if let Some(persistent) = tiers.persistent.as_ref() {
            match persistent.remove_matching(pattern) {
                Ok(count) => removed += count,
                Err(e) => log::debug!("Persistent invalidation of {} failed: {}", pattern, e),
            }
        }

        log::debug!("Invalidated {} entries matching {}", removed, pattern);
        removed
    }

    /// Drop entries matching any of `patterns` written before today.
    ///
    /// Runs at most once per calendar day; returns the number removed.
    pub fn roll_day(&self, patterns: &[&str]) -> usize {
        let today = self.clock.today();
        let mut tiers = lock(&self.tiers);

        if tiers.last_day_check == Some(today) {
            return 0;
        }
        tiers.last_day_check = Some(today);

        let cutoff = self.clock.start_of(today);
        let before = tiers.memory.len();
        tiers.memory.retain(|key, entry| {
            entry.timestamp >= cutoff || !patterns.iter().any(|p| key.contains(p))
        });
        let mut removed = before - tiers.memory.len();

        if let Some(persistent) = tiers.persistent.as_ref() {
            for pattern in patterns {
                match persistent.remove_matching_written_before(pattern, cutoff) {
                    Ok(count) => removed += count,
                    Err(e) => log::debug!("Persistent day reset for {} failed: {}", pattern, e),
                }
            }
        }

        if removed > 0 {
            log::debug!("New day {}: dropped {} entries from earlier days", today, removed);
        }
        removed
    }

    /// Evict expired entries from the memory tier
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let mut tiers = lock(&self.tiers);
        let before = tiers.memory.len();
        tiers.memory.retain(|_, entry| entry.is_fresh(now));
        before - tiers.memory.len()
    }

    /// Start the periodic memory sweep on the current tokio runtime.
    ///
    /// The task holds a weak reference and ends once the store is dropped.
    /// Calling this again replaces the previous sweeper.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration) {
        let store = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let evicted = store.sweep();
                if evicted > 0 {
                    log::debug!("Swept {} expired cache entries", evicted);
                }
            }
        });

        if let Some(previous) = lock(&self.sweeper).replace(handle) {
            previous.abort();
        }
    }

    /// Stop the periodic sweep
    pub fn dispose(&self) {
        if let Some(handle) = lock(&self.sweeper).take() {
            handle.abort();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_millis();
        let tiers = lock(&self.tiers);
        let persistent = tiers
            .persistent
            .as_ref()
            .and_then(|p| p.stats(now).map_err(|e| log::debug!("{}", e)).ok());

        CacheStats {
            memory_entries: tiers.memory.len(),
            memory_fresh: tiers.memory.values().filter(|e| e.is_fresh(now)).count(),
            persistent,
        }
    }

    /// Empty both tiers; returns the number of entries removed
    pub fn clear(&self) -> usize {
        let mut tiers = lock(&self.tiers);
        let mut removed = tiers.memory.len();
        tiers.memory.clear();

        if let Some(persistent) = tiers.persistent.as_ref() {
            match persistent.clear() {
                Ok(count) => removed += count,
                Err(e) => log::debug!("Persistent cache clear failed: {}", e),
            }
        }
        removed
    }
}

impl Drop for CacheStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheTtl;
    use crate::cache::clock::ManualClock;
    use crate::cache::persist::MemoryPersistence;
    use crate::cache::storage::SqliteStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_with(
        persistence: &MemoryPersistence,
        clock: &Arc<ManualClock>,
    ) -> CacheStore {
        CacheStore::new(Some(Box::new(persistence.clone())), clock.clone())
    }

    fn setup() -> (CacheStore, MemoryPersistence, Arc<ManualClock>) {
        let persistence = MemoryPersistence::new();
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));
        (store_with(&persistence, &clock), persistence, clock)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (store, _, _) = setup();
        store.set("GET:api/clientes.php", &vec!["Ana", "Luis"], CacheTtl::GENERAL);

        let cached: Vec<String> = store.get("GET:api/clientes.php").unwrap();
        assert_eq!(cached, vec!["Ana", "Luis"]);
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_wrapping() {
        let (store, _, clock) = setup();
        store.set("GET:api/clientes.php", &json!(["Ana"]), Duration::MAX);

        assert_eq!(store.get_entry("GET:api/clientes.php").unwrap().ttl_ms, i64::MAX);
        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert!(store.get::<serde_json::Value>("GET:api/clientes.php").is_some());
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let (store, _, clock) = setup();
        store.set("GET:api/estadisticas.php", &1, CacheTtl::STATS);

        clock.advance(Duration::from_millis(59_999));
        assert_eq!(store.get::<i32>("GET:api/estadisticas.php"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.get::<i32>("GET:api/estadisticas.php"), None);
    }

    #[test]
    fn test_wrong_shape_is_a_miss() {
        let (store, _, _) = setup();
        store.set("k", &"texto", CacheTtl::GENERAL);
        assert_eq!(store.get::<Vec<i32>>("k"), None);
    }

    #[test]
    fn test_persistent_admission_threshold() {
        let (store, persistence, _) = setup();

        store.set("GET:historical", &1, CacheTtl::HISTORICAL);
        store.set("GET:today", &1, CacheTtl::TODAY);
        assert!(!persistence.contains("GET:historical"));
        assert!(!persistence.contains("GET:today"));

        store.set("GET:products", &1, CacheTtl::PRODUCTS);
        store.set("GET:just-over", &1, Duration::from_millis(300_001));
        assert!(persistence.contains("GET:products"));
        assert!(persistence.contains("GET:just-over"));

        // Memory tier gets everything
        assert_eq!(store.stats().memory_entries, 4);
    }

    #[test]
    fn test_persistent_cap_evicts_oldest() {
        let (store, persistence, clock) = setup();

        for i in 0..50 {
            store.set(&format!("GET:p{:02}", i), &i, CacheTtl::PRODUCTS);
            clock.advance_millis(1);
        }
        assert_eq!(persistence.keys().len(), 50);

        store.set("GET:p50", &50, CacheTtl::PRODUCTS);
        let keys = persistence.keys();
        assert_eq!(keys.len(), 50);
        assert!(!keys.contains(&"GET:p00".to_string()));
        assert!(keys.contains(&"GET:p01".to_string()));
        assert!(keys.contains(&"GET:p50".to_string()));
    }

    #[test]
    fn test_custom_persistent_cap() {
        let persistence = MemoryPersistence::new();
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));
        let store = store_with(&persistence, &clock).with_persistent_cap(2);

        for i in 0..3 {
            store.set(&format!("GET:p{}", i), &i, CacheTtl::GENERAL);
            clock.advance_millis(10);
        }
        assert_eq!(persistence.keys(), vec!["GET:p1", "GET:p2"]);
    }

    #[test]
    fn test_lazy_promotion_after_restart() {
        let persistence = MemoryPersistence::new();
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));

        let first = store_with(&persistence, &clock);
        first.set("GET:api/productos.php", &json!([{"id": 3}]), CacheTtl::PRODUCTS);
        drop(first);

        let second = store_with(&persistence, &clock);
        assert_eq!(second.stats().memory_entries, 0);

        let promoted: serde_json::Value = second.get("GET:api/productos.php").unwrap();
        assert_eq!(promoted, json!([{"id": 3}]));
        assert_eq!(second.stats().memory_entries, 1);

        // Promotion keeps the original write time
        clock.advance(CacheTtl::PRODUCTS);
        assert!(second.get::<serde_json::Value>("GET:api/productos.php").is_none());
    }

    #[test]
    fn test_stale_persistent_entry_is_cleaned_up() {
        let persistence = MemoryPersistence::new();
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));

        store_with(&persistence, &clock).set("GET:p", &1, CacheTtl::PRODUCTS);
        clock.advance(CacheTtl::PRODUCTS);

        let store = store_with(&persistence, &clock);
        assert_eq!(store.get::<i32>("GET:p"), None);
        assert!(!persistence.contains("GET:p"));
    }

    #[test]
    fn test_persistent_failures_degrade_to_memory() {
        let (store, persistence, _) = setup();
        persistence.set_failing(true);

        store.set("GET:api/productos.php", &7, CacheTtl::PRODUCTS);
        assert_eq!(store.get::<i32>("GET:api/productos.php"), Some(7));
        assert_eq!(store.invalidate("productos"), 1);
        assert!(store.stats().persistent.is_none());
        store.clear();
    }

    #[test]
    fn test_invalidate_substring_both_tiers() {
        let (store, persistence, _) = setup();
        store.set("GET:api/facturas.php?estado=pendiente", &1, CacheTtl::PENDING);
        store.set("GET:api/facturas.php", &2, CacheTtl::GENERAL);
        store.set("GET:api/clientes.php", &3, CacheTtl::GENERAL);

        assert_eq!(store.invalidate("facturas.php"), 3); // 2 memory + 1 disk

        assert!(store.get::<i32>("GET:api/facturas.php?estado=pendiente").is_none());
        assert!(store.get::<i32>("GET:api/facturas.php").is_none());
        assert!(!persistence.contains("GET:api/facturas.php"));
        assert_eq!(store.get::<i32>("GET:api/clientes.php"), Some(3));
        assert!(persistence.contains("GET:api/clientes.php"));

        // Idempotent
        assert_eq!(store.invalidate("facturas.php"), 0);
    }

    #[test]
    fn test_remove_single_key() {
        let (store, persistence, _) = setup();
        store.set("GET:a", &1, CacheTtl::GENERAL);
        assert!(store.remove("GET:a"));
        assert!(!persistence.contains("GET:a"));
        assert!(!store.remove("GET:a"));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (store, _, clock) = setup();
        store.set("short", &1, CacheTtl::TODAY);
        store.set("long", &1, CacheTtl::GENERAL);

        assert_eq!(store.sweep(), 0);
        clock.advance(CacheTtl::TODAY);
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.stats().memory_entries, 1);
    }

    #[test]
    fn test_roll_day_drops_previous_day_invoices() {
        let (store, persistence, clock) = setup();
        let two_days = Duration::from_secs(48 * 60 * 60);
        store.set("GET:api/facturas.php", &1, two_days);
        store.set("GET:api/estadisticas.php?fecha=2024-05-01", &1, two_days);
        store.set("GET:api/clientes.php", &1, two_days);

        // Same day: nothing goes
        assert_eq!(store.roll_day(&["facturas", "estadisticas"]), 0);

        clock.advance(Duration::from_secs(13 * 60 * 60)); // 01:00 next day
        store.set("GET:api/facturas.php?estado=pendiente", &2, CacheTtl::PENDING);

        let removed = store.roll_day(&["facturas", "estadisticas"]);
        assert_eq!(removed, 4); // 2 memory + 2 disk

        assert!(store.get::<i32>("GET:api/facturas.php").is_none());
        assert!(!persistence.contains("GET:api/facturas.php"));
        assert_eq!(store.get::<i32>("GET:api/clientes.php"), Some(1));
        assert_eq!(store.get::<i32>("GET:api/facturas.php?estado=pendiente"), Some(2));

        // Once per day
        store.set("GET:api/facturas.php", &3, CacheTtl::GENERAL);
        assert_eq!(store.roll_day(&["facturas"]), 0);
    }

    #[test]
    fn test_clear_both_tiers() {
        let (store, persistence, _) = setup();
        store.set("a", &1, CacheTtl::GENERAL);
        store.set("b", &1, CacheTtl::TODAY);

        assert_eq!(store.clear(), 3);
        assert!(persistence.keys().is_empty());
        assert_eq!(store.stats().memory_entries, 0);
    }

    #[test]
    fn test_with_sqlite_tier() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));
        let sqlite = SqliteStore::open_at(dir.path()).unwrap();
        let store = CacheStore::new(Some(Box::new(sqlite)), clock.clone());

        store.set("GET:api/productos.php", &json!({"n": 1}), CacheTtl::PRODUCTS);
        drop(store);

        let sqlite = SqliteStore::open_at(dir.path()).unwrap();
        let store = CacheStore::new(Some(Box::new(sqlite)), clock);
        let value: serde_json::Value = store.get("GET:api/productos.php").unwrap();
        assert_eq!(value, json!({"n": 1}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_within_one_interval() {
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));
        let store = Arc::new(CacheStore::new(None, clock.clone()));
        store.start_sweeper(Duration::from_secs(60));

        store.set("short", &1, CacheTtl::TODAY);
        clock.advance(CacheTtl::TODAY);
        assert_eq!(store.stats().memory_entries, 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(store.stats().memory_entries, 0);

        store.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_sweeper() {
        let clock = Arc::new(ManualClock::on("2024-05-01", 12));
        let store = Arc::new(CacheStore::new(None, clock.clone()));
        store.start_sweeper(Duration::from_secs(60));
        store.dispose();

        store.set("short", &1, CacheTtl::TODAY);
        clock.advance(CacheTtl::TODAY);

        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(store.stats().memory_entries, 1);
    }
}
