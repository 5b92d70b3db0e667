//! Client-side cache for backend responses
//!
//! Two tiers: a volatile in-memory map that receives every entry, and an
//! optional SQLite-backed tier that keeps long-lived responses across runs.
//! Reads go through a stale-while-revalidate wrapper; writes invalidate by
//! substring pattern.

pub mod client;
pub mod clock;
pub mod invalidation;
pub mod key;
pub mod persist;
pub mod policy;
pub mod storage;
pub mod store;
pub mod swr;

use std::time::Duration;

/// Cache TTL classes
///
/// Each backend response falls into exactly one of these, chosen by
/// [`policy::resolve_ttl`].
pub struct CacheTtl;

impl CacheTtl {
    // Today's invoices move with every sale
    pub const TODAY: Duration = Duration::from_secs(30);

    // Dashboard aggregates
    pub const STATS: Duration = Duration::from_secs(60);

    // Invoices waiting on payment
    pub const PENDING: Duration = Duration::from_secs(2 * 60);

    // Closed date ranges rarely change
    pub const HISTORICAL: Duration = Duration::from_secs(5 * 60);

    // Catalogue
    pub const PRODUCTS: Duration = Duration::from_secs(10 * 60);

    // Everything else
    pub const GENERAL: Duration = Duration::from_secs(15 * 60);
}

/// Entries must outlive this to be written to the persistent tier
pub const PERSISTENT_THRESHOLD: Duration = CacheTtl::HISTORICAL;

/// Maximum number of entries kept in the persistent tier
pub const PERSISTENT_CAP: usize = 50;

/// Default interval for the in-memory expiry sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub use client::CachedSaleClient;
pub use clock::{Clock, SystemClock};
pub use invalidation::Resource;
pub use key::cache_key;
pub use persist::PersistentStore;
pub use policy::resolve_ttl;
pub use storage::SqliteStore;
pub use store::CacheStore;
pub use swr::CacheRequest;
