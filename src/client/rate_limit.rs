//! Per-category rate limiting for backend requests
//!
//! Limiting is reactive: a category is only throttled after the backend has
//! answered 429 for it once. Until then requests go out unthrottled.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::Method;

/// Kinds of backend request, each with its own request rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCategory {
    /// GET on a resource - 10 req/sec
    Read,
    /// POST/PUT/DELETE on a resource - 4 req/sec
    Write,
    /// `auth.php` actions - 1 req/sec
    Auth,
}

impl RequestCategory {
    pub const ALL: [RequestCategory; 3] = [
        RequestCategory::Read,
        RequestCategory::Write,
        RequestCategory::Auth,
    ];

    /// Categorize a request by path and method.
    pub fn from_request(path: &str, method: &Method) -> Self {
        if path.contains("auth.php") {
            return RequestCategory::Auth;
        }
        if *method == Method::GET {
            RequestCategory::Read
        } else {
            RequestCategory::Write
        }
    }

    /// Requests per second once throttling is active
    pub fn per_second(&self) -> u32 {
        match self {
            RequestCategory::Read => 10,
            RequestCategory::Write => 4,
            RequestCategory::Auth => 1,
        }
    }
}

/// Limiter for a single category
pub struct CategoryLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    category: RequestCategory,
}

impl CategoryLimiter {
    pub fn new(category: RequestCategory) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(category.per_second()).unwrap_or(NonZeroU32::MIN),
        );
        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
            category,
        }
    }

    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {:?}", self.category);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub async fn wait_if_active(&self) {
        if self.is_active() {
            self.limiter.until_ready().await;
        }
    }
}

/// One limiter per request category
pub struct RateLimiterSet {
    limiters: HashMap<RequestCategory, CategoryLimiter>,
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterSet {
    pub fn new() -> Self {
        let limiters = RequestCategory::ALL
            .into_iter()
            .map(|category| (category, CategoryLimiter::new(category)))
            .collect();
        Self { limiters }
    }

    /// Wait for permission if `category` is being throttled
    pub async fn wait_for(&self, category: RequestCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.wait_if_active().await;
        }
    }

    /// Start throttling `category` (called on 429)
    pub fn activate(&self, category: RequestCategory) {
        if let Some(limiter) = self.limiters.get(&category) {
            limiter.activate();
        }
    }

    pub fn is_active(&self, category: RequestCategory) -> bool {
        self.limiters
            .get(&category)
            .is_some_and(CategoryLimiter::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            RequestCategory::from_request("api/facturas.php", &Method::GET),
            RequestCategory::Read
        );
        assert_eq!(
            RequestCategory::from_request("api/facturas.php?id=3", &Method::DELETE),
            RequestCategory::Write
        );
        assert_eq!(
            RequestCategory::from_request("api/auth.php?action=login", &Method::POST),
            RequestCategory::Auth
        );
        assert_eq!(
            RequestCategory::from_request("api/auth.php?action=check", &Method::GET),
            RequestCategory::Auth
        );
    }

    #[test]
    fn test_activation_is_per_category() {
        let set = RateLimiterSet::new();
        assert!(!set.is_active(RequestCategory::Read));

        set.activate(RequestCategory::Write);
        set.activate(RequestCategory::Write);
        assert!(set.is_active(RequestCategory::Write));
        assert!(!set.is_active(RequestCategory::Read));
    }

    #[tokio::test]
    async fn test_inactive_limiter_does_not_wait() {
        let set = RateLimiterSet::new();
        for _ in 0..50 {
            set.wait_for(RequestCategory::Auth).await;
        }
    }
}
