//! Wall clock used by the cache
//!
//! "Today" is the calendar date on the machine running the client
//! (`chrono::Local`), not the backend's. Entry timestamps are UTC epoch
//! milliseconds.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

/// Source of time for cache freshness and calendar checks.
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds
    fn now_millis(&self) -> i64;

    /// Calendar date an epoch-millisecond instant falls on
    fn date_of(&self, millis: i64) -> NaiveDate;

    /// Epoch milliseconds at which `date` begins
    fn start_of(&self, date: NaiveDate) -> i64;

    /// Calendar date right now
    fn today(&self) -> NaiveDate {
        self.date_of(self.now_millis())
    }
}

/// Real clock; calendar dates are client-local.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn date_of(&self, millis: i64) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&Local).date_naive())
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn start_of(&self, date: NaiveDate) -> i64 {
        date.and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .earliest()
            .map(|dt| dt.timestamp_millis())
            // Midnight skipped by a DST jump; fall back to UTC midnight
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }
}

#[cfg(test)]
pub use manual::ManualClock;
