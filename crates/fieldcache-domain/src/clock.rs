//! Injectable clock port
//!
//! Expiry decisions (TTL computation, lazy eviction, end-of-day
//! resolution) all go through a [`Clock`] so they can be driven
//! deterministically in tests. Production code uses [`SystemClock`];
//! tests use [`ManualClock`].

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicI64, Ordering};

/// Time source for expiry computation
pub trait Clock: Send + Sync {
    /// Current time as unix seconds
    fn now_unix(&self) -> i64;

    /// End of the current calendar day, local time, inclusive through
    /// 23:59:59 — the resolution target of the `Today` expiry sentinel
    fn end_of_today_unix(&self) -> i64 {
        let now = self.now_unix();
        let Some(instant) = DateTime::from_timestamp(now, 0) else {
            return now;
        };
        let local = instant.with_timezone(&Local);
        local
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .and_then(|naive| naive.and_local_timezone(Local).earliest())
            .map(|dt| dt.timestamp())
            .unwrap_or(now)
    }
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Local::now().timestamp()
    }
}

/// Hand-driven clock for deterministic expiry tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at the given unix timestamp
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by the given number of seconds
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
