//! Clock seam so cooldown and streak logic is deterministic under test.

use crate::domain::{GameDate, TimeMs};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of wall-clock time for the bookkeeping engines.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimeMs;

    /// Today's calendar date, derived from [`Clock::now_ms`] in UTC so the
    /// daily-login boundary is the same for every caller.
    fn today(&self) -> GameDate {
        let date = chrono::DateTime::from_timestamp_millis(self.now_ms().as_ms())
            .map(|dt| dt.date_naive())
            .unwrap_or(chrono::NaiveDate::MIN);
        GameDate::new(date)
    }
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimeMs {
        TimeMs::new(chrono::Utc::now().timestamp_millis())
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: TimeMs) -> Self {
        ManualClock {
            ms: AtomicI64::new(start.as_ms()),
        }
    }

    pub fn set(&self, t: TimeMs) {
        self.ms.store(t.as_ms(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta: i64) {
        self.ms.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimeMs {
        TimeMs::new(self.ms.load(Ordering::SeqCst))
    }
}
