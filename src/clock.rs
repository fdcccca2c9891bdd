//! Time source for the dashboard.
//!
//! The engine never reads the system clock directly; it asks a [`Clock`].
//! Day boundaries are local calendar dates in the clock's own offset.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Timelike};

/// Trait for current-time providers.
pub trait Clock {
    /// Returns the current local time with its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Returns today's local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Returns the local hour of day (0..=23).
    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Clock backed by the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Settable clock for testing.
///
/// Clones share the same instant, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl MockClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Creates a clock from an RFC 3339 timestamp.
    ///
    /// # Panics
    ///
    /// Panics if the timestamp is malformed; intended for test fixtures.
    #[must_use]
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339).expect("valid RFC 3339 timestamp");
        Self::new(now)
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward (or backward, with a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
