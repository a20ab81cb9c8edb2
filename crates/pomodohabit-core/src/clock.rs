//! Wall-clock access.
//!
//! Streaks are counted in calendar days of the user's local zone, so every
//! "is this today / yesterday" question is answered through a [`Clock`]
//! rather than by comparing raw 24h windows.

use std::cell::Cell;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day that `at` falls on in the clock's zone.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// The machine clock in the machine's local zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// A hand-driven clock with a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Cell::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}
