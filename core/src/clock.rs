//! Date and time capability.
//!
//! RULE: Nothing in the engine reads the wall clock directly.
//! Every date-dependent operation takes a `&dyn Clock`, so day rollover,
//! streaks and missions can be exercised without real time passing.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// The caller's local calendar date.
    fn today(&self) -> NaiveDate;

    /// The current instant, used to stamp activity log entries.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host clock. Calendar dates use the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one calendar date. Used in tests and replay tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
    at:   DateTime<Utc>,
}

impl FixedClock {
    /// Pin to `date` at midday UTC.
    pub fn on(date: NaiveDate) -> Self {
        let at = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default();
        Self { date, at }
    }

    /// Parse a `YYYY-MM-DD` string. Returns `None` for malformed input.
    pub fn parse(date: &str) -> Option<Self> {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(Self::on)
    }

    /// A clock `days` calendar days later than this one.
    pub fn plus_days(&self, days: u64) -> Self {
        let date = self
            .date
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(self.date);
        Self::on(date)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }

    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
