//! Business-day boundaries in a fixed IANA timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::ledger::LedgerError;

/// Longest local gap searched for the first valid instant of a day.
const MAX_GAP_MINUTES: i64 = 48 * 60;

/// One business day as a half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    /// Local calendar date.
    pub date: NaiveDate,
    /// First instant of the day.
    pub start: DateTime<Utc>,
    /// First instant of the next day.
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Returns true if `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the day, 23 to 25 hours around DST transitions.
    #[must_use]
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// Computes "today" for check-ins in the configured business timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakClock {
    tz: Tz,
}

impl StreakClock {
    /// Creates a clock for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Creates a clock from an IANA name such as `America/New_York`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for names missing from the tz database.
    pub fn from_name(name: &str) -> Result<Self, LedgerError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| LedgerError::InvalidInput(format!("Unknown timezone: {name}")))
    }

    /// Returns the business timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Returns the local calendar date of `instant`.
    #[must_use]
    pub fn business_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Returns the business day containing `instant`.
    #[must_use]
    pub fn day_boundaries(&self, instant: DateTime<Utc>) -> DayWindow {
        self.window_for_date(self.business_date(instant))
    }

    /// Returns the business day for a local calendar date.
    #[must_use]
    pub fn window_for_date(&self, date: NaiveDate) -> DayWindow {
        let next = date.succ_opt().unwrap_or(date);
        DayWindow {
            date,
            start: self.start_of(date),
            end: self.start_of(next),
        }
    }

    /// Returns true if both instants fall on the same business day.
    #[must_use]
    pub fn is_same_business_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.business_date(a) == self.business_date(b)
    }

    /// First valid instant of a local date.
    ///
    /// A skipped midnight resolves to the first local minute that exists;
    /// a repeated midnight resolves to its earlier occurrence.
    fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        (0..=MAX_GAP_MINUTES)
            .find_map(|minutes| self.earliest(midnight + Duration::minutes(minutes)))
            .unwrap_or_else(|| midnight.and_utc())
    }

    fn earliest(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
