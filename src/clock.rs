//! Clock
//!
//! Injectable source of "now". Day-based rules (birthdays today, events from
//! today onwards) evaluate calendar dates in a configured UTC offset rather
//! than the host timezone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|e| *e.into_inner())
    }
}

/// Calendar helpers bound to a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Build a calendar for an offset in minutes east of UTC.
    ///
    /// Offsets outside ±24h fall back to UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes.saturating_mul(60)) {
            Some(offset) => Self { offset },
            None => {
                tracing::warn!(minutes, "UTC offset out of range, using UTC");
                Self::utc()
            }
        }
    }

    /// Local calendar date of an instant
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Midnight at the start of the local day containing `instant`
    pub fn start_of_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.date_of(instant);
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(instant)
    }

    /// Whether two instants share month and day in local time, ignoring year
    pub fn same_month_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        let (a, b) = (self.date_of(a), self.date_of(b));
        a.month() == b.month() && a.day() == b.day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_start_of_day_utc() {
        let calendar = Calendar::utc();
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 17, 45, 12).unwrap();
        assert_eq!(
            calendar.start_of_day(instant),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_with_offset() {
        // UTC+7: 20:00 UTC on the 10th is already the 11th locally
        let calendar = Calendar::with_offset_minutes(7 * 60);
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(
            calendar.start_of_day(instant),
            Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_same_month_day_ignores_year() {
        let calendar = Calendar::utc();
        let birthday = Utc.with_ymd_and_hms(1990, 7, 4, 8, 0, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2024, 7, 4, 23, 0, 0).unwrap();
        let tomorrow = Utc.with_ymd_and_hms(2024, 7, 5, 1, 0, 0).unwrap();
        assert!(calendar.same_month_day(birthday, today));
        assert!(!calendar.same_month_day(birthday, tomorrow));
    }

    #[test]
    fn test_out_of_range_offset_falls_back() {
        let calendar = Calendar::with_offset_minutes(48 * 60);
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap();
        assert_eq!(
            calendar.start_of_day(instant),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }
}
