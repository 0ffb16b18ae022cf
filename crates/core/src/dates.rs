//! Calendar-day arithmetic for fixture dates.
//!
//! Fixture dates are written as "N days from today". Today is the current UTC
//! calendar date, so the same run produces the same dates whatever timezone the
//! host is configured for, and results never carry a time of day.

use chrono::{NaiveDate, TimeDelta, Utc};

/// The current calendar date in UTC.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The calendar date `days` days after `anchor` (before it when negative).
///
/// Returns `None` only when the result falls outside the representable
/// date range.
///
/// ```
/// use chrono::NaiveDate;
/// use invoicer_core::dates::days_from;
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(days_from(anchor, -1), NaiveDate::from_ymd_opt(2024, 2, 29));
/// ```
#[must_use]
pub fn days_from(anchor: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|delta| anchor.checked_add_signed(delta))
}

/// The calendar date `days` days from today (UTC).
#[must_use]
pub fn from_now(days: i64) -> Option<NaiveDate> {
    days_from(today(), days)
}
