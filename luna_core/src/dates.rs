//! Calendar-day helpers shared by the detector, the predictor and the stores.
//!
//! Everything in Luna works at local calendar-day granularity. Values that
//! carry a time of day are reduced to their date before any arithmetic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};

use crate::{Error, Result};

/// Format used for dates on disk and on the command line
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can be reduced to a calendar day
pub trait CalendarDate {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    /// The date in the value's own time zone
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDate + ?Sized> CalendarDate for &T {
    fn calendar_date(&self) -> NaiveDate {
        (**self).calendar_date()
    }
}

/// Strip time of day, drop duplicates and sort ascending.
///
/// Always builds a fresh vector; the caller's collection is left untouched.
pub fn normalize_days<I>(days: I) -> Vec<NaiveDate>
where
    I: IntoIterator,
    I::Item: CalendarDate,
{
    let mut normalized: Vec<NaiveDate> = days.into_iter().map(|d| d.calendar_date()).collect();
    normalized.sort_unstable();
    normalized.dedup();
    normalized
}

/// Move a date by a signed number of days.
///
/// Returns `None` instead of panicking when the result leaves chrono's range.
pub fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Parse a `YYYY-MM-DD` string
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("'{}': {}", s, e)))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// First and last day of a month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidDate(format!("{}-{:02} is not a valid month", year, month)))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| Error::InvalidDate(format!("{}-{:02} is out of range", year, month)))?;
    Ok((first, last))
}

/// Parse a `YYYY-MM` string into (year, month)
pub fn parse_year_month(s: &str) -> Result<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), ISO_DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("'{}': {}", s, e)))?;
    Ok((first.year(), first.month()))
}
