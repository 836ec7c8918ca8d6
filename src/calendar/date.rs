//! Calendar dates and the labels a date-picker renders for them
//!
//! The picker input shows dates as `Nov 1, 2024` and the calendar header
//! shows the visible page as ` November 2024 `. Both are computed here from
//! a `CalendarDate` so tests can compare the UI against values that did not
//! come from the UI.

use crate::error::{BrowserError, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Gregorian calendar date with no time-of-day component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from its parts, `None` if the parts do not form a real date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Shift by a number of days (negative goes back), `None` on calendar overflow
    pub fn offset_days(&self, days: i64) -> Option<Self> {
        Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }
}

impl From<NaiveDateTime> for CalendarDate {
    /// Drops the time of day
    fn from(value: NaiveDateTime) -> Self {
        Self(value.date())
    }
}

impl<Tz: TimeZone> From<&DateTime<Tz>> for CalendarDate {
    /// The date in the timestamp's own time zone
    fn from(value: &DateTime<Tz>) -> Self {
        Self(value.date_naive())
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl FromStr for CalendarDate {
    type Err = BrowserError;

    /// Parses ISO `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| BrowserError::InvalidDate(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Render a date the way the picker input displays it: `Nov 1, 2024`
///
/// Month names come from chrono's fixed English tables, so the output does
/// not depend on the host locale or timezone.
pub fn format_date(date: &CalendarDate) -> String {
    date.0.format("%b %-d, %Y").to_string()
}

/// Header text of a calendar page, e.g. `" November 2024 "`
///
/// The widget pads its header with a space on each side, and matching is
/// done by containment against the raw header text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthYearLabel(String);

impl MonthYearLabel {
    pub fn for_date(date: &CalendarDate) -> Self {
        Self(format!(" {} ", date.0.format("%B %Y")))
    }

    /// Wrap an already formatted label, used when the caller knows the exact text
    pub fn from_raw(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the displayed header text contains this label
    pub fn matches(&self, displayed: &str) -> bool {
        displayed.contains(self.0.as_str())
    }
}

impl fmt::Display for MonthYearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of "today" for date-dependent scenarios
pub trait Clock {
    fn today(&self) -> CalendarDate;

    /// Today shifted by `days`
    fn days_from_today(&self, days: i64) -> Result<CalendarDate> {
        let today = self.today();
        today.offset_days(days).ok_or_else(|| {
            BrowserError::InvalidDate(format!("{} offset by {} days overflows", today, days))
        })
    }
}

/// Reads the host's local date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        CalendarDate(Local::now().date_naive())
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub CalendarDate);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.0
    }
}
