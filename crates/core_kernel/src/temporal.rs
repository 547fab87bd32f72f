//! Calendar dates and date ranges
//!
//! Transaction dates arrive as text in one of two shapes depending on which
//! collaborator produced them: `YYYY-MM-DD` or `DD-MM-YYYY`. They are parsed
//! once into [`CalendarDate`], a whole-day value with no time component, and
//! always rendered back as `DD-MM-YYYY`.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a date
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Empty date")]
    Empty,

    #[error("Malformed date: {0}")]
    Malformed(String),

    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// A calendar day, ordered by (year, month, day)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Creates a date from its components
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateParseError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DateParseError::OutOfRange(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// Parses either `YYYY-MM-DD` or `DD-MM-YYYY`
    ///
    /// The ISO shape is chosen when the text contains `-` and its first
    /// segment has four digits. A time suffix after an ISO date
    /// (`2024-01-15T10:30:00Z`) is ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::CalendarDate;
    ///
    /// let a = CalendarDate::parse("2024-01-15").unwrap();
    /// let b = CalendarDate::parse("15-01-2024").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.to_string(), "15-01-2024");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, DateParseError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DateParseError::Empty);
        }
        let malformed = || DateParseError::Malformed(raw.to_string());

        let segments: Vec<&str> = text.split('-').collect();
        let iso = segments.len() > 1
            && segments[0].len() == 4
            && segments[0].bytes().all(|b| b.is_ascii_digit());

        let date_part = if iso {
            text.split(['T', ' ']).next().unwrap_or(text)
        } else {
            text
        };

        let parts: Vec<&str> = date_part.split('-').collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(malformed());
        }

        let (year, month, day) = if iso {
            (parts[0], parts[1], parts[2])
        } else {
            (parts[2], parts[1], parts[0])
        };

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        let day: u32 = day.parse().map_err(|_| malformed())?;

        Self::from_ymd(year, month, day)
    }

    /// Parses a date, mapping failure to `None`
    pub fn parse_opt(raw: &str) -> Option<Self> {
        Self::parse(raw).ok()
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

    /// Returns the underlying chrono date
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// User-facing `DD-MM-YYYY` rendering
    pub fn display(&self) -> String {
        self.0.format("%d-%m-%Y").to_string()
    }

    /// `YYYY-MM-DD` rendering
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The calendar month this date falls in
    pub fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year(),
            month: self.month(),
        }
    }

    /// Whole days from `self` until `later` (negative when `later` is earlier)
    pub fn days_until(&self, later: CalendarDate) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d-%m-%Y"))
    }
}

impl FromStr for CalendarDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.display())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A calendar month, ordered chronologically and rendered as `yyyy-mm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Long month label, e.g. `January 2024`
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An inclusive date range; a missing bound leaves the range open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
}

impl DateRange {
    pub fn new(from: Option<CalendarDate>, to: Option<CalendarDate>) -> Self {
        Self { from, to }
    }

    /// The range that admits every date
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builds a range from raw bound text; empty or malformed text leaves
    /// that side open
    pub fn from_raw(from: &str, to: &str) -> Self {
        Self {
            from: CalendarDate::parse_opt(from),
            to: CalendarDate::parse_opt(to),
        }
    }

    /// Returns true when both bounds are set
    pub fn is_bounded(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Range membership
    ///
    /// Only a fully bounded range constrains dates: with either bound unset
    /// every date is in range. A record whose date failed to parse is never
    /// in range.
    pub fn contains(&self, date: Option<CalendarDate>) -> bool {
        let Some(date) = date else {
            return false;
        };
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= date && date <= to,
            _ => true,
        }
    }
}

/// Timezone used to decide what "today" is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Today's date in this timezone
    pub fn today(&self) -> CalendarDate {
        CalendarDate(Utc::now().with_timezone(&self.0).date_naive())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl FromStr for Timezone {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| DateParseError::Malformed(format!("timezone {s}")))
    }
}

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
