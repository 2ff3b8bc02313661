//! Calendar-aware month arithmetic.
//!
//! Months are handled as `(year, month)` pairs backed by the first day of the
//! month, so stepping across year boundaries is plain integer arithmetic and
//! never string manipulation.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Returns `None` when `month` is outside `1..=12` or `year` is outside `1..=9999`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(YearMonth)
    }

    /// The month containing `instant` (UTC calendar).
    pub fn of(instant: DateTime<Utc>) -> Self {
        Self::of_date(instant.date_naive())
    }

    pub fn of_date(date: NaiveDate) -> Self {
        YearMonth(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .and_then(|next| next.0.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Midnight UTC on the first day of the month.
    pub fn start(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn succ(&self) -> Option<Self> {
        self.checked_add(1)
    }

    /// Step `delta` months forward (or backward when negative).
    pub fn checked_add(&self, delta: i32) -> Option<Self> {
        let shifted = if delta >= 0 {
            self.0.checked_add_months(Months::new(delta.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(delta.unsigned_abs()))
        }?;
        YearMonth::new(shifted.year(), shifted.month())
    }

    /// Number of months from `self` to `other`; negative when `other` is earlier.
    pub fn months_until(&self, other: &YearMonth) -> i64 {
        let a = self.year() as i64 * 12 + self.month() as i64;
        let b = other.year() as i64 * 12 + other.month() as i64;
        b - a
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range: '{}'", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

const ENGLISH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const SWEDISH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Maj", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dec",
];

/// Fixed three-letter month label tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthLabels {
    #[default]
    English,
    Swedish,
}

impl MonthLabels {
    pub fn abbreviation(&self, month: u32) -> &'static str {
        let table = match self {
            MonthLabels::English => &ENGLISH_ABBREVIATIONS,
            MonthLabels::Swedish => &SWEDISH_ABBREVIATIONS,
        };
        let idx = (month.clamp(1, 12) - 1) as usize;
        table[idx]
    }

    /// Chart label such as `"Jan 25"`.
    pub fn label(&self, ym: YearMonth) -> String {
        format!(
            "{} {:02}",
            self.abbreviation(ym.month()),
            ym.year().rem_euclid(100)
        )
    }
}

impl FromStr for MonthLabels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(MonthLabels::English),
            "sv" | "swedish" => Ok(MonthLabels::Swedish),
            other => Err(format!("Unknown month label locale '{}'", other)),
        }
    }
}
