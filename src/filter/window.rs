use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::YearMonth;

/// The single time restriction of a [`super::FilterSpec`].
///
/// Variants are symbolic: rolling variants are resolved against an evaluation
/// instant only when [`TimeWindow::bounds`] is called, so a normalized filter
/// never captures the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TimeWindow {
    /// The last `n` days up to the evaluation instant.
    RollingDays(u32),
    /// The calendar day of the evaluation instant.
    Today,
    CalendarMonth(YearMonth),
    Quarter(Quarter),
    /// Whole days, both ends inclusive.
    ExplicitRange { from: NaiveDate, to: NaiveDate },
    /// No time restriction.
    Unbounded,
}

/// Calendar quarter of a given year, stored as its first month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "QuarterRepr", try_from = "QuarterRepr")]
pub struct Quarter(YearMonth);

#[derive(Serialize, Deserialize)]
struct QuarterRepr {
    quarter: u8,
    year: i32,
}

impl Quarter {
    pub fn new(quarter: u8, year: i32) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        YearMonth::new(year, (quarter as u32 - 1) * 3 + 1).map(Quarter)
    }

    pub fn quarter(&self) -> u8 {
        ((self.0.month() - 1) / 3 + 1) as u8
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Calendar months `[(q-1)*3+1, q*3]`.
    pub fn months(&self) -> (YearMonth, YearMonth) {
        // Never crosses a year boundary, so the step cannot fail.
        (self.0, self.0.checked_add(2).unwrap_or(self.0))
    }
}

impl From<Quarter> for QuarterRepr {
    fn from(q: Quarter) -> Self {
        QuarterRepr {
            quarter: q.quarter(),
            year: q.year(),
        }
    }
}

impl TryFrom<QuarterRepr> for Quarter {
    type Error = String;

    fn try_from(repr: QuarterRepr) -> Result<Self, Self::Error> {
        Quarter::new(repr.quarter, repr.year)
            .ok_or_else(|| format!("Invalid quarter Q{} {}", repr.quarter, repr.year))
    }
}

/// Half-open instant bounds `[start, end)`; `None` means open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBounds {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeBounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| instant >= s) && self.end.map_or(true, |e| instant < e)
    }
}

impl TimeWindow {
    /// The calendar month of `now`, for call sites whose default is "this month".
    pub fn current_month(now: DateTime<Utc>) -> Self {
        TimeWindow::CalendarMonth(YearMonth::of(now))
    }

    /// Resolve to concrete bounds, pinned to the single evaluation instant `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> TimeBounds {
        match *self {
            TimeWindow::RollingDays(days) => TimeBounds {
                start: now.checked_sub_signed(Duration::days(days as i64)),
                end: None,
            },
            TimeWindow::Today => {
                let today = now.date_naive();
                day_range(today, today)
            }
            TimeWindow::CalendarMonth(ym) => month_range(ym, ym),
            TimeWindow::Quarter(q) => {
                let (start, end) = q.months();
                month_range(start, end)
            }
            TimeWindow::ExplicitRange { from, to } => day_range(from, to),
            TimeWindow::Unbounded => TimeBounds::unbounded(),
        }
    }

    /// First and last calendar month touched by the window, or `None` when unbounded.
    pub fn month_span(&self, now: DateTime<Utc>) -> Option<(YearMonth, YearMonth)> {
        match *self {
            TimeWindow::RollingDays(days) => {
                let start = now
                    .checked_sub_signed(Duration::days(days as i64))
                    .map(|s| s.date_naive())
                    .unwrap_or(NaiveDate::MIN);
                Some((YearMonth::of_date(start), YearMonth::of(now)))
            }
            TimeWindow::Today => Some((YearMonth::of(now), YearMonth::of(now))),
            TimeWindow::CalendarMonth(ym) => Some((ym, ym)),
            TimeWindow::Quarter(q) => Some(q.months()),
            TimeWindow::ExplicitRange { from, to } => {
                Some((YearMonth::of_date(from), YearMonth::of_date(to)))
            }
            TimeWindow::Unbounded => None,
        }
    }

    pub fn is_bounded(&self) -> bool {
        !matches!(self, TimeWindow::Unbounded)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::RollingDays(1) => write!(f, "Last day"),
            TimeWindow::RollingDays(n) => write!(f, "Last {} days", n),
            TimeWindow::Today => write!(f, "Today"),
            TimeWindow::CalendarMonth(ym) => write!(f, "{}", ym.first_day().format("%B %Y")),
            TimeWindow::Quarter(q) => write!(f, "Q{} {}", q.quarter(), q.year()),
            TimeWindow::ExplicitRange { from, to } => write!(f, "{} to {}", from, to),
            TimeWindow::Unbounded => write!(f, "All time"),
        }
    }
}

fn day_range(from: NaiveDate, to: NaiveDate) -> TimeBounds {
    TimeBounds {
        start: Some(from.and_time(NaiveTime::MIN).and_utc()),
        end: to.succ_opt().map(|d| d.and_time(NaiveTime::MIN).and_utc()),
    }
}

fn month_range(first: YearMonth, last: YearMonth) -> TimeBounds {
    TimeBounds {
        start: Some(first.start()),
        end: last.succ().map(|next| next.start()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn quarter_months_follow_formula() {
        let q = Quarter::new(3, 2024).unwrap();
        let (start, end) = q.months();
        assert_eq!((start.month(), end.month()), (7, 9));
        assert!(Quarter::new(0, 2024).is_none());
        assert!(Quarter::new(5, 2024).is_none());
    }

    #[test]
    fn today_covers_whole_utc_day() {
        let now = at(2025, 7, 14, 15, 30);
        let b = TimeWindow::Today.bounds(now);
        assert!(b.contains(at(2025, 7, 14, 0, 0)));
        assert!(b.contains(at(2025, 7, 14, 23, 59)));
        assert!(!b.contains(at(2025, 7, 15, 0, 0)));
        assert!(!b.contains(at(2025, 7, 13, 23, 59)));
    }

    #[test]
    fn rolling_days_is_open_ended() {
        let now = at(2025, 7, 14, 12, 0);
        let b = TimeWindow::RollingDays(7).bounds(now);
        assert!(b.contains(at(2025, 7, 7, 12, 0)));
        assert!(!b.contains(at(2025, 7, 7, 11, 59)));
        assert!(b.end.is_none());
    }

    #[test]
    fn display_is_neutral_english() {
        let ym = YearMonth::new(2024, 7).unwrap();
        assert_eq!(TimeWindow::CalendarMonth(ym).to_string(), "July 2024");
        assert_eq!(TimeWindow::RollingDays(30).to_string(), "Last 30 days");
        assert_eq!(
            TimeWindow::Quarter(Quarter::new(2, 2024).unwrap()).to_string(),
            "Q2 2024"
        );
    }
}
