//! Zero-filled monthly time series.
//!
//! The set of buckets is decided by the requested window alone; events only
//! supply values. A window of `N` months always yields `N` points in
//! chronological order, including when no event falls inside it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar::{MonthLabels, YearMonth};
use crate::types::ScanEvent;

pub const ROLLING_MONTHS: u32 = 12;

/// Inclusive range of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthWindow {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl MonthWindow {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: YearMonth, end: YearMonth) -> Option<Self> {
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    /// The `months` calendar months ending with the month of `now`. Near the
    /// lower end of the calendar the window starts at the earliest month.
    pub fn rolling(now: DateTime<Utc>, months: u32) -> Self {
        let end = YearMonth::of(now);
        let back = months.saturating_sub(1).min(i32::MAX as u32) as i32;
        let start = end
            .checked_add(-back)
            .unwrap_or_else(|| YearMonth::of_date(NaiveDate::MIN));
        Self { start, end }
    }

    /// `[currentMonth - 11, currentMonth]`, relative to `now` rather than the data.
    pub fn rolling_12(now: DateTime<Utc>) -> Self {
        Self::rolling(now, ROLLING_MONTHS)
    }

    pub fn len(&self) -> usize {
        (self.start.months_until(&self.end) + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, ym: YearMonth) -> bool {
        self.start <= ym && ym <= self.end
    }

    pub fn months(&self) -> impl Iterator<Item = YearMonth> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |m| m.succ().filter(|n| *n <= end))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub period_label: String,
    pub period_start: YearMonth,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TimeSeries {
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.period_label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

/// Per-bucket aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFn {
    /// Number of events in the bucket.
    Count,
    /// Sum of `page_count` over the bucket.
    SumPages,
}

impl ValueFn {
    pub fn apply(&self, events: &[&ScanEvent]) -> u64 {
        match self {
            ValueFn::Count => events.len() as u64,
            ValueFn::SumPages => events.iter().map(|e| e.page_count as u64).sum(),
        }
    }
}

/// Bucket by the UTC calendar month of the scan.
pub fn by_scan_month(event: &ScanEvent) -> YearMonth {
    YearMonth::of(event.timestamp)
}

/// One point per month of `window`; months without events get `0` and
/// `value_fn` is only called for non-empty buckets.
pub fn materialize<'a, I, B, V>(
    events: I,
    window: &MonthWindow,
    bucketer: B,
    value_fn: V,
    labels: MonthLabels,
) -> TimeSeries
where
    I: IntoIterator<Item = &'a ScanEvent>,
    B: Fn(&ScanEvent) -> YearMonth,
    V: Fn(&[&ScanEvent]) -> u64,
{
    let mut buckets: BTreeMap<YearMonth, Vec<&ScanEvent>> = BTreeMap::new();
    let mut outside = 0usize;
    for event in events {
        let ym = bucketer(event);
        if window.contains(ym) {
            buckets.entry(ym).or_default().push(event);
        } else {
            outside += 1;
        }
    }

    let points: Vec<SeriesPoint> = window
        .months()
        .map(|ym| {
            let value = match buckets.get(&ym) {
                Some(bucket) if !bucket.is_empty() => value_fn(bucket.as_slice()),
                _ => 0,
            };
            SeriesPoint {
                period_label: labels.label(ym),
                period_start: ym,
                value,
            }
        })
        .collect();

    tracing::debug!(
        "[series] {} months {}..{}, {} non-empty, {} events outside window",
        points.len(),
        window.start,
        window.end,
        buckets.len(),
        outside
    );

    TimeSeries { points }
}

/// [`materialize`] with the standard month bucketer and a [`ValueFn`].
pub fn monthly<'a, I>(events: I, window: &MonthWindow, value: ValueFn, labels: MonthLabels) -> TimeSeries
where
    I: IntoIterator<Item = &'a ScanEvent>,
{
    materialize(events, window, by_scan_month, |bucket| value.apply(bucket), labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_saturates_at_earliest_month() {
        let earliest = YearMonth::of_date(NaiveDate::MIN);
        let now = NaiveDate::MIN
            .checked_add_months(chrono::Months::new(2))
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let w = MonthWindow::rolling_12(now);
        assert_eq!(w.start, earliest);
        assert_eq!(w.end, YearMonth::of(now));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn months_iterator_stops_at_end() {
        let w = MonthWindow::new(
            YearMonth::new(2024, 11).unwrap(),
            YearMonth::new(2025, 2).unwrap(),
        )
        .unwrap();
        let months: Vec<String> = w.months().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(MonthWindow::new(
            YearMonth::new(2025, 2).unwrap(),
            YearMonth::new(2024, 11).unwrap()
        )
        .is_none());
    }
}
