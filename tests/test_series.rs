//! Tests for the time series materializer (analytics/series.rs): one
//! zero-filled bucket per calendar month, labels and value functions.

mod common;

use common::at;
use scanlytics::analytics::series::{by_scan_month, materialize, monthly, MonthWindow, ValueFn};
use scanlytics::{MonthLabels, ScanEvent, YearMonth};
use std::cell::Cell;

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

#[test]
fn rolling_12_in_july_2025_with_no_events() {
    let window = MonthWindow::rolling_12(at(2025, 7, 15, 9, 0));
    let series = monthly(std::iter::empty::<&ScanEvent>(), &window, ValueFn::Count, MonthLabels::English);

    assert_eq!(series.len(), 12);
    assert_eq!(
        series.labels(),
        vec![
            "Aug 24", "Sep 24", "Oct 24", "Nov 24", "Dec 24", "Jan 25", "Feb 25", "Mar 25",
            "Apr 25", "May 25", "Jun 25", "Jul 25"
        ]
    );
    assert!(series.values().iter().all(|v| *v == 0));
}

#[test]
fn rolling_window_is_relative_to_now_not_data() {
    let events = vec![ScanEvent::new("1", at(2020, 1, 1, 0, 0), 1)];
    let window = MonthWindow::rolling_12(at(2025, 1, 31, 23, 59));
    let series = monthly(&events, &window, ValueFn::Count, MonthLabels::English);
    assert_eq!(series.points.first().unwrap().period_start, ym(2024, 2));
    assert_eq!(series.points.last().unwrap().period_start, ym(2025, 1));
    assert_eq!(series.total(), 0);
}

#[test]
fn n_months_give_n_ordered_buckets() {
    for n in [1u32, 2, 5, 12, 25] {
        let window = MonthWindow::rolling(at(2024, 3, 1, 0, 0), n);
        let series = monthly(std::iter::empty::<&ScanEvent>(), &window, ValueFn::Count, MonthLabels::English);
        assert_eq!(series.len(), n as usize);
        assert!(series
            .points
            .windows(2)
            .all(|w| w[0].period_start < w[1].period_start));
    }
}

#[test]
fn count_and_sum_pages() {
    let events = vec![
        ScanEvent::new("1", at(2025, 5, 2, 10, 0), 4),
        ScanEvent::new("2", at(2025, 5, 30, 23, 59), 6),
        ScanEvent::new("1", at(2025, 7, 1, 0, 0), 10),
    ];
    let window = MonthWindow::new(ym(2025, 5), ym(2025, 7)).unwrap();

    let counts = monthly(&events, &window, ValueFn::Count, MonthLabels::English);
    assert_eq!(counts.values(), vec![2, 0, 1]);

    let pages = monthly(&events, &window, ValueFn::SumPages, MonthLabels::English);
    assert_eq!(pages.values(), vec![10, 0, 10]);
}

#[test]
fn events_outside_window_are_dropped() {
    let events = vec![
        ScanEvent::new("1", at(2025, 4, 30, 23, 59), 1),
        ScanEvent::new("1", at(2025, 5, 1, 0, 0), 1),
        ScanEvent::new("1", at(2025, 8, 1, 0, 0), 1),
    ];
    let window = MonthWindow::new(ym(2025, 5), ym(2025, 7)).unwrap();
    let series = monthly(&events, &window, ValueFn::Count, MonthLabels::English);
    assert_eq!(series.values(), vec![1, 0, 0]);
}

#[test]
fn value_fn_is_not_called_for_empty_buckets() {
    let events = vec![ScanEvent::new("1", at(2025, 6, 10, 8, 0), 3)];
    let window = MonthWindow::new(ym(2025, 1), ym(2025, 12)).unwrap();
    let calls = Cell::new(0);
    let series = materialize(
        &events,
        &window,
        by_scan_month,
        |bucket| {
            calls.set(calls.get() + 1);
            bucket.len() as u64 * 100
        },
        MonthLabels::English,
    );
    assert_eq!(calls.get(), 1);
    assert_eq!(series.points[5].value, 100);
    assert_eq!(series.total(), 100);
}

#[test]
fn swedish_labels() {
    let window = MonthWindow::new(ym(2024, 4), ym(2024, 10)).unwrap();
    let series = monthly(std::iter::empty::<&ScanEvent>(), &window, ValueFn::Count, MonthLabels::Swedish);
    assert_eq!(
        series.labels(),
        vec!["Apr 24", "Maj 24", "Jun 24", "Jul 24", "Aug 24", "Sep 24", "Okt 24"]
    );
}

#[test]
fn window_across_year_boundary() {
    let window = MonthWindow::new(ym(2024, 11), ym(2025, 2)).unwrap();
    assert_eq!(window.len(), 4);
    let series = monthly(std::iter::empty::<&ScanEvent>(), &window, ValueFn::Count, MonthLabels::English);
    assert_eq!(series.labels(), vec!["Nov 24", "Dec 24", "Jan 25", "Feb 25"]);
}
