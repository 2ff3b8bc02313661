//! Tests for the session classifier (analytics/session.rs): batch detection
//! by gap threshold and the derived efficiency percentage.

mod common;

use chrono::Duration;
use common::at;
use scanlytics::analytics::session::{classify, label_scans, LONG_BATCH_GAP_MINUTES};
use scanlytics::ScanEvent;

fn gap5() -> Duration {
    Duration::minutes(5)
}

#[test]
fn three_scans_one_batch() {
    let events = vec![
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 5),
        ScanEvent::new("1", at(2025, 1, 7, 10, 3), 5),
        ScanEvent::new("1", at(2025, 1, 7, 11, 0), 3),
    ];
    let r = classify(&events, gap5());
    assert_eq!(r.total_scans, 3);
    assert_eq!(r.batch_scans, 1);
    assert_eq!(r.single_scans, 2);
    assert_eq!(r.efficiency_percent, 33);
    assert_eq!(r.total_pages, 13);
}

#[test]
fn empty_input_is_all_zero() {
    let r = classify(std::iter::empty::<&ScanEvent>(), gap5());
    assert_eq!(r.total_scans, 0);
    assert_eq!(r.batch_scans, 0);
    assert_eq!(r.single_scans, 0);
    assert_eq!(r.efficiency_percent, 0);
}

#[test]
fn gap_equal_to_threshold_is_batch() {
    let events = vec![
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 5), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 11), 1),
    ];
    let r = classify(&events, gap5());
    assert_eq!(r.batch_scans, 1);
}

#[test]
fn threshold_changes_the_result() {
    let events = vec![
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 12), 1),
    ];
    assert_eq!(classify(&events, gap5()).batch_scans, 0);
    assert_eq!(
        classify(&events, Duration::minutes(LONG_BATCH_GAP_MINUTES)).batch_scans,
        1
    );
}

#[test]
fn first_scan_of_each_customer_is_never_batch() {
    // Customer 2 scans one minute after customer 1; that is not a batch.
    let events = vec![
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 1),
        ScanEvent::new("2", at(2025, 1, 7, 10, 1), 1),
        ScanEvent::new("2", at(2025, 1, 7, 10, 2), 1),
    ];
    let labeled = label_scans(&events, gap5());
    for customer in ["1", "2"] {
        let first = labeled
            .iter()
            .filter(|l| l.event.customer_id == customer)
            .min_by_key(|l| l.event.timestamp)
            .unwrap();
        assert!(!first.is_batch);
        assert_eq!(first.gap, None);
    }
    assert_eq!(classify(&events, gap5()).batch_scans, 1);
}

#[test]
fn unsorted_input_is_sorted_per_customer() {
    let events = vec![
        ScanEvent::new("1", at(2025, 1, 7, 11, 0), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 3), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 1),
    ];
    let r = classify(&events, gap5());
    assert_eq!(r.batch_scans, 1);
    assert_eq!(r.efficiency_percent, 33);
}

#[test]
fn interleaving_across_customers_does_not_matter() {
    let a = vec![
        ScanEvent::new("1", at(2025, 1, 7, 10, 0), 1),
        ScanEvent::new("1", at(2025, 1, 7, 10, 2), 1),
        ScanEvent::new("2", at(2025, 1, 7, 9, 0), 1),
        ScanEvent::new("2", at(2025, 1, 7, 9, 4), 1),
        ScanEvent::new("2", at(2025, 1, 7, 12, 0), 1),
    ];
    let mut b = a.clone();
    b.reverse();
    let c = vec![a[2].clone(), a[0].clone(), a[4].clone(), a[1].clone(), a[3].clone()];

    let ra = classify(&a, gap5());
    assert_eq!(ra, classify(&b, gap5()));
    assert_eq!(ra, classify(&c, gap5()));
    assert_eq!(ra.batch_scans, 2);
    assert_eq!(ra.efficiency_percent, 40);
}

#[test]
fn batch_plus_single_equals_total() {
    let mut events = Vec::new();
    for customer in 0..5u32 {
        for i in 0..20u32 {
            let minute = (i * (customer + 2) * 3) % 60;
            let hour = 8 + (i * 7 + customer) % 10;
            events.push(ScanEvent::new(
                customer.to_string(),
                at(2025, 2, 1 + (i % 3), hour, minute),
                i,
            ));
        }
    }
    for gap in [0, 1, 5, 15, 120] {
        let r = classify(&events, Duration::minutes(gap));
        assert_eq!(r.batch_scans + r.single_scans, r.total_scans);
        assert!(r.efficiency_percent <= 100);
    }
}

#[test]
fn all_batch_but_first_rounds_correctly() {
    let events: Vec<ScanEvent> = (0..8)
        .map(|i| ScanEvent::new("1", at(2025, 1, 7, 10, i), 1))
        .collect();
    let r = classify(&events, gap5());
    assert_eq!(r.batch_scans, 7);
    // 7 / 8 = 87.5 rounds half up
    assert_eq!(r.efficiency_percent, 88);
}
