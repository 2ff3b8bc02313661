#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use scanlytics::source::InMemoryStore;
use scanlytics::{Customer, ScanEvent};

pub const CHAIN: &str = "Länsfast";

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// Event already carrying the default chain.
pub fn scan(customer: &str, ts: DateTime<Utc>, pages: u32) -> ScanEvent {
    ScanEvent::new(customer, ts, pages).with_chain(CHAIN)
}

pub fn customer(id: &str, city: &str) -> Customer {
    Customer::new(id).with_city(city).with_chain(CHAIN)
}

/// Offices in three cities plus one outside the chain. Evaluated at
/// 2025-07-20 12:00 UTC:
/// - "1" (Lund) scans in July, very active
/// - "2" (Malmö) last scanned 2025-07-01, active
/// - "3" (Malmö) last scanned in March, inactive
/// - "4" (Umeå) never scans
/// - "9" (Oslo) belongs to another chain
pub fn store() -> InMemoryStore {
    let customers = vec![
        customer("1", "Lund"),
        customer("2", "Malmö"),
        customer("3", "Malmö"),
        customer("4", "Umeå"),
        Customer::new("9").with_city("Oslo").with_chain("Other"),
    ];
    let events = vec![
        ScanEvent::new("1", at(2025, 7, 18, 10, 0), 5),
        ScanEvent::new("1", at(2025, 7, 18, 10, 3), 5),
        ScanEvent::new("1", at(2025, 7, 18, 11, 0), 3),
        ScanEvent::new("2", at(2025, 7, 1, 9, 0), 20),
        ScanEvent::new("2", at(2025, 7, 1, 9, 10), 60),
        ScanEvent::new("3", at(2025, 3, 3, 14, 0), 8),
        ScanEvent::new("9", at(2025, 7, 19, 8, 0), 4),
    ];
    InMemoryStore::new(events, customers)
}

pub fn now() -> DateTime<Utc> {
    at(2025, 7, 20, 12, 0)
}
