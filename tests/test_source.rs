//! Tests for event ingestion and InMemoryStore (source.rs).

mod common;

use common::{at, now};
use scanlytics::filter::{FilterSpec, TimeWindow};
use scanlytics::source::{
    load_customers_json, load_events_jsonl, parse_customers_json, parse_events_jsonl,
    CustomerDirectory, EventSource, InMemoryStore,
};
use scanlytics::{Customer, ScanEvent, ScanlyticsError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn parses_jsonl_with_mixed_id_and_timestamp_forms() {
    let input = r#"
{"customerId": 17, "timestamp": "2025-07-02T10:00:00+02:00", "pageCount": 5}
{"customerId": "abc", "timestamp": "2025-07-02 10:03:00", "pageCount": 0, "customerCity": "Lund"}

{"customerId": "x", "timestamp": "2025-07-03"}
"#;
    let events = parse_events_jsonl(input).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].customer_id, "17");
    assert_eq!(events[0].timestamp, at(2025, 7, 2, 8, 0));
    assert_eq!(events[1].timestamp, at(2025, 7, 2, 10, 3));
    assert_eq!(events[1].customer_city.as_deref(), Some("Lund"));
    assert_eq!(events[2].page_count, 0);
    assert_eq!(events[2].timestamp, at(2025, 7, 3, 0, 0));
}

#[test]
fn negative_page_count_is_malformed() {
    let input = "{\"customerId\": 1, \"timestamp\": \"2025-07-02T10:00:00Z\", \"pageCount\": -1}";
    match parse_events_jsonl(input) {
        Err(ScanlyticsError::MalformedEvent { line, reason }) => {
            assert_eq!(line, Some(1));
            assert!(reason.contains("negative"), "{}", reason);
        }
        other => panic!("expected MalformedEvent, got {:?}", other),
    }
}

#[test]
fn missing_customer_id_is_malformed() {
    let input = "\n{\"timestamp\": \"2025-07-02T10:00:00Z\", \"pageCount\": 1}";
    let err = parse_events_jsonl(input).unwrap_err();
    assert!(matches!(err, ScanlyticsError::MalformedEvent { line: Some(2), .. }));

    let blank = "{\"customerId\": \"  \", \"timestamp\": \"2025-07-02T10:00:00Z\"}";
    assert!(matches!(
        parse_events_jsonl(blank),
        Err(ScanlyticsError::MalformedEvent { .. })
    ));
}

#[test]
fn unparsable_timestamp_is_malformed() {
    let input = "{\"customerId\": 1, \"timestamp\": \"last tuesday\", \"pageCount\": 1}";
    let err = parse_events_jsonl(input).unwrap_err();
    assert!(err.to_string().contains("last tuesday"));
    assert_eq!(err.exit_code(), 65);
}

#[test]
fn load_from_files() {
    let mut events = NamedTempFile::new().unwrap();
    writeln!(
        events,
        "{{\"customerId\": 1, \"timestamp\": \"2025-07-18T10:00:00Z\", \"pageCount\": 4}}"
    )
    .unwrap();
    let mut customers = NamedTempFile::new().unwrap();
    write!(customers, "[{{\"id\": 1, \"city\": \"Lund\", \"chain\": \"Länsfast\"}}]").unwrap();

    assert_eq!(load_events_jsonl(events.path()).unwrap().len(), 1);
    assert_eq!(load_customers_json(customers.path()).unwrap().len(), 1);

    let store = InMemoryStore::load(events.path(), Some(customers.path())).unwrap();
    assert_eq!(store.events()[0].customer_city.as_deref(), Some("Lund"));
    assert_eq!(store.events()[0].customer_chain.as_deref(), Some("Länsfast"));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_events_jsonl(std::path::Path::new("/nonexistent/scanlytics.jsonl")).unwrap_err();
    assert!(matches!(err, ScanlyticsError::Io(_)));
}

#[test]
fn customers_require_ids() {
    assert!(matches!(
        parse_customers_json(r#"[{"id": "", "city": "Lund"}]"#),
        Err(ScanlyticsError::MalformedCustomer(_))
    ));
    assert!(matches!(
        parse_customers_json("not json"),
        Err(ScanlyticsError::MalformedCustomer(_))
    ));
}

#[test]
fn store_joins_customer_dimensions_without_overriding_events() {
    let store = InMemoryStore::new(
        vec![
            ScanEvent::new("1", at(2025, 7, 1, 9, 0), 1),
            ScanEvent::new("1", at(2025, 7, 1, 9, 1), 1).with_city("Ystad"),
            ScanEvent::new("2", at(2025, 7, 1, 9, 2), 1),
        ],
        vec![Customer::new("1").with_city("Lund").with_chain("Länsfast")],
    );
    let events = store.events();
    assert_eq!(events[0].customer_city.as_deref(), Some("Lund"));
    assert_eq!(events[1].customer_city.as_deref(), Some("Ystad"));
    assert_eq!(events[2].customer_chain, None);
}

#[test]
fn store_pushes_down_window_and_dimensions() {
    let store = common::store();
    let spec = FilterSpec::for_chain("Länsfast")
        .with_time_window(TimeWindow::RollingDays(30))
        .with_city("Malmö");
    let events = store.scan_events(&spec, now()).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.customer_id == "2"));

    assert_eq!(store.history().unwrap().len(), 7);
    assert_eq!(store.customers().unwrap().len(), 5);
}
