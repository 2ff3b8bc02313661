//! Batch-session classification.
//!
//! A scan is a batch member when the same customer's previous scan happened at
//! most `gap_threshold` earlier. Events are partitioned by customer and sorted
//! by timestamp before the scan, so the result does not depend on how events
//! from different customers are interleaved in the input.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::stats::percent;
use crate::types::ScanEvent;

/// Gap used by the dashboard's efficiency card.
pub const SHORT_BATCH_GAP_MINUTES: i64 = 5;
/// Gap used by the older dashboard route for the same metric.
pub const LONG_BATCH_GAP_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub total_scans: u64,
    pub batch_scans: u64,
    pub single_scans: u64,
    /// `round(batch * 100 / total)`, 0 for an empty input.
    pub efficiency_percent: u8,
    pub total_pages: u64,
}

/// One event with its batch flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledScan<'a> {
    pub event: &'a ScanEvent,
    pub is_batch: bool,
    /// Time since the same customer's previous scan.
    pub gap: Option<Duration>,
}

/// Label every event, ordered by customer and then timestamp.
///
/// Customers appear in order of first appearance in the input; events with
/// equal timestamps keep their input order.
pub fn label_scans<'a, I>(events: I, gap_threshold: Duration) -> Vec<LabeledScan<'a>>
where
    I: IntoIterator<Item = &'a ScanEvent>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut partitions: HashMap<&str, Vec<&'a ScanEvent>> = HashMap::new();
    for event in events {
        let bucket = partitions.entry(event.customer_id.as_str()).or_default();
        if bucket.is_empty() {
            order.push(event.customer_id.as_str());
        }
        bucket.push(event);
    }

    let mut labeled = Vec::new();
    for customer in order {
        let Some(mut scans) = partitions.remove(customer) else {
            continue;
        };
        scans.sort_by_key(|e| e.timestamp);

        let mut prev: Option<DateTime<Utc>> = None;
        for event in scans {
            let gap = prev.map(|p| event.timestamp - p);
            labeled.push(LabeledScan {
                event,
                is_batch: gap.map_or(false, |g| g <= gap_threshold),
                gap,
            });
            prev = Some(event.timestamp);
        }
    }
    labeled
}

/// Classify `events` into batch and single scans and derive efficiency.
pub fn classify<'a, I>(events: I, gap_threshold: Duration) -> SessionResult
where
    I: IntoIterator<Item = &'a ScanEvent>,
{
    let labeled = label_scans(events, gap_threshold);

    let total_scans = labeled.len() as u64;
    let batch_scans = labeled.iter().filter(|l| l.is_batch).count() as u64;
    let total_pages: u64 = labeled.iter().map(|l| l.event.page_count as u64).sum();

    let result = SessionResult {
        total_scans,
        batch_scans,
        single_scans: total_scans - batch_scans,
        efficiency_percent: percent(batch_scans, total_scans),
        total_pages,
    };

    tracing::debug!(
        "[session] {} scans, {} batch, {}% efficiency (gap {}m)",
        result.total_scans,
        result.batch_scans,
        result.efficiency_percent,
        gap_threshold.num_minutes()
    );

    result
}
