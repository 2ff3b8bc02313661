use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::reports::{Report, ReportKind, RunOptions};
use crate::filter::FilterSpec;

/// Cache key: the normalized spec plus everything else that changes the result.
/// Raw request parameters never reach the key.
///
/// Rolling windows, activity tiers and city status all resolve against the
/// evaluation instant, so `now` is part of the key. Callers that want hits
/// across requests pass a truncated instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ReportKind,
    pub spec: FilterSpec,
    pub now: DateTime<Utc>,
    pub gap_threshold: chrono::Duration,
    pub city_limit: Option<usize>,
}

impl CacheKey {
    pub fn new(
        kind: ReportKind,
        spec: &FilterSpec,
        options: &RunOptions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            spec: spec.clone(),
            now,
            gap_threshold: options.gap_threshold,
            city_limit: options.city_limit,
        }
    }
}

struct CachedReport {
    report: Report,
    stored_at: Instant,
}

/// Bounded TTL cache for computed reports. When full, the oldest insertion is
/// evicted first.
pub struct ReportCache {
    entries: Mutex<IndexMap<CacheKey, CachedReport>>,
    ttl: Duration,
    capacity: usize,
}

impl ReportCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity.min(1024))),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Report> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = entries
            .get(key)
            .map(|cached| cached.stored_at.elapsed() < self.ttl)?;
        if !fresh {
            entries.shift_remove(key);
            tracing::debug!("[cache] expired {} entry", key.kind);
            return None;
        }
        tracing::debug!("[cache] hit {} ({})", key.kind, key.spec.time_window);
        entries.get(key).map(|cached| cached.report.clone())
    }

    pub fn insert(&self, key: CacheKey, report: Report) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Re-inserting moves the key to the back so it counts as newest.
        entries.shift_remove(&key);
        while entries.len() >= self.capacity {
            if entries.shift_remove_index(0).is_none() {
                break;
            }
            tracing::debug!("[cache] evicted oldest entry");
        }
        entries.insert(
            key,
            CachedReport {
                report,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
