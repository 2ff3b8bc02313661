use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{CustomerId, ScanEvent};

/// Per-event page volume bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTier {
    /// 1 to 10 pages.
    Low,
    /// 11 to 50 pages.
    Medium,
    /// More than 50 pages.
    High,
}

impl VolumeTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(VolumeTier::Low),
            "medium" => Some(VolumeTier::Medium),
            "high" => Some(VolumeTier::High),
            _ => None,
        }
    }

    /// Tier of a page count. Zero pages belong to no tier.
    pub fn of(page_count: u32) -> Option<Self> {
        match page_count {
            0 => None,
            1..=10 => Some(VolumeTier::Low),
            11..=50 => Some(VolumeTier::Medium),
            _ => Some(VolumeTier::High),
        }
    }

    pub fn matches(&self, page_count: u32) -> bool {
        VolumeTier::of(page_count) == Some(*self)
    }
}

pub const VERY_ACTIVE_DAYS: i64 = 7;
pub const ACTIVE_DAYS: i64 = 30;

/// Recency class of a customer, judged on its whole scan history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    /// At least one scan within the last 7 days.
    VeryActive,
    /// A scan within the last 30 days, none within the last 7.
    Active,
    /// No scan within the last 30 days.
    Inactive,
}

impl ActivityTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "very_active" | "veryactive" => Some(ActivityTier::VeryActive),
            "active" => Some(ActivityTier::Active),
            "inactive" => Some(ActivityTier::Inactive),
            _ => None,
        }
    }

    pub fn classify(last_scan: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(last) = last_scan else {
            return ActivityTier::Inactive;
        };
        if last >= now - Duration::days(VERY_ACTIVE_DAYS) {
            ActivityTier::VeryActive
        } else if last >= now - Duration::days(ACTIVE_DAYS) {
            ActivityTier::Active
        } else {
            ActivityTier::Inactive
        }
    }
}

/// Latest scan per customer over an unwindowed history, pinned to one instant.
#[derive(Debug, Clone)]
pub struct ActivityIndex {
    last_scan: HashMap<CustomerId, DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl ActivityIndex {
    pub fn from_history<'a, I>(history: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a ScanEvent>,
    {
        let mut last_scan: HashMap<CustomerId, DateTime<Utc>> = HashMap::new();
        for event in history {
            last_scan
                .entry(event.customer_id.clone())
                .and_modify(|ts| {
                    if event.timestamp > *ts {
                        *ts = event.timestamp;
                    }
                })
                .or_insert(event.timestamp);
        }
        Self { last_scan, now }
    }

    pub fn last_scan(&self, customer_id: &str) -> Option<DateTime<Utc>> {
        self.last_scan.get(customer_id).copied()
    }

    pub fn tier_of(&self, customer_id: &str) -> ActivityTier {
        ActivityTier::classify(self.last_scan(customer_id), self.now)
    }

    /// Whether the customer scanned within the last `days` days.
    pub fn scanned_within(&self, customer_id: &str, days: i64) -> bool {
        self.last_scan(customer_id)
            .map_or(false, |ts| ts >= self.now - Duration::days(days))
    }
}
