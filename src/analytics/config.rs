use chrono::Duration;

use crate::calendar::MonthLabels;

pub const DEFAULT_CHAIN: &str = "Länsfast";
pub const DEFAULT_BATCH_GAP_MINUTES: i64 = 5;
pub const DEFAULT_CITY_LIMIT: usize = 15;

/// Configuration for the analytics engine, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Chain every report is scoped to. Not settable per request.
    pub chain: String,
    /// Reference gap threshold for batch detection. Reports still take the
    /// threshold explicitly; a differing value is logged as inconsistent.
    pub batch_gap: Duration,
    /// Month abbreviation table for series labels.
    pub month_labels: MonthLabels,
    /// Row limit for the city ranking when any filter is active.
    pub city_limit: usize,
    /// How long a cached report stays fresh (seconds).
    pub cache_ttl_secs: u64,
    /// Maximum number of cached reports before the oldest is evicted.
    pub cache_capacity: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
            batch_gap: Duration::minutes(DEFAULT_BATCH_GAP_MINUTES),
            month_labels: MonthLabels::English,
            city_limit: DEFAULT_CITY_LIMIT,
            cache_ttl_secs: 300,
            cache_capacity: 100,
        }
    }
}

impl AnalyticsConfig {
    /// Load config from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            chain: std::env::var("SCANLYTICS_CHAIN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.chain),
            batch_gap: std::env::var("SCANLYTICS_BATCH_GAP_MINUTES")
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|m| *m >= 0)
                .map(Duration::minutes)
                .unwrap_or(defaults.batch_gap),
            month_labels: std::env::var("SCANLYTICS_MONTH_LABELS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.month_labels),
            city_limit: std::env::var("SCANLYTICS_CITY_LIMIT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.city_limit),
            cache_ttl_secs: std::env::var("SCANLYTICS_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            cache_capacity: std::env::var("SCANLYTICS_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.cache_capacity),
        }
    }

    /// Batch gap in whole minutes, as reported alongside efficiency results.
    pub fn batch_gap_minutes(&self) -> i64 {
        self.batch_gap.num_minutes()
    }
}
