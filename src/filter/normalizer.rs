use chrono::NaiveDate;
use tracing::{debug, warn};

use super::params::{present, RawParams};
use super::tiers::{ActivityTier, VolumeTier};
use super::window::{Quarter, TimeWindow};
use super::FilterSpec;
use crate::analytics::config::AnalyticsConfig;
use crate::calendar::YearMonth;

/// Longest rolling window accepted from `lastDays`; larger values are treated as absent.
pub const MAX_ROLLING_DAYS: u32 = 36_600;

/// Turns raw request parameters into a canonical [`FilterSpec`].
///
/// Normalization is total: malformed values are logged and dropped, and the
/// time window falls through to the next rule in the fixed precedence order:
///
/// 1. `lastDays` (`0` means today)
/// 2. `month` + `year`
/// 3. `quarter` + `year`
/// 4. `dateFrom` + `dateTo`
/// 5. the caller's default window
pub struct Normalizer {
    chain: String,
}

impl Normalizer {
    pub fn new(chain: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
        }
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self::new(config.chain.clone())
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn normalize(&self, raw: &RawParams, default_window: TimeWindow) -> FilterSpec {
        let time_window = self.time_window(raw).unwrap_or_else(|| {
            debug!("[filter] No usable time filter, using default: {}", default_window);
            default_window
        });

        let city = present(&raw.city).map(str::to_string);

        let volume_tier = present(&raw.volume_level).and_then(|v| {
            let tier = VolumeTier::parse(v);
            if tier.is_none() {
                warn!("[filter] Ignoring unknown volumeLevel '{}'", v);
            }
            tier
        });

        let customer_activity_tier = present(&raw.customer_activity).and_then(|v| {
            let tier = ActivityTier::parse(v);
            if tier.is_none() {
                warn!("[filter] Ignoring unknown customerActivity '{}'", v);
            }
            tier
        });

        FilterSpec {
            time_window,
            city,
            volume_tier,
            customer_activity_tier,
            chain: self.chain.clone(),
        }
    }

    fn time_window(&self, raw: &RawParams) -> Option<TimeWindow> {
        if let Some(days) = int_param::<u32>("lastDays", &raw.last_days) {
            if days > MAX_ROLLING_DAYS {
                warn!("[filter] lastDays={} exceeds {}, ignoring", days, MAX_ROLLING_DAYS);
            } else if days == 0 {
                return Some(TimeWindow::Today);
            } else {
                return Some(TimeWindow::RollingDays(days));
            }
        }

        let year = int_param::<i32>("year", &raw.year);

        if let (Some(month), Some(year)) = (int_param::<u32>("month", &raw.month), year) {
            match YearMonth::new(year, month) {
                Some(ym) => return Some(TimeWindow::CalendarMonth(ym)),
                None => warn!("[filter] Ignoring out-of-range month {}/{}", month, year),
            }
        }

        if let (Some(quarter), Some(year)) = (int_param::<u8>("quarter", &raw.quarter), year) {
            match Quarter::new(quarter, year) {
                Some(q) => return Some(TimeWindow::Quarter(q)),
                None => warn!("[filter] Ignoring out-of-range quarter Q{} {}", quarter, year),
            }
        }

        if let (Some(from), Some(to)) = (
            date_param("dateFrom", &raw.date_from),
            date_param("dateTo", &raw.date_to),
        ) {
            if from <= to {
                return Some(TimeWindow::ExplicitRange { from, to });
            }
            warn!("[filter] Ignoring inverted date range {} > {}", from, to);
        }

        None
    }
}

fn int_param<T: std::str::FromStr>(name: &str, value: &Option<String>) -> Option<T> {
    let raw = present(value)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("[filter] Ignoring non-integer {}='{}'", name, raw);
            None
        }
    }
}

fn date_param(name: &str, value: &Option<String>) -> Option<NaiveDate> {
    let raw = present(value)?;
    // Accept full timestamps too; only the date part matters.
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            warn!("[filter] Ignoring unparsable {}='{}'", name, raw);
            None
        }
    }
}
