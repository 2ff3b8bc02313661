//! Percentages, active/inactive splits and city rankings.

use serde::Serialize;

use super::session::SessionResult;

/// `round(part * 100 / whole)` with halves rounded up, clamped to 100.
/// Returns 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let rounded = (part * 200 + whole) / (whole * 2);
    rounded.min(100) as u8
}

/// Active customers out of a total. Missing counts from the source are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub active: u64,
    pub total: u64,
}

impl ActivityCounts {
    pub fn new(active: u64, total: u64) -> Self {
        Self { active, total }
    }

    pub fn from_options(active: Option<u64>, total: Option<u64>) -> Self {
        Self {
            active: active.unwrap_or(0),
            total: total.unwrap_or(0),
        }
    }

    pub fn inactive(&self) -> u64 {
        self.total.saturating_sub(self.active)
    }
}

/// A percentage plus the two-slice `[share, 100 - share]` series used by pie charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Composed {
    pub percentage: u8,
    pub series: [u8; 2],
}

impl Composed {
    fn of(percentage: u8) -> Self {
        let percentage = percentage.min(100);
        Self {
            percentage,
            series: [percentage, 100 - percentage],
        }
    }
}

pub fn compose(counts: ActivityCounts) -> Composed {
    Composed::of(percent(counts.active, counts.total))
}

pub fn compose_efficiency(result: &SessionResult) -> Composed {
    Composed::of(result.efficiency_percent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CityStatus {
    Active,
    Inactive,
}

impl CityStatus {
    pub fn from_active(active: bool) -> Self {
        if active {
            CityStatus::Active
        } else {
            CityStatus::Inactive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRow {
    pub city: String,
    pub scanned_documents: u64,
    pub total_pages: u64,
    pub status: CityStatus,
}

/// Sort by `scanned_documents` descending, keeping input order among ties,
/// then keep the first `limit` rows.
pub fn rank_cities(mut rows: Vec<CityRow>, limit: Option<usize>) -> Vec<CityRow> {
    rows.sort_by(|a, b| b.scanned_documents.cmp(&a.scanned_documents));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
