//! Filter normalization: raw request parameters in, one canonical
//! [`FilterSpec`] out, plus the compiled predicate applied to scan events.

pub mod compiled;
pub mod normalizer;
pub mod params;
pub mod tiers;
pub mod window;

pub use compiled::CompiledFilter;
pub use normalizer::Normalizer;
pub use params::RawParams;
pub use tiers::{ActivityIndex, ActivityTier, VolumeTier};
pub use window::{Quarter, TimeBounds, TimeWindow};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ScanEvent;

/// Canonical, conflict-free filter. At most one time window is active, and the
/// chain scope is always set from configuration, never from request input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub time_window: TimeWindow,
    pub city: Option<String>,
    pub volume_tier: Option<VolumeTier>,
    pub customer_activity_tier: Option<ActivityTier>,
    pub chain: String,
}

impl FilterSpec {
    /// Spec scoped to `chain` with no other restriction.
    pub fn for_chain(chain: impl Into<String>) -> Self {
        Self {
            time_window: TimeWindow::Unbounded,
            city: None,
            volume_tier: None,
            customer_activity_tier: None,
            chain: chain.into(),
        }
    }

    pub fn with_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = time_window;
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_volume_tier(mut self, tier: VolumeTier) -> Self {
        self.volume_tier = Some(tier);
        self
    }

    pub fn with_activity_tier(mut self, tier: ActivityTier) -> Self {
        self.customer_activity_tier = Some(tier);
        self
    }

    /// Resolve against `now` and the unwindowed `history` (only read when an activity tier is set).
    pub fn compile<'h, I>(&self, now: DateTime<Utc>, history: I) -> CompiledFilter<'_>
    where
        I: IntoIterator<Item = &'h ScanEvent>,
    {
        CompiledFilter::new(self, now, history)
    }
}
