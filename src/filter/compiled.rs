use chrono::{DateTime, Utc};

use super::tiers::ActivityIndex;
use super::window::TimeBounds;
use super::FilterSpec;
use crate::types::{Customer, ScanEvent};

/// A [`FilterSpec`] resolved against one evaluation instant and, when an
/// activity tier is requested, the customers' unwindowed history.
pub struct CompiledFilter<'a> {
    spec: &'a FilterSpec,
    bounds: TimeBounds,
    activity: Option<ActivityIndex>,
}

impl<'a> CompiledFilter<'a> {
    pub fn new<'h, I>(spec: &'a FilterSpec, now: DateTime<Utc>, history: I) -> Self
    where
        I: IntoIterator<Item = &'h ScanEvent>,
    {
        let activity = spec
            .customer_activity_tier
            .map(|_| ActivityIndex::from_history(history, now));
        Self {
            spec,
            bounds: spec.time_window.bounds(now),
            activity,
        }
    }

    pub fn spec(&self) -> &FilterSpec {
        self.spec
    }

    pub fn bounds(&self) -> TimeBounds {
        self.bounds
    }

    /// Chain, city, volume tier and activity tier; everything except time.
    pub fn matches_dimensions(&self, event: &ScanEvent) -> bool {
        if event.customer_chain.as_deref() != Some(self.spec.chain.as_str()) {
            return false;
        }
        if let Some(ref city) = self.spec.city {
            if event.customer_city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(tier) = self.spec.volume_tier {
            if !tier.matches(event.page_count) {
                return false;
            }
        }
        self.matches_activity(&event.customer_id)
    }

    pub fn matches(&self, event: &ScanEvent) -> bool {
        self.bounds.contains(event.timestamp) && self.matches_dimensions(event)
    }

    /// Customer-level part of the filter: chain, city and activity tier.
    pub fn matches_customer(&self, customer: &Customer) -> bool {
        if customer.chain.as_deref() != Some(self.spec.chain.as_str()) {
            return false;
        }
        if let Some(ref city) = self.spec.city {
            if customer.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        self.matches_activity(&customer.id)
    }

    fn matches_activity(&self, customer_id: &str) -> bool {
        match (self.spec.customer_activity_tier, &self.activity) {
            (Some(tier), Some(index)) => index.tier_of(customer_id) == tier,
            _ => true,
        }
    }

    pub fn apply<'e, I>(&self, events: I) -> Vec<&'e ScanEvent>
    where
        I: IntoIterator<Item = &'e ScanEvent>,
    {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}
