//! Dashboard reports built from the engine's components.
//!
//! Each report is a pure function of a [`FilterSpec`], the events a source
//! returned, the customer directory and one evaluation instant. [`ReportEngine`]
//! wires them to the collaborators and the optional [`ReportCache`].

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::cache::{CacheKey, ReportCache};
use super::config::AnalyticsConfig;
use super::series::{self, MonthWindow, TimeSeries, ValueFn};
use super::session::{self, SessionResult};
use super::stats::{self, ActivityCounts, CityRow, CityStatus, Composed};
use crate::calendar::MonthLabels;
use crate::error::{Result, ScanlyticsError};
use crate::filter::tiers::{ActivityIndex, ACTIVE_DAYS};
use crate::filter::{FilterSpec, Normalizer, RawParams, TimeWindow};
use crate::source::{CustomerDirectory, EventSource};
use crate::types::{Customer, ScanEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Statistics,
    CustomerActivity,
    ScanningEfficiency,
    ScanningActivity,
    ScanningActivityPages,
    CustomersByCity,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::Statistics,
        ReportKind::CustomerActivity,
        ReportKind::ScanningEfficiency,
        ReportKind::ScanningActivity,
        ReportKind::ScanningActivityPages,
        ReportKind::CustomersByCity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Statistics => "statistics",
            ReportKind::CustomerActivity => "customer_activity",
            ReportKind::ScanningEfficiency => "scanning_efficiency",
            ReportKind::ScanningActivity => "scanning_activity",
            ReportKind::ScanningActivityPages => "scanning_activity_pages",
            ReportKind::CustomersByCity => "customers_by_city",
        }
    }

    /// Window used when the request names none.
    pub fn default_window(&self, now: DateTime<Utc>) -> TimeWindow {
        match self {
            ReportKind::ScanningEfficiency => TimeWindow::current_month(now),
            // The rolling 12 months ignore the window; only dimensions apply.
            ReportKind::ScanningActivity | ReportKind::ScanningActivityPages => {
                TimeWindow::Unbounded
            }
            ReportKind::Statistics | ReportKind::CustomerActivity | ReportKind::CustomersByCity => {
                TimeWindow::RollingDays(30)
            }
        }
    }

    fn needs_customers(&self) -> bool {
        matches!(
            self,
            ReportKind::Statistics | ReportKind::CustomerActivity | ReportKind::CustomersByCity
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ScanlyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ScanlyticsError::UnknownReport(s.to_string()))
    }
}

/// Per-call knobs that are not part of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub gap_threshold: Duration,
    /// Row limit for the city ranking; `None` keeps every city.
    pub city_limit: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            gap_threshold: Duration::minutes(session::SHORT_BATCH_GAP_MINUTES),
            city_limit: None,
        }
    }
}

impl RunOptions {
    /// Configured gap, and the city limit only when the request carries any filter.
    pub fn for_request(config: &AnalyticsConfig, raw: &RawParams) -> Self {
        Self {
            gap_threshold: config.batch_gap,
            city_limit: raw.has_filters().then_some(config.city_limit),
        }
    }

    pub fn with_gap_threshold(mut self, gap: Duration) -> Self {
        self.gap_threshold = gap;
        self
    }

    pub fn with_city_limit(mut self, limit: Option<usize>) -> Self {
        self.city_limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub window: String,
    pub total_customers: u64,
    pub active_customers: u64,
    pub total_pages: u64,
    pub total_scans: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivityReport {
    pub window: String,
    pub active_customers: u64,
    pub inactive_customers: u64,
    pub total_customers: u64,
    pub chart: Composed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyReport {
    pub window: String,
    pub gap_minutes: i64,
    #[serde(flatten)]
    pub session: SessionResult,
    pub chart: Composed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub months: MonthWindow,
    pub value: ValueFn,
    pub series: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityReport {
    pub window: String,
    pub limit: Option<usize>,
    pub cities: Vec<CityRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Statistics(StatisticsReport),
    CustomerActivity(CustomerActivityReport),
    ScanningEfficiency(EfficiencyReport),
    ScanningActivity(ActivityReport),
    CustomersByCity(CityReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Statistics(_) => ReportKind::Statistics,
            Report::CustomerActivity(_) => ReportKind::CustomerActivity,
            Report::ScanningEfficiency(_) => ReportKind::ScanningEfficiency,
            Report::ScanningActivity(r) if r.value == ValueFn::SumPages => {
                ReportKind::ScanningActivityPages
            }
            Report::ScanningActivity(_) => ReportKind::ScanningActivity,
            Report::CustomersByCity(_) => ReportKind::CustomersByCity,
        }
    }
}

/// Total customers in scope, distinct customers with a matching scan, and
/// page and scan totals over the matching scans.
pub fn statistics(
    spec: &FilterSpec,
    events: &[ScanEvent],
    customers: &[Customer],
    history: &[ScanEvent],
    now: DateTime<Utc>,
) -> StatisticsReport {
    let filter = spec.compile(now, history);
    let matched = filter.apply(events);

    let total_customers = customers.iter().filter(|c| filter.matches_customer(c)).count() as u64;
    let active_customers = matched
        .iter()
        .map(|e| e.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    StatisticsReport {
        window: spec.time_window.to_string(),
        total_customers,
        active_customers,
        total_pages: matched.iter().map(|e| e.page_count as u64).sum(),
        total_scans: matched.len() as u64,
    }
}

pub fn customer_activity(
    spec: &FilterSpec,
    events: &[ScanEvent],
    customers: &[Customer],
    history: &[ScanEvent],
    now: DateTime<Utc>,
) -> CustomerActivityReport {
    let stats = statistics(spec, events, customers, history, now);
    let counts = ActivityCounts::new(stats.active_customers, stats.total_customers);
    CustomerActivityReport {
        window: stats.window,
        active_customers: counts.active,
        inactive_customers: counts.inactive(),
        total_customers: counts.total,
        chart: stats::compose(counts),
    }
}

pub fn scanning_efficiency(
    spec: &FilterSpec,
    events: &[ScanEvent],
    history: &[ScanEvent],
    now: DateTime<Utc>,
    gap_threshold: Duration,
) -> EfficiencyReport {
    let filter = spec.compile(now, history);
    let session = session::classify(filter.apply(events), gap_threshold);
    EfficiencyReport {
        window: spec.time_window.to_string(),
        gap_minutes: gap_threshold.num_minutes(),
        chart: stats::compose_efficiency(&session),
        session,
    }
}

/// Rolling 12 months ending with the month of `now`. The filter's time window
/// is ignored; its dimensions still apply.
pub fn scanning_activity(
    spec: &FilterSpec,
    events: &[ScanEvent],
    history: &[ScanEvent],
    now: DateTime<Utc>,
    value: ValueFn,
    labels: MonthLabels,
) -> ActivityReport {
    let months = MonthWindow::rolling_12(now);
    let filter = spec.compile(now, history);
    let series = series::monthly(
        events.iter().filter(|e| filter.matches_dimensions(e)),
        &months,
        value,
        labels,
    );
    ActivityReport {
        months,
        value,
        series,
    }
}

/// One row per city of the customers in scope. Cities without scans are kept
/// with zero counts; blank city names are skipped.
pub fn customers_by_city(
    spec: &FilterSpec,
    events: &[ScanEvent],
    customers: &[Customer],
    history: &[ScanEvent],
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> CityReport {
    let filter = spec.compile(now, history);
    let recency = ActivityIndex::from_history(history, now);

    struct Tally<'a> {
        scans: u64,
        pages: u64,
        members: HashSet<&'a str>,
    }

    impl Tally<'_> {
        fn empty() -> Self {
            Self {
                scans: 0,
                pages: 0,
                members: HashSet::new(),
            }
        }
    }

    let mut cities: IndexMap<&str, Tally> = IndexMap::new();

    for customer in customers.iter().filter(|c| filter.matches_customer(c)) {
        let Some(city) = city_name(customer.city.as_deref()) else {
            continue;
        };
        cities
            .entry(city)
            .or_insert_with(Tally::empty)
            .members
            .insert(customer.id.as_str());
    }

    for event in filter.apply(events) {
        let Some(city) = city_name(event.customer_city.as_deref()) else {
            continue;
        };
        let entry = cities.entry(city).or_insert_with(Tally::empty);
        entry.scans += 1;
        entry.pages += event.page_count as u64;
        entry.members.insert(event.customer_id.as_str());
    }

    let rows: Vec<CityRow> = cities
        .into_iter()
        .map(|(city, tally)| CityRow {
            city: city.to_string(),
            scanned_documents: tally.scans,
            total_pages: tally.pages,
            status: CityStatus::from_active(
                tally
                    .members
                    .iter()
                    .any(|id| recency.scanned_within(id, ACTIVE_DAYS)),
            ),
        })
        .collect();

    CityReport {
        window: spec.time_window.to_string(),
        limit,
        cities: stats::rank_cities(rows, limit),
    }
}

fn city_name(city: Option<&str>) -> Option<&str> {
    city.map(str::trim).filter(|c| !c.is_empty())
}

/// Runs reports against injected collaborators.
pub struct ReportEngine {
    config: AnalyticsConfig,
    normalizer: Normalizer,
    cache: Option<ReportCache>,
}

impl ReportEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            normalizer: Normalizer::from_config(&config),
            config,
            cache: None,
        }
    }

    /// Keep computed reports in a TTL cache sized from the config.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(ReportCache::new(
            std::time::Duration::from_secs(self.config.cache_ttl_secs),
            self.config.cache_capacity,
        ));
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&ReportCache> {
        self.cache.as_ref()
    }

    /// Normalize request parameters with the report's default window.
    pub fn normalize(&self, raw: &RawParams, kind: ReportKind, now: DateTime<Utc>) -> FilterSpec {
        self.normalizer.normalize(raw, kind.default_window(now))
    }

    /// Normalize `raw` and run `kind` with request-derived options.
    pub fn run_request(
        &self,
        kind: ReportKind,
        raw: &RawParams,
        source: &dyn EventSource,
        directory: &dyn CustomerDirectory,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        let spec = self.normalize(raw, kind, now);
        let options = RunOptions::for_request(&self.config, raw);
        self.run(kind, &spec, options, source, directory, now)
    }

    pub fn run(
        &self,
        kind: ReportKind,
        spec: &FilterSpec,
        options: RunOptions,
        source: &dyn EventSource,
        directory: &dyn CustomerDirectory,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        let key = self.cache.as_ref().map(|_| CacheKey::new(kind, spec, &options, now));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(report) = cache.get(key) {
                return Ok(report);
            }
        }

        let report = self.compute(kind, spec, options, source, directory, now)?;

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, report.clone());
        }
        Ok(report)
    }

    fn compute(
        &self,
        kind: ReportKind,
        spec: &FilterSpec,
        options: RunOptions,
        source: &dyn EventSource,
        directory: &dyn CustomerDirectory,
        now: DateTime<Utc>,
    ) -> Result<Report> {
        tracing::debug!("[reports] {} for {} ({})", kind, spec.chain, spec.time_window);

        let events = match kind {
            ReportKind::ScanningActivity | ReportKind::ScanningActivityPages => {
                let months = MonthWindow::rolling_12(now);
                let pushdown = spec.clone().with_time_window(TimeWindow::ExplicitRange {
                    from: months.start.first_day(),
                    to: months.end.last_day(),
                });
                source.scan_events(&pushdown, now)?
            }
            _ => source.scan_events(spec, now)?,
        };

        let needs_history =
            spec.customer_activity_tier.is_some() || kind == ReportKind::CustomersByCity;
        let history = if needs_history {
            directory.history()?
        } else {
            Vec::new()
        };
        let customers = if kind.needs_customers() {
            directory.customers()?
        } else {
            Vec::new()
        };

        let labels = self.config.month_labels;
        let report = match kind {
            ReportKind::Statistics => {
                Report::Statistics(statistics(spec, &events, &customers, &history, now))
            }
            ReportKind::CustomerActivity => Report::CustomerActivity(customer_activity(
                spec, &events, &customers, &history, now,
            )),
            ReportKind::ScanningEfficiency => {
                if options.gap_threshold != self.config.batch_gap {
                    tracing::warn!(
                        "[reports] InconsistentThreshold: gap {}m differs from configured {}m",
                        options.gap_threshold.num_minutes(),
                        self.config.batch_gap_minutes()
                    );
                }
                Report::ScanningEfficiency(scanning_efficiency(
                    spec,
                    &events,
                    &history,
                    now,
                    options.gap_threshold,
                ))
            }
            ReportKind::ScanningActivity => Report::ScanningActivity(scanning_activity(
                spec,
                &events,
                &history,
                now,
                ValueFn::Count,
                labels,
            )),
            ReportKind::ScanningActivityPages => Report::ScanningActivity(scanning_activity(
                spec,
                &events,
                &history,
                now,
                ValueFn::SumPages,
                labels,
            )),
            ReportKind::CustomersByCity => Report::CustomersByCity(customers_by_city(
                spec,
                &events,
                &customers,
                &history,
                now,
                options.city_limit,
            )),
        };
        Ok(report)
    }
}
