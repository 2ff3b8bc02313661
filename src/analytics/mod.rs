//! Scan analytics: batch sessions, monthly series, composed percentages and
//! the dashboard reports built from them.
//!
//! Everything here is computed per call from the events handed in. The only
//! state is the optional [`ReportCache`], owned by whoever owns the
//! [`ReportEngine`].

pub mod cache;
pub mod config;
pub mod reports;
pub mod series;
pub mod session;
pub mod stats;

pub use cache::{CacheKey, ReportCache};
pub use config::AnalyticsConfig;
pub use reports::{Report, ReportEngine, ReportKind, RunOptions};
pub use series::{materialize, MonthWindow, SeriesPoint, TimeSeries, ValueFn};
pub use session::{classify, SessionResult};
pub use stats::{compose, percent, rank_cities, ActivityCounts, CityRow, CityStatus, Composed};
