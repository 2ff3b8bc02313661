//! # Scanlytics
//!
//! Scan activity analytics for a document-scanning dashboard. Turns loose
//! request parameters into one canonical filter, detects batch scanning
//! sessions, builds zero-filled monthly series and composes the percentages
//! the dashboard cards show.
//!
//! The engine does no I/O of its own. Events and customers come in through
//! the [`source::EventSource`] and [`source::CustomerDirectory`] traits; the
//! [`source::InMemoryStore`] implements both for files and tests.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use scanlytics::analytics::{classify, stats};
//! use scanlytics::filter::{Normalizer, RawParams, TimeWindow};
//! use scanlytics::ScanEvent;
//!
//! let normalizer = Normalizer::new("Länsfast");
//! let raw = RawParams::from_query("quarter=2&year=2024");
//! let spec = normalizer.normalize(&raw, TimeWindow::RollingDays(30));
//! assert_eq!(spec.time_window.to_string(), "Q2 2024");
//!
//! let t = |h, m| Utc.with_ymd_and_hms(2024, 5, 2, h, m, 0).unwrap();
//! let events = vec![
//!     ScanEvent::new("1", t(10, 0), 5),
//!     ScanEvent::new("1", t(10, 3), 5),
//!     ScanEvent::new("1", t(11, 0), 3),
//! ];
//! let result = classify(&events, chrono::Duration::minutes(5));
//! assert_eq!((result.batch_scans, result.efficiency_percent), (1, 33));
//! assert_eq!(stats::compose_efficiency(&result).series, [33, 67]);
//! ```
//!
//! ## Reports
//!
//! ```rust
//! use chrono::Utc;
//! use scanlytics::analytics::{AnalyticsConfig, ReportEngine, ReportKind};
//! use scanlytics::filter::RawParams;
//! use scanlytics::source::InMemoryStore;
//!
//! # fn main() -> scanlytics::Result<()> {
//! let store = InMemoryStore::default();
//! let engine = ReportEngine::new(AnalyticsConfig::default()).with_cache();
//! let raw = RawParams::from_query("lastDays=7");
//! let report = engine.run_request(ReportKind::Statistics, &raw, &store, &store, Utc::now())?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod calendar;
pub mod error;
pub mod filter;
pub mod source;
pub mod types;

pub use analytics::{AnalyticsConfig, Report, ReportEngine, ReportKind};
pub use calendar::{MonthLabels, YearMonth};
pub use error::{Result, ScanlyticsError};
pub use filter::{FilterSpec, Normalizer, RawParams, TimeWindow};
pub use types::*;
