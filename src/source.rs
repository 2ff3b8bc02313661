//! Collaborators that feed the engine: where scan events and customers come from.
//!
//! The engine never trusts a source to have filtered correctly. Whatever an
//! [`EventSource`] pushes down is re-applied by the report, so a source that
//! ignores the filter entirely still produces identical results.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, ScanlyticsError};
use crate::filter::FilterSpec;
use crate::types::{Customer, ScanEvent, ScanRecord};

pub trait EventSource {
    /// Events that may match `spec` at instant `now`. Returning a superset is allowed.
    fn scan_events(&self, spec: &FilterSpec, now: DateTime<Utc>) -> Result<Vec<ScanEvent>>;
}

pub trait CustomerDirectory {
    fn customers(&self) -> Result<Vec<Customer>>;

    /// Every known scan event, without any time window. Activity tiers are
    /// evaluated against this.
    fn history(&self) -> Result<Vec<ScanEvent>>;
}

/// Events and customers held in memory, as loaded from files or built in tests.
///
/// Events lacking a city or chain inherit them from the customer record with
/// the same id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    events: Vec<ScanEvent>,
    customers: Vec<Customer>,
}

impl InMemoryStore {
    pub fn new(events: Vec<ScanEvent>, customers: Vec<Customer>) -> Self {
        let by_id: HashMap<&str, &Customer> =
            customers.iter().map(|c| (c.id.as_str(), c)).collect();

        let events = events
            .into_iter()
            .map(|mut event| {
                if let Some(customer) = by_id.get(event.customer_id.as_str()) {
                    if event.customer_city.is_none() {
                        event.customer_city = customer.city.clone();
                    }
                    if event.customer_chain.is_none() {
                        event.customer_chain = customer.chain.clone();
                    }
                }
                event
            })
            .collect();

        Self { events, customers }
    }

    /// Load from a JSON Lines events file and an optional JSON customers file.
    pub fn load(events_path: &Path, customers_path: Option<&Path>) -> Result<Self> {
        let events = load_events_jsonl(events_path)?;
        let customers = match customers_path {
            Some(path) => load_customers_json(path)?,
            None => Vec::new(),
        };
        tracing::info!(
            "[source] loaded {} events, {} customers",
            events.len(),
            customers.len()
        );
        Ok(Self::new(events, customers))
    }

    pub fn events(&self) -> &[ScanEvent] {
        &self.events
    }

    pub fn customer_list(&self) -> &[Customer] {
        &self.customers
    }
}

impl EventSource for InMemoryStore {
    fn scan_events(&self, spec: &FilterSpec, now: DateTime<Utc>) -> Result<Vec<ScanEvent>> {
        // Activity tiers need the directory's history; leave them to the engine.
        let mut pushdown = spec.clone();
        pushdown.customer_activity_tier = None;
        let filter = pushdown.compile(now, std::iter::empty::<&ScanEvent>());

        let matched: Vec<ScanEvent> = self
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        tracing::debug!(
            "[source] pushdown kept {}/{} events",
            matched.len(),
            self.events.len()
        );
        Ok(matched)
    }
}

impl CustomerDirectory for InMemoryStore {
    fn customers(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.clone())
    }

    fn history(&self) -> Result<Vec<ScanEvent>> {
        Ok(self.events.clone())
    }
}

/// Parse JSON Lines scan events. Blank lines are skipped; the first bad line
/// fails the whole input with its 1-based line number.
pub fn parse_events_jsonl(input: &str) -> Result<Vec<ScanEvent>> {
    let mut events = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ScanRecord = serde_json::from_str(line)
            .map_err(|e| ScanlyticsError::malformed(e.to_string()).at_line(line_no))?;
        let event = ScanEvent::try_from(record).map_err(|e| e.at_line(line_no))?;
        events.push(event);
    }
    Ok(events)
}

pub fn load_events_jsonl(path: &Path) -> Result<Vec<ScanEvent>> {
    let content = std::fs::read_to_string(path)?;
    parse_events_jsonl(&content)
}

/// Parse a JSON array of customers.
pub fn parse_customers_json(input: &str) -> Result<Vec<Customer>> {
    let customers: Vec<Customer> = serde_json::from_str(input)
        .map_err(|e| ScanlyticsError::MalformedCustomer(e.to_string()))?;
    if let Some(pos) = customers.iter().position(|c| c.id.trim().is_empty()) {
        return Err(ScanlyticsError::MalformedCustomer(format!(
            "empty id at index {}",
            pos
        )));
    }
    Ok(customers)
}

pub fn load_customers_json(path: &Path) -> Result<Vec<Customer>> {
    let content = std::fs::read_to_string(path)?;
    parse_customers_json(&content)
}
