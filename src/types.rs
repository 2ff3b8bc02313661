use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ScanlyticsError;

/// Opaque customer identifier. Numeric CRM ids are kept as their decimal string.
pub type CustomerId = String;

/// One logged scan action.
///
/// Events are immutable once ingested. Deserializing goes through [`ScanRecord`]
/// so a negative page count or an unparsable timestamp is rejected as
/// [`ScanlyticsError::MalformedEvent`] instead of being coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ScanRecord")]
pub struct ScanEvent {
    pub customer_id: CustomerId,
    pub timestamp: DateTime<Utc>,
    pub page_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_chain: Option<String>,
}

impl ScanEvent {
    pub fn new(customer_id: impl Into<CustomerId>, timestamp: DateTime<Utc>, page_count: u32) -> Self {
        Self {
            customer_id: customer_id.into(),
            timestamp,
            page_count,
            customer_city: None,
            customer_chain: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.customer_city = Some(city.into());
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.customer_chain = Some(chain.into());
        self
    }
}

/// Wire form of a scan event, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub customer_id: CustomerId,
    pub timestamp: String,
    #[serde(default)]
    pub page_count: i64,
    #[serde(default)]
    pub customer_city: Option<String>,
    #[serde(default)]
    pub customer_chain: Option<String>,
}

impl TryFrom<ScanRecord> for ScanEvent {
    type Error = ScanlyticsError;

    fn try_from(record: ScanRecord) -> Result<Self, Self::Error> {
        let customer_id = record.customer_id.trim().to_string();
        if customer_id.is_empty() {
            return Err(ScanlyticsError::malformed("empty customerId"));
        }
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| {
            ScanlyticsError::malformed(format!("unparsable timestamp '{}'", record.timestamp))
        })?;
        if record.page_count < 0 {
            return Err(ScanlyticsError::malformed(format!(
                "negative pageCount {}",
                record.page_count
            )));
        }
        let page_count = u32::try_from(record.page_count).map_err(|_| {
            ScanlyticsError::malformed(format!("pageCount {} out of range", record.page_count))
        })?;

        Ok(ScanEvent {
            customer_id,
            timestamp,
            page_count,
            customer_city: non_empty(record.customer_city),
            customer_chain: non_empty(record.customer_chain),
        })
    }
}

/// A customer (office) as known to the customer directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(deserialize_with = "opaque_id")]
    pub id: CustomerId,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub chain: Option<String>,
}

impl Customer {
    pub fn new(id: impl Into<CustomerId>) -> Self {
        Self {
            id: id.into(),
            city: None,
            chain: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }
}

/// Parse a timestamp in RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` form
/// (interpreted as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Accept identifiers given either as JSON strings or JSON integers.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CustomerId, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or integer id, got {}",
            other
        ))),
    }
}
