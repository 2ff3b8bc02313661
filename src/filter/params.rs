use serde::Deserialize;

/// Untyped filter parameters as received from a query string or CLI flags.
///
/// Every field is kept as the caller sent it; coercion to numbers, dates and
/// tiers happens in [`super::Normalizer`], which treats anything it cannot
/// read as absent. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParams {
    pub last_days: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub quarter: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub city: Option<String>,
    #[serde(alias = "volumeTier")]
    pub volume_level: Option<String>,
    #[serde(alias = "customerActivityTier")]
    pub customer_activity: Option<String>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs. Unknown keys are ignored; a repeated key keeps the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = RawParams::default();
        for (key, value) in pairs {
            params.set(key.as_ref(), value);
        }
        params
    }

    /// Parse an `application/x-www-form-urlencoded` query string, with or without a leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    /// Set one parameter by its wire name. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "lastDays" | "last_days" => &mut self.last_days,
            "month" => &mut self.month,
            "year" => &mut self.year,
            "quarter" => &mut self.quarter,
            "dateFrom" | "date_from" => &mut self.date_from,
            "dateTo" | "date_to" => &mut self.date_to,
            "city" => &mut self.city,
            "volumeLevel" | "volumeTier" | "volume_level" => &mut self.volume_level,
            "customerActivity" | "customerActivityTier" | "customer_activity" => {
                &mut self.customer_activity
            }
            other => {
                tracing::debug!("[filter] Ignoring unknown parameter '{}'", other);
                return false;
            }
        };
        *slot = Some(value.into());
        true
    }

    /// Whether any filter parameter carries a non-blank value.
    pub fn has_filters(&self) -> bool {
        [
            &self.last_days,
            &self.month,
            &self.year,
            &self.quarter,
            &self.date_from,
            &self.date_to,
            &self.city,
            &self.volume_level,
            &self.customer_activity,
        ]
        .iter()
        .any(|v| present(v).is_some())
    }
}

/// Trimmed value, or `None` when missing or blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
