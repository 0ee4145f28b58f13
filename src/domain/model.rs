use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw `year` value as it arrives from upstream JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

impl YearValue {
    /// Strict parse into a calendar year. `None` means the record is excluded.
    pub fn parse(&self) -> Option<i32> {
        match self {
            YearValue::Integer(n) => i32::try_from(*n).ok(),
            YearValue::Text(s) => s.trim().parse::<i32>().ok(),
            YearValue::Other(_) => None,
        }
    }
}

impl From<i32> for YearValue {
    fn from(year: i32) -> Self {
        YearValue::Integer(i64::from(year))
    }
}

impl From<&str> for YearValue {
    fn from(year: &str) -> Self {
        YearValue::Text(year.to_string())
    }
}

impl From<String> for YearValue {
    fn from(year: String) -> Self {
        YearValue::Text(year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    List(Vec<String>),
    Joined(String),
}

/// Descriptive fields are display-only, so a value of the wrong shape becomes
/// `None` instead of rejecting the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A logged publication. Only `year` matters for trend analysis; the rest is
/// carried through so callers can display or re-serialise the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<YearValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub authors: Option<Authors>,
    #[serde(
        default,
        rename = "publicationType",
        alias = "type",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub publication_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub citations: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PublicationRecord {
    pub fn with_year(year: impl Into<YearValue>) -> Self {
        Self {
            year: Some(year.into()),
            ..Default::default()
        }
    }

    pub fn parsed_year(&self) -> Option<i32> {
        self.year.as_ref().and_then(YearValue::parse)
    }
}

/// Decodes a JSON array of publications. Items that are not objects are
/// dropped; anything other than an array is an error.
pub fn parse_publications(value: serde_json::Value) -> serde_json::Result<Vec<PublicationRecord>> {
    let items: Vec<serde_json::Value> = serde_json::from_value(value)?;
    let total = items.len();

    let records: Vec<PublicationRecord> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Dropping malformed publication entry: {}", e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            "Dropped {} of {} publication entries that were not objects",
            total - records.len(),
            total
        );
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growing,
    Declining,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Growing => "growing",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: Trend,
    pub growth: f64,
}

impl TrendResult {
    pub fn stable() -> Self {
        Self {
            trend: Trend::Stable,
            growth: 0.0,
        }
    }
}

/// Per-year publication counts that survived parsing and the future-year cutoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearBuckets {
    pub counts: BTreeMap<i32, usize>,
    pub total: usize,
    pub skipped_unparseable: usize,
    pub skipped_future: usize,
}

impl YearBuckets {
    pub fn add(&mut self, year: i32) {
        *self.counts.entry(year).or_insert(0) += 1;
        self.total += 1;
    }

    /// Distinct years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        self.counts.keys().copied().collect()
    }

    pub fn count(&self, year: i32) -> usize {
        self.counts.get(&year).copied().unwrap_or(0)
    }

    pub fn latest(&self) -> Option<(i32, usize)> {
        self.counts.iter().next_back().map(|(y, c)| (*y, *c))
    }

    /// Count differences between consecutive non-empty years. Gap years are
    /// not synthesised as zero buckets.
    pub fn deltas(&self) -> Vec<i64> {
        self.counts
            .values()
            .zip(self.counts.values().skip(1))
            .map(|(prev, curr)| *curr as i64 - *prev as i64)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unparseable + self.skipped_future
    }
}

/// Everything the analyzer knows about one publication list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub current_year: i32,
    pub buckets: BTreeMap<i32, usize>,
    pub total: usize,
    pub skipped: usize,
    pub predicted_next_year: u32,
    pub regression_estimate: i64,
    pub trend: Trend,
    pub growth: f64,
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Publications by year (up to {}):", self.current_year)?;
        if self.buckets.is_empty() {
            writeln!(f, "  (no publications)")?;
        }
        for (year, count) in &self.buckets {
            writeln!(f, "  {}: {}", year, count)?;
        }
        if self.skipped > 0 {
            writeln!(f, "Skipped records: {}", self.skipped)?;
        }
        writeln!(f, "Predicted next year: {}", self.predicted_next_year)?;
        writeln!(f, "Regression estimate: {}", self.regression_estimate)?;
        write!(f, "Trend: {} ({:+.2} per year)", self.trend, self.growth)
    }
}
