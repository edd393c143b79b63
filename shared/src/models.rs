//! Data models for workout analysis results and history

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Open mapping from metric name to value, as returned by the analysis backend.
///
/// Different activities populate different subsets of keys, so nothing is
/// required. Only numeric entries are considered metrics; anything else the
/// backend sends is kept verbatim but ignored by the display rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutMetrics(BTreeMap<String, Value>);

impl WorkoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric value for `key`, if present
    pub fn number(&self, key: &str) -> Option<&Number> {
        match self.0.get(key) {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.number(key).and_then(Number::as_f64)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.number(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style insert, mostly useful for fixtures
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Number>) -> Self {
        self.0.insert(key.into(), Value::Number(value.into()));
        self
    }

    /// Insert a floating point metric. Non-finite values are dropped since JSON
    /// cannot carry them.
    pub fn with_f64(mut self, key: impl Into<String>, value: f64) -> Self {
        if let Some(n) = Number::from_f64(value) {
            self.0.insert(key.into(), Value::Number(n));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Result of a processed video, as returned by `POST /api/process-workout`.
///
/// `annotated_video_url` and `csv_url` arrive as backend-relative paths and
/// are made absolute by the client before the result is handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutResult {
    pub session_id: String,
    pub status: String,
    #[serde(default)]
    pub metrics: WorkoutMetrics,
    pub annotated_video_url: String,
    pub csv_url: String,
}

/// How the backend should treat the upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    #[default]
    Video,
    Live,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Video => "video",
            ProcessingMode::Live => "live",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(ProcessingMode::Video),
            "live" => Ok(ProcessingMode::Live),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }
}

/// Render a backend number for display.
///
/// Floats with no fractional part lose the trailing `.0` (`80.0` shows as
/// `80`); other values use the shortest representation that round-trips.
pub fn display_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => format!("{}", f),
        _ => n.to_string(),
    }
}

/// A displayable metric value: either the raw number or a preformatted string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(Number),
    Text(String),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => f.write_str(&display_number(n)),
            DisplayValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<Number> for DisplayValue {
    fn from(n: Number) -> Self {
        DisplayValue::Number(n)
    }
}

impl From<String> for DisplayValue {
    fn from(s: String) -> Self {
        DisplayValue::Text(s)
    }
}

/// Labelled metric, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedMetric {
    pub label: String,
    pub value: DisplayValue,
}

impl FormattedMetric {
    pub fn new(label: impl Into<String>, value: impl Into<DisplayValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FormattedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Posture verdict for a processed workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Posture {
    Good,
    Bad,
}

impl Posture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Posture::Good => "Good",
            Posture::Bad => "Bad",
        }
    }

    pub fn is_good(&self) -> bool {
        matches!(self, Posture::Good)
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a submitted workout, persisted to the local history log.
///
/// Field names are camelCase on disk so existing history files stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistoryRecord {
    /// Millisecond timestamp at submission
    pub id: i64,
    pub activity_name: String,
    pub posture: Posture,
    pub metrics: WorkoutMetrics,
    pub formatted_metrics: Vec<FormattedMetric>,
    /// ISO-8601 submission time
    pub timestamp: String,
    pub video_url: String,
    pub badges_earned: Vec<String>,
    pub coins_earned: u32,
}
