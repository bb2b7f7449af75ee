//! Shared types between the labeling backend and its UI
//!
//! Everything here crosses the HTTP boundary as JSON, so the shapes double
//! as the wire contract: trace records served to the page, label records
//! persisted per trace, and the save request body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Traces
// ============================================================================

/// One recorded (query, assistant response) pair to be judged.
///
/// Traces are immutable; the backend only ever reads them. `filename` is the
/// stable identifier — for multi-entry trace files it carries a `#ts` suffix
/// selecting one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub filename: String,
    pub initial_query: String,
    pub assistant_output: String,
}

// ============================================================================
// Verdicts and labels
// ============================================================================

/// Binary human judgment on a trace. Absence of a verdict is modeled as
/// `Option<Verdict>::None`, never as a third variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Up,
    Down,
}

impl Verdict {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Verdict::Up),
            "down" => Some(Verdict::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Up => "up",
            Verdict::Down => "down",
        }
    }
}

/// Lenient verdict field: anything outside `"up"`/`"down"` — null, a number,
/// an unknown string — deserializes to no verdict rather than an error, so
/// label files written by older tooling stay loadable.
pub fn lenient_verdict<'de, D>(deserializer: D) -> Result<Option<Verdict>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Verdict::parse(&s),
        _ => None,
    })
}

/// The persisted judgment for one trace: at most one current label per
/// `filename`; a later save overwrites the earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub filename: String,
    /// Position of the trace at save time. Redundant cache, kept for export.
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, deserialize_with = "lenient_verdict")]
    pub verdict: Option<Verdict>,
    /// Stamped by the store on write.
    pub saved_at: DateTime<Utc>,
}

/// Body of `POST /api/save`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLabelRequest {
    pub filename: String,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, deserialize_with = "lenient_verdict")]
    pub verdict: Option<Verdict>,
}
