//! Label persistence: one JSONL file, one current label per trace.
//!
//! Saves upsert by trace filename: the existing line is replaced in place so
//! the file keeps save order, which is the order the summary table shows.
//! Malformed lines are skipped on read and dropped on the next rewrite.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use shared_types::{Label, Verdict};

#[derive(Debug, thiserror::Error)]
pub enum LabelStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode label: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A label as submitted, before the store stamps `saved_at`.
#[derive(Debug, Clone)]
pub struct LabelDraft {
    pub filename: String,
    pub index: Option<i64>,
    pub feedback: String,
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Clone)]
pub struct LabelStore {
    path: PathBuf,
}

impl LabelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All labels in file (save) order. A missing file is an empty store.
    pub fn all(&self) -> Result<Vec<Label>, LabelStoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        let mut labels = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Label>(line) {
                Ok(label) => labels.push(label),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed label line");
                }
            }
        }
        Ok(labels)
    }

    /// Current label for a trace, if any. Later lines win, so a file that
    /// predates upsert-rewriting still resolves to the newest save.
    pub fn find(&self, filename: &str) -> Result<Option<Label>, LabelStoreError> {
        Ok(self
            .all()?
            .into_iter()
            .rev()
            .find(|label| label.filename == filename))
    }

    /// Stamp and persist a label, replacing any existing label for the same
    /// trace while keeping its position in the file.
    pub fn upsert(&self, draft: LabelDraft) -> Result<Label, LabelStoreError> {
        let record = Label {
            filename: draft.filename,
            index: draft.index,
            feedback: draft.feedback,
            verdict: draft.verdict,
            saved_at: Utc::now(),
        };

        let mut rows = self.all()?;
        let mut seen = false;
        for row in rows.iter_mut() {
            if row.filename == record.filename {
                *row = record.clone();
                seen = true;
            }
        }
        if !seen {
            rows.push(record.clone());
        }

        let mut out = String::new();
        for row in &rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        std::fs::write(&self.path, out)?;

        Ok(record)
    }

    /// Render every label as CSV: `filename,index,verdict,feedback,saved_at`
    /// with RFC 4180 quoting and CRLF record separators.
    pub fn export_csv(&self) -> Result<String, LabelStoreError> {
        let mut out = String::from("filename,index,verdict,feedback,saved_at\r\n");
        for label in self.all()? {
            let index = label.index.map(|i| i.to_string()).unwrap_or_default();
            let verdict = label.verdict.map(|v| v.as_str().to_string()).unwrap_or_default();
            let saved_at = label.saved_at.to_rfc3339_opts(SecondsFormat::Micros, true);
            let fields = [
                label.filename.as_str(),
                index.as_str(),
                verdict.as_str(),
                label.feedback.as_str(),
                saved_at.as_str(),
            ];
            let row = fields.map(csv_field).join(",");
            out.push_str(&row);
            out.push_str("\r\n");
        }
        Ok(out)
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
