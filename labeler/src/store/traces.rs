//! Read-only store over a directory of recorded trace files.
//!
//! Two file shapes are supported, matching what the trace recorder writes:
//! a single JSON object (one trace, identified by its filename) or a JSON
//! array of objects (one trace per entry, identified as `filename#ts` where
//! `ts` is the entry's timestamp field). Enumeration order is filename
//! order, then entry order within a file, which fixes the index space the
//! UI navigates.

use std::path::PathBuf;

use serde_json::Value;
use shared_types::Trace;

#[derive(Debug, thiserror::Error)]
pub enum TraceStoreError {
    #[error("no traces found in {}", .0.display())]
    Empty(PathBuf),

    #[error("trace {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed trace file {file}: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },
}

/// A trace resolved by index, with the position information the UI renders.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub index: usize,
    pub total: usize,
    pub trace: Trace,
}

/// Clamp a requested index into `[0, total-1]`. `total` must be nonzero.
pub fn clamp_index(index: i64, total: usize) -> usize {
    index.clamp(0, total as i64 - 1) as usize
}

#[derive(Debug, Clone)]
pub struct TraceStore {
    dir: PathBuf,
}

impl TraceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Enumerate trace identifiers in index order. Unreadable or
    /// unparseable files are skipped with a warning so one bad file never
    /// takes the whole sequence down.
    pub fn ids(&self) -> Result<Vec<String>, TraceStoreError> {
        let mut filenames = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && entry.file_type()?.is_file() {
                filenames.push(name);
            }
        }
        filenames.sort();

        let mut ids = Vec::new();
        for filename in filenames {
            let raw = match self.read_json(&filename) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(file = %filename, error = %e, "Skipping unreadable trace file");
                    continue;
                }
            };
            match raw {
                Value::Array(entries) => {
                    for entry in &entries {
                        // Only entries that look like completed traces count.
                        if entry.get("response").is_none() {
                            continue;
                        }
                        ids.push(format!("{filename}#{}", ts_marker(entry)));
                    }
                }
                Value::Object(_) => ids.push(filename),
                _ => {
                    tracing::warn!(file = %filename, "Skipping trace file that is neither object nor array");
                }
            }
        }
        Ok(ids)
    }

    /// Resolve `index` (clamped into the known range) to its trace.
    pub fn load_at(&self, index: i64) -> Result<LoadedTrace, TraceStoreError> {
        let ids = self.ids()?;
        if ids.is_empty() {
            return Err(TraceStoreError::Empty(self.dir.clone()));
        }
        let total = ids.len();
        let resolved = clamp_index(index, total);
        let trace = self.load(&ids[resolved])?;
        Ok(LoadedTrace {
            index: resolved,
            total,
            trace,
        })
    }

    /// Load one trace by identifier (`name.json` or `name.json#ts`).
    pub fn load(&self, id: &str) -> Result<Trace, TraceStoreError> {
        let (filename, marker) = match id.split_once('#') {
            Some((filename, marker)) => (filename, Some(marker)),
            None => (id, None),
        };
        let raw = self.read_json(filename)?;

        let record = match &raw {
            Value::Array(entries) => {
                let selected = match marker {
                    // An empty marker means the entry had no timestamp;
                    // fall back to the most recent entry, as for a bare id.
                    Some(ts) if !ts.is_empty() => entries
                        .iter()
                        .find(|entry| ts_marker(entry) == ts)
                        .or_else(|| entries.last()),
                    _ => entries.last(),
                };
                selected.ok_or_else(|| TraceStoreError::NotFound(id.to_string()))?
            }
            Value::Object(_) => &raw,
            _ => return Err(TraceStoreError::NotFound(id.to_string())),
        };

        let (initial_query, assistant_output) = extract_exchange(record);
        Ok(Trace {
            filename: id.to_string(),
            initial_query,
            assistant_output,
        })
    }

    fn read_json(&self, filename: &str) -> Result<Value, TraceStoreError> {
        let path = self.dir.join(filename);
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| TraceStoreError::Parse {
            file: filename.to_string(),
            source,
        })
    }
}

/// Timestamp marker for an array entry: its `ts` field rendered as a string,
/// empty when absent or not a string/number.
fn ts_marker(entry: &Value) -> String {
    match entry.get("ts") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn messages<'a>(record: &'a Value, section: &str) -> &'a [Value] {
    record
        .get(section)
        .and_then(|s| s.get("messages"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn role(message: &Value) -> Option<&str> {
    message.get("role").and_then(Value::as_str)
}

fn content(message: &Value) -> String {
    message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Pull the judged exchange out of a trace record: the last assistant
/// message in the response thread, and the user message that prompted it.
/// When the pairing cannot be established, fall back to the last user
/// message in the response thread, then in the request.
fn extract_exchange(record: &Value) -> (String, String) {
    let request_messages = messages(record, "request");
    let response_messages = messages(record, "response");

    let mut assistant_output = String::new();
    let mut last_assistant = None;
    for (i, message) in response_messages.iter().enumerate().rev() {
        if role(message) == Some("assistant") {
            assistant_output = content(message);
            last_assistant = Some(i);
            break;
        }
    }

    let mut initial_query = String::new();
    if let Some(idx) = last_assistant {
        for message in response_messages[..idx].iter().rev() {
            if role(message) == Some("user") {
                initial_query = content(message);
                break;
            }
        }
    }
    if initial_query.is_empty() {
        for message in response_messages.iter().rev() {
            if role(message) == Some("user") {
                initial_query = content(message);
                break;
            }
        }
    }
    if initial_query.is_empty() {
        for message in request_messages.iter().rev() {
            if role(message) == Some("user") {
                initial_query = content(message);
                break;
            }
        }
    }

    (initial_query, assistant_output)
}
