//! Shared handler state.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::store::labels::LabelStore;
use crate::store::traces::TraceStore;

/// Stores behind one cheap-to-clone handle. The label store sits behind a
/// mutex so concurrent saves serialize their read-rewrite cycle; traces are
/// read-only and need no guard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    traces: TraceStore,
    labels: Mutex<LabelStore>,
}

impl AppState {
    pub fn new(traces: TraceStore, labels: LabelStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                traces,
                labels: Mutex::new(labels),
            }),
        }
    }

    pub fn traces(&self) -> &TraceStore {
        &self.inner.traces
    }

    pub async fn labels(&self) -> tokio::sync::MutexGuard<'_, LabelStore> {
        self.inner.labels.lock().await
    }
}
