use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use qualitygate_storage::{Condition, GateStore, Metric, QualityGate, Session, StorageError};
use tokio::sync::RwLock;

use crate::session::InMemorySession;

/// Snapshot of every table held by the in-memory backend.
///
/// Sessions work on a private copy and swap it back in on commit, so a
/// session that is dropped or rolled back leaves no trace.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) gates: BTreeMap<i64, QualityGate>,
    pub(crate) conditions: BTreeMap<i64, Condition>,
    pub(crate) metrics: BTreeMap<i64, Metric>,
    pub(crate) properties: BTreeMap<String, String>,
    gate_seq: i64,
    condition_seq: i64,
    metric_seq: i64,
    /// Bumped on every successful commit.
    pub(crate) revision: u64,
    /// Number of row-level changes ever committed.
    pub(crate) writes: u64,
}

impl Tables {
    pub(crate) fn next_gate_id(&mut self) -> i64 {
        self.gate_seq += 1;
        self.gate_seq
    }

    pub(crate) fn next_condition_id(&mut self) -> i64 {
        self.condition_seq += 1;
        self.condition_seq
    }

    pub(crate) fn next_metric_id(&mut self) -> i64 {
        self.metric_seq += 1;
        self.metric_seq
    }
}

/// In-memory quality gate storage backend.
///
/// This storage implementation provides:
/// - Snapshot-isolated sessions (copy on begin, swap on commit)
/// - Rejection of commits that race with another committed session
/// - A write counter so tests can observe whether anything changed
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateStore {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl InMemoryGateStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed sessions.
    pub async fn revision(&self) -> u64 {
        self.tables.read().await.revision
    }

    /// Returns the number of row-level changes committed so far.
    pub async fn write_count(&self) -> u64 {
        self.tables.read().await.writes
    }
}

#[async_trait]
impl GateStore for InMemoryGateStore {
    async fn begin(&self) -> Result<Box<dyn Session>, StorageError> {
        let snapshot = self.tables.read().await.clone();
        Ok(Box::new(InMemorySession::new(
            Arc::clone(&self.tables),
            snapshot,
        )))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
