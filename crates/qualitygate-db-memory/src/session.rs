//! Session over a private copy of the in-memory tables.

use std::sync::Arc;

use async_trait::async_trait;
use qualitygate_storage::{
    Condition, ConditionDao, GateDao, Metric, MetricDao, NewCondition, NewMetric,
    NewQualityGate, PropertyDao, QualityGate, Session, StorageError,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::storage::Tables;

/// A session of the in-memory backend.
///
/// Holds the revision the snapshot was taken at; commit fails if another
/// session committed in the meantime.
pub struct InMemorySession {
    shared: Arc<RwLock<Tables>>,
    working: Tables,
    base_revision: u64,
    writes: u64,
}

impl InMemorySession {
    pub(crate) fn new(shared: Arc<RwLock<Tables>>, snapshot: Tables) -> Self {
        let base_revision = snapshot.revision;
        Self {
            shared,
            working: snapshot,
            base_revision,
            writes: 0,
        }
    }

    fn canonical_gate(&self, name: &str) -> Option<&QualityGate> {
        self.working
            .gates
            .values()
            .filter(|gate| gate.name == name)
            .min_by_key(|gate| (!gate.built_in, gate.id))
    }
}

#[async_trait]
impl Session for InMemorySession {
    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;
        let mut shared = this.shared.write().await;
        if shared.revision != this.base_revision {
            return Err(StorageError::transaction_error(format!(
                "Concurrent commit detected: session started at revision {}, store is at {}",
                this.base_revision, shared.revision
            )));
        }

        let mut working = this.working;
        working.revision = shared.revision + 1;
        working.writes = shared.writes + this.writes;
        *shared = working;
        tracing::debug!(revision = shared.revision, "In-memory session committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        tracing::debug!(
            discarded_writes = self.writes,
            "In-memory session rolled back"
        );
        Ok(())
    }
}

#[async_trait]
impl GateDao for InMemorySession {
    async fn select_gate_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<QualityGate>, StorageError> {
        Ok(self.canonical_gate(name).cloned())
    }

    async fn select_all_gates(&mut self) -> Result<Vec<QualityGate>, StorageError> {
        Ok(self.working.gates.values().cloned().collect())
    }

    async fn insert_gate(&mut self, gate: &NewQualityGate) -> Result<QualityGate, StorageError> {
        let now = OffsetDateTime::now_utc();
        let row = QualityGate {
            id: self.working.next_gate_id(),
            name: gate.name.clone(),
            built_in: gate.built_in,
            created_at: now,
            updated_at: now,
        };
        self.working.gates.insert(row.id, row.clone());
        self.writes += 1;
        Ok(row)
    }

    async fn ensure_one_built_in_gate(&mut self, name: &str) -> Result<(), StorageError> {
        let canonical = self.canonical_gate(name).map(|gate| gate.id);
        let now = OffsetDateTime::now_utc();
        for gate in self.working.gates.values_mut() {
            let built_in = Some(gate.id) == canonical;
            if gate.built_in != built_in {
                gate.built_in = built_in;
                gate.updated_at = now;
                self.writes += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConditionDao for InMemorySession {
    async fn select_conditions_for_gate(
        &mut self,
        gate_id: i64,
    ) -> Result<Vec<Condition>, StorageError> {
        Ok(self
            .working
            .conditions
            .values()
            .filter(|condition| condition.gate_id == gate_id)
            .cloned()
            .collect())
    }

    async fn insert_condition(
        &mut self,
        condition: &NewCondition,
    ) -> Result<Condition, StorageError> {
        if !self.working.gates.contains_key(&condition.gate_id) {
            return Err(StorageError::not_found("QualityGate", condition.gate_id));
        }

        let now = OffsetDateTime::now_utc();
        let row = Condition {
            id: self.working.next_condition_id(),
            gate_id: condition.gate_id,
            metric_id: condition.metric_id,
            operator: Some(condition.operator),
            warning_threshold: condition.warning_threshold.clone(),
            error_threshold: condition.error_threshold.clone(),
            period: condition.period,
            created_at: now,
            updated_at: now,
        };
        self.working.conditions.insert(row.id, row.clone());
        self.writes += 1;
        Ok(row)
    }

    async fn delete_condition(&mut self, id: i64) -> Result<(), StorageError> {
        self.working
            .conditions
            .remove(&id)
            .ok_or_else(|| StorageError::not_found("Condition", id))?;
        self.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl MetricDao for InMemorySession {
    async fn select_metric_by_id(&mut self, id: i64) -> Result<Option<Metric>, StorageError> {
        Ok(self.working.metrics.get(&id).cloned())
    }

    async fn select_metric_by_key(&mut self, key: &str) -> Result<Option<Metric>, StorageError> {
        Ok(self
            .working
            .metrics
            .values()
            .find(|metric| metric.key == key)
            .cloned())
    }

    async fn select_all_metrics(&mut self) -> Result<Vec<Metric>, StorageError> {
        Ok(self.working.metrics.values().cloned().collect())
    }

    async fn insert_metric(&mut self, metric: &NewMetric) -> Result<Metric, StorageError> {
        if self.working.metrics.values().any(|m| m.key == metric.key) {
            return Err(StorageError::already_exists("Metric", metric.key.clone()));
        }

        let row = Metric {
            id: self.working.next_metric_id(),
            key: metric.key.clone(),
            short_name: metric.short_name.clone(),
            value_type: metric.value_type,
            domain: metric.domain.clone(),
            hidden: metric.hidden,
            enabled: true,
        };
        self.working.metrics.insert(row.id, row.clone());
        self.writes += 1;
        Ok(row)
    }
}

#[async_trait]
impl PropertyDao for InMemorySession {
    async fn select_property(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.working.properties.get(key).cloned())
    }

    async fn set_property(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self
            .working
            .properties
            .insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.writes += 1;
        }
        Ok(())
    }
}
