//! PostgreSQL session backed by a single database transaction.
//!
//! Every DAO call in a session runs on the same transaction, so reads see the
//! session's own uncommitted writes and nothing is visible to other sessions
//! until [`Session::commit`].

use async_trait::async_trait;
use qualitygate_storage::{
    Condition, ConditionDao, GateDao, Metric, MetricDao, NewCondition, NewMetric,
    NewQualityGate, PropertyDao, QualityGate, Session, StorageError,
};
use sqlx_postgres::{PgConnection, PgTransaction};

use crate::queries;

/// PostgreSQL transaction wrapper.
///
/// The transaction rolls back on drop if it was not explicitly committed.
pub struct PostgresSession {
    /// Taken on commit or rollback.
    tx: Option<PgTransaction<'static>>,
}

impl PostgresSession {
    pub fn new(tx: PgTransaction<'static>) -> Self {
        Self { tx: Some(tx) }
    }

    fn conn(&mut self) -> Result<&mut PgConnection, StorageError> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(StorageError::transaction_error(
                "Transaction already completed (committed or rolled back)",
            )),
        }
    }
}

#[async_trait]
impl Session for PostgresSession {
    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to commit transaction: {e}"))
            })?;
            tracing::debug!("Transaction committed successfully");
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to rollback transaction: {e}"))
            })?;
            tracing::debug!("Transaction rolled back successfully");
        }
        Ok(())
    }
}

#[async_trait]
impl GateDao for PostgresSession {
    async fn select_gate_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<QualityGate>, StorageError> {
        queries::gates::select_by_name(self.conn()?, name).await
    }

    async fn select_all_gates(&mut self) -> Result<Vec<QualityGate>, StorageError> {
        queries::gates::select_all(self.conn()?).await
    }

    async fn insert_gate(&mut self, gate: &NewQualityGate) -> Result<QualityGate, StorageError> {
        queries::gates::insert(self.conn()?, gate).await
    }

    async fn ensure_one_built_in_gate(&mut self, name: &str) -> Result<(), StorageError> {
        let changed = queries::gates::ensure_one_built_in(self.conn()?, name).await?;
        if changed > 0 {
            tracing::debug!(name, changed, "Built-in flags updated");
        }
        Ok(())
    }
}

#[async_trait]
impl ConditionDao for PostgresSession {
    async fn select_conditions_for_gate(
        &mut self,
        gate_id: i64,
    ) -> Result<Vec<Condition>, StorageError> {
        queries::conditions::select_for_gate(self.conn()?, gate_id).await
    }

    async fn insert_condition(
        &mut self,
        condition: &NewCondition,
    ) -> Result<Condition, StorageError> {
        queries::conditions::insert(self.conn()?, condition).await
    }

    async fn delete_condition(&mut self, id: i64) -> Result<(), StorageError> {
        queries::conditions::delete(self.conn()?, id).await
    }
}

#[async_trait]
impl MetricDao for PostgresSession {
    async fn select_metric_by_id(&mut self, id: i64) -> Result<Option<Metric>, StorageError> {
        queries::metrics::select_by_id(self.conn()?, id).await
    }

    async fn select_metric_by_key(&mut self, key: &str) -> Result<Option<Metric>, StorageError> {
        queries::metrics::select_by_key(self.conn()?, key).await
    }

    async fn select_all_metrics(&mut self) -> Result<Vec<Metric>, StorageError> {
        queries::metrics::select_all(self.conn()?).await
    }

    async fn insert_metric(&mut self, metric: &NewMetric) -> Result<Metric, StorageError> {
        queries::metrics::insert(self.conn()?, metric).await
    }
}

#[async_trait]
impl PropertyDao for PostgresSession {
    async fn select_property(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        queries::properties::select(self.conn()?, key).await
    }

    async fn set_property(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        queries::properties::upsert(self.conn()?, key, value).await
    }
}

impl Drop for PostgresSession {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // sqlx issues the ROLLBACK when the inner transaction drops.
            tracing::warn!(
                "PostgresSession dropped without explicit commit/rollback - will auto-rollback"
            );
        }
    }
}
