//! Storage traits for the quality gate storage abstraction layer.
//!
//! Every data access goes through a [`Session`], which wraps one backend
//! transaction. Nothing done through a session is visible to other sessions
//! until [`Session::commit`] succeeds; dropping a session without committing
//! discards its changes.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Condition, Metric, NewCondition, NewMetric, NewQualityGate, QualityGate};

/// Entry point of a storage backend.
///
/// # Example
///
/// ```ignore
/// use qualitygate_storage::GateStore;
///
/// async fn gate_names(store: &dyn GateStore) -> Result<Vec<String>, StorageError> {
///     let mut session = store.begin().await?;
///     let gates = session.select_all_gates().await?;
///     session.rollback().await?;
///     Ok(gates.into_iter().map(|g| g.name).collect())
/// }
/// ```
#[async_trait]
pub trait GateStore: Send + Sync {
    /// Opens a new session backed by a fresh transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConnectionError` or `StorageError::TransactionError`
    /// if no transaction can be started.
    async fn begin(&self) -> Result<Box<dyn Session>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A unit of work over all quality gate tables.
#[async_trait]
pub trait Session: GateDao + ConditionDao + MetricDao + PropertyDao + Send {
    /// Commits all operations in this session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the commit fails.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all operations in this session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the rollback fails.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

/// Access to the `quality_gates` table.
#[async_trait]
pub trait GateDao: Send {
    /// Finds the gate registered under `name`.
    ///
    /// Names are not unique at the storage level. When several rows share the
    /// name, built-in rows win over others and the lowest id wins among equals.
    async fn select_gate_by_name(&mut self, name: &str)
    -> Result<Option<QualityGate>, StorageError>;

    /// Lists all gates ordered by id.
    async fn select_all_gates(&mut self) -> Result<Vec<QualityGate>, StorageError>;

    /// Inserts a gate and returns it with its assigned id.
    async fn insert_gate(&mut self, gate: &NewQualityGate) -> Result<QualityGate, StorageError>;

    /// Makes the gate `select_gate_by_name(name)` resolves to the only
    /// built-in gate. Every other gate is demoted.
    ///
    /// When no gate carries `name`, every gate ends up demoted.
    async fn ensure_one_built_in_gate(&mut self, name: &str) -> Result<(), StorageError>;
}

/// Access to the `quality_gate_conditions` table.
#[async_trait]
pub trait ConditionDao: Send {
    /// Lists the conditions owned by a gate, ordered by id.
    async fn select_conditions_for_gate(
        &mut self,
        gate_id: i64,
    ) -> Result<Vec<Condition>, StorageError>;

    /// Inserts a condition and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owning gate does not exist.
    async fn insert_condition(&mut self, condition: &NewCondition)
    -> Result<Condition, StorageError>;

    /// Deletes a condition by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such condition exists.
    async fn delete_condition(&mut self, id: i64) -> Result<(), StorageError>;
}

/// Access to the `metrics` table.
#[async_trait]
pub trait MetricDao: Send {
    async fn select_metric_by_id(&mut self, id: i64) -> Result<Option<Metric>, StorageError>;

    async fn select_metric_by_key(&mut self, key: &str) -> Result<Option<Metric>, StorageError>;

    /// Lists all metrics ordered by id.
    async fn select_all_metrics(&mut self) -> Result<Vec<Metric>, StorageError>;

    /// Inserts a metric definition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the key is taken.
    async fn insert_metric(&mut self, metric: &NewMetric) -> Result<Metric, StorageError>;
}

/// Access to the global `properties` table.
#[async_trait]
pub trait PropertyDao: Send {
    async fn select_property(&mut self, key: &str) -> Result<Option<String>, StorageError>;

    /// Inserts or replaces a global property.
    async fn set_property(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
