//! # qualitygate-storage
//!
//! Storage abstraction layer for quality gate registration.
//!
//! This crate defines the records and traits that all storage backends must
//! implement. It does not contain any implementations - those are provided by
//! `qualitygate-db-postgres` and `qualitygate-db-memory`.
//!
//! ## Overview
//!
//! A [`GateStore`] opens [`Session`]s. A session is one transaction and gives
//! access to four tables through its DAO super-traits:
//!
//! - [`GateDao`]: quality gates
//! - [`ConditionDao`]: conditions owned by a gate
//! - [`MetricDao`]: metric definitions
//! - [`PropertyDao`]: global properties (e.g. the default gate)
//!
//! ## Example
//!
//! ```ignore
//! use qualitygate_storage::{GateStore, NewQualityGate, StorageError};
//!
//! async fn create_gate(store: &dyn GateStore, name: &str) -> Result<i64, StorageError> {
//!     let mut session = store.begin().await?;
//!     let gate = session.insert_gate(&NewQualityGate::new(name)).await?;
//!     session.commit().await?;
//!     Ok(gate.id)
//! }
//! ```

mod error;
mod traits;
mod types;

// Re-export everything from submodules
pub use error::StorageError;
pub use traits::{ConditionDao, GateDao, GateStore, MetricDao, PropertyDao, Session};
pub use types::{
    Condition, Metric, MetricType, NewCondition, NewMetric, NewQualityGate, Operator, QualityGate,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable store trait object.
pub type DynGateStore = std::sync::Arc<dyn GateStore>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use qualitygate_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::StorageError;
    pub use crate::traits::{ConditionDao, GateDao, GateStore, MetricDao, PropertyDao, Session};
    pub use crate::types::{
        Condition, Metric, MetricType, NewCondition, NewMetric, NewQualityGate, Operator,
        QualityGate,
    };
    pub use crate::{DynGateStore, StorageResult};
}
