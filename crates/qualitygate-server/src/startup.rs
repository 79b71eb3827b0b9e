//! Startup lifecycle: store construction and the ordered startup tasks.

use std::sync::Arc;

use qualitygate_db_memory::InMemoryGateStore;
use qualitygate_db_postgres::PostgresGateStore;
use qualitygate_storage::{DynGateStore, GateStore, Session};
use tracing::info;

use crate::bootstrap::{BootstrapStats, register_metrics};
use crate::config::{BootstrapConfig, StorageBackend, StorageConfig};
use crate::error::StartupError;
use crate::reconcile::{RegisterQualityGates, RegisterReport};

/// What the startup tasks did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    /// `None` when metric registration is disabled
    pub metrics: Option<BootstrapStats>,
    pub quality_gates: RegisterReport,
}

/// Builds the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the postgres settings are missing, or if the pool
/// cannot be created or migrations fail.
pub async fn create_store(config: &StorageConfig) -> Result<DynGateStore, StartupError> {
    let store: DynGateStore = match config.backend {
        StorageBackend::Postgres => {
            let pg = config.postgres.as_ref().ok_or_else(|| {
                StartupError::Config("storage.postgres config is required".into())
            })?;
            Arc::new(PostgresGateStore::new(pg.to_backend_config()).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, nothing will be persisted");
            Arc::new(InMemoryGateStore::new())
        }
    };

    info!(backend = store.backend_name(), "Storage initialized");
    Ok(store)
}

/// Runs the startup tasks in order, each in its own session.
///
/// 1. Core metric registration (when enabled)
/// 2. Built-in quality gate registration
///
/// # Errors
///
/// Stops at the first failing task. Tasks already committed stay committed.
pub async fn run(
    store: DynGateStore,
    config: &BootstrapConfig,
) -> Result<StartupReport, StartupError> {
    let metrics = if config.register_metrics {
        let mut session = store.begin().await?;
        let stats = register_metrics(session.as_mut()).await?;
        session.commit().await?;
        Some(stats)
    } else {
        info!("Core metric registration disabled");
        None
    };

    let quality_gates = RegisterQualityGates::new(store).start().await?;

    Ok(StartupReport {
        metrics,
        quality_gates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::CORE_METRICS;
    use crate::reconcile::BUILTIN_QUALITY_GATE;
    use qualitygate_storage::prelude::*;

    fn memory_storage() -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Memory,
            postgres: None,
        }
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let store = create_store(&memory_storage()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_postgres_backend_without_settings() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            postgres: None,
        };
        let err = create_store(&config).await.err().expect("should fail");
        assert!(matches!(err, StartupError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_on_empty_store() {
        let store = create_store(&memory_storage()).await.unwrap();

        let report = run(store.clone(), &BootstrapConfig::default())
            .await
            .unwrap();

        assert_eq!(
            report.metrics.map(|m| m.inserted),
            Some(CORE_METRICS.len())
        );
        assert!(report.quality_gates.gate_created);
        assert_eq!(report.quality_gates.created, 5);

        let mut session = store.begin().await.unwrap();
        let gate = session
            .select_gate_by_name(BUILTIN_QUALITY_GATE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            session.select_conditions_for_gate(gate.id).await.unwrap().len(),
            5
        );
    }

    #[tokio::test]
    async fn test_run_twice_is_a_no_op() {
        let store = create_store(&memory_storage()).await.unwrap();
        run(store.clone(), &BootstrapConfig::default())
            .await
            .unwrap();

        let report = run(store, &BootstrapConfig::default()).await.unwrap();

        assert_eq!(report.metrics.map(|m| m.inserted), Some(0));
        assert!(report.quality_gates.is_unchanged());
    }

    #[tokio::test]
    async fn test_without_metric_registration_fails_on_empty_store() {
        let store = create_store(&memory_storage()).await.unwrap();
        let config = BootstrapConfig {
            register_metrics: false,
        };

        let err = run(store.clone(), &config).await.unwrap_err();
        assert!(matches!(err, StartupError::Condition(_)));

        let mut session = store.begin().await.unwrap();
        assert!(session.select_all_gates().await.unwrap().is_empty());
    }
}
