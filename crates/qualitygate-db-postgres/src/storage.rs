//! PostgreSQL implementation of the `GateStore` trait.

use async_trait::async_trait;
use sqlx_postgres::PgPool;

use qualitygate_storage::{GateStore, Session, StorageError};

use crate::config::PostgresConfig;
use crate::migrations;
use crate::pool;
use crate::session::PostgresSession;

/// PostgreSQL storage backend for quality gates.
///
/// Each session is one database transaction taken from the pool.
#[derive(Debug, Clone)]
pub struct PostgresGateStore {
    pool: PgPool,
}

impl PostgresGateStore {
    /// Creates a new `PostgresGateStore` with the given configuration.
    ///
    /// Opens the pool, which fails fast when the database is unreachable,
    /// then runs migrations if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl GateStore for PostgresGateStore {
    async fn begin(&self) -> Result<Box<dyn Session>, StorageError> {
        let tx = self.pool.begin().await.map_err(|e| {
            StorageError::transaction_error(format!("Failed to begin transaction: {e}"))
        })?;
        Ok(Box::new(PostgresSession::new(tx)))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
