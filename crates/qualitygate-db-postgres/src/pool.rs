//! Connection pool for the PostgreSQL storage backend.

use std::time::Duration;

use sqlx_postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Opens the pool. Connecting acquires one connection, so an unreachable
/// database fails here rather than in the first session.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub(crate) async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    let options = pool_options(config)?;

    info!(
        pool_size = config.pool_size,
        connect_timeout_ms = config.connect_timeout_ms,
        idle_timeout_ms = ?config.idle_timeout_ms,
        "Opening PostgreSQL pool"
    );

    let pool = options.connect(&config.url).await?;
    debug!("PostgreSQL pool ready");
    Ok(pool)
}

fn pool_options(config: &PostgresConfig) -> Result<PgPoolOptions> {
    if config.pool_size == 0 {
        return Err(PostgresError::config("pool_size must be > 0"));
    }

    Ok(PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(config.idle_timeout_ms.map(Duration::from_millis)))
}

/// Masks the password in a database URL for logging.
pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos > scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://qg:hunter2@db:5432/qualitygate"),
            "postgres://qg:****@db:5432/qualitygate"
        );
        assert_eq!(
            mask_password("postgres://qg@db/qualitygate"),
            "postgres://qg@db/qualitygate"
        );
        assert_eq!(mask_password("postgres://db/qg"), "postgres://db/qg");
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = PostgresConfig::new("postgres://localhost/qg")
            .with_pool_size(3)
            .with_connect_timeout_ms(750)
            .with_idle_timeout_ms(None);

        let options = pool_options(&config).unwrap();
        assert_eq!(options.get_max_connections(), 3);
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(750));
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[tokio::test]
    async fn test_zero_pool_size_is_rejected() {
        let config = PostgresConfig::new("postgres://localhost/qg").with_pool_size(0);
        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, PostgresError::Config { .. }));
    }
}
