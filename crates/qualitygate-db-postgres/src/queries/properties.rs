//! Queries on the global `properties` table.

use qualitygate_storage::StorageError;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::PgConnection;

use crate::error::query_error;

pub async fn select(conn: &mut PgConnection, key: &str) -> Result<Option<String>, StorageError> {
    let value: Option<Option<String>> =
        query_scalar("SELECT text_value FROM properties WHERE prop_key = $1")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .map_err(query_error)?;

    Ok(value.flatten())
}

pub async fn upsert(conn: &mut PgConnection, key: &str, value: &str) -> Result<(), StorageError> {
    query(
        r#"
        INSERT INTO properties (prop_key, text_value, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (prop_key)
        DO UPDATE SET text_value = EXCLUDED.text_value, updated_at = NOW()
        WHERE properties.text_value IS DISTINCT FROM EXCLUDED.text_value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(())
}
