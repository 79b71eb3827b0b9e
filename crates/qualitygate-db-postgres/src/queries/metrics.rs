//! Queries on the `metrics` table.

use qualitygate_storage::{Metric, MetricType, NewMetric, StorageError};
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgConnection;

use crate::error::query_error;

type MetricRow = (i64, String, String, String, Option<String>, bool, bool);

fn from_row(row: MetricRow) -> Result<Metric, StorageError> {
    Ok(Metric {
        id: row.0,
        key: row.1,
        short_name: row.2,
        value_type: row.3.parse::<MetricType>()?,
        domain: row.4,
        hidden: row.5,
        enabled: row.6,
    })
}

pub async fn select_by_id(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<Metric>, StorageError> {
    let row: Option<MetricRow> = query_as(
        r#"
        SELECT id, name, short_name, val_type, domain, hidden, enabled
        FROM metrics
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error)?;

    row.map(from_row).transpose()
}

pub async fn select_by_key(
    conn: &mut PgConnection,
    key: &str,
) -> Result<Option<Metric>, StorageError> {
    let row: Option<MetricRow> = query_as(
        r#"
        SELECT id, name, short_name, val_type, domain, hidden, enabled
        FROM metrics
        WHERE name = $1
        "#,
    )
    .bind(key)
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error)?;

    row.map(from_row).transpose()
}

pub async fn select_all(conn: &mut PgConnection) -> Result<Vec<Metric>, StorageError> {
    let rows: Vec<MetricRow> = query_as(
        r#"
        SELECT id, name, short_name, val_type, domain, hidden, enabled
        FROM metrics
        ORDER BY id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(query_error)?;

    rows.into_iter().map(from_row).collect()
}

pub async fn insert(conn: &mut PgConnection, metric: &NewMetric) -> Result<Metric, StorageError> {
    let row: MetricRow = query_as(
        r#"
        INSERT INTO metrics (name, short_name, val_type, domain, hidden, enabled)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING id, name, short_name, val_type, domain, hidden, enabled
        "#,
    )
    .bind(&metric.key)
    .bind(&metric.short_name)
    .bind(metric.value_type.as_str())
    .bind(metric.domain.as_deref())
    .bind(metric.hidden)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx_core::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return StorageError::already_exists("Metric", metric.key.clone());
        }
        query_error(e)
    })?;

    from_row(row)
}
