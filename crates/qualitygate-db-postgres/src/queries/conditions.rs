//! Queries on the `quality_gate_conditions` table.

use qualitygate_storage::{Condition, NewCondition, Operator, StorageError};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgConnection;
use time::OffsetDateTime;
use tracing::warn;

use crate::error::query_error;

type ConditionRow = (
    i64,
    i64,
    i64,
    String,
    Option<String>,
    Option<String>,
    Option<i32>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: ConditionRow) -> Condition {
    let operator = row.3.parse::<Operator>().ok();
    if operator.is_none() {
        warn!(condition_id = row.0, operator = %row.3, "Unknown condition operator");
    }
    Condition {
        id: row.0,
        gate_id: row.1,
        metric_id: row.2,
        operator,
        warning_threshold: row.4,
        error_threshold: row.5,
        period: row.6,
        created_at: row.7,
        updated_at: row.8,
    }
}

pub async fn select_for_gate(
    conn: &mut PgConnection,
    gate_id: i64,
) -> Result<Vec<Condition>, StorageError> {
    let rows: Vec<ConditionRow> = query_as(
        r#"
        SELECT id, qgate_id, metric_id, operator, value_warning, value_error, period,
               created_at, updated_at
        FROM quality_gate_conditions
        WHERE qgate_id = $1
        ORDER BY id
        "#,
    )
    .bind(gate_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn insert(
    conn: &mut PgConnection,
    condition: &NewCondition,
) -> Result<Condition, StorageError> {
    let row: ConditionRow = query_as(
        r#"
        INSERT INTO quality_gate_conditions
            (qgate_id, metric_id, operator, value_warning, value_error, period,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
        RETURNING id, qgate_id, metric_id, operator, value_warning, value_error, period,
                  created_at, updated_at
        "#,
    )
    .bind(condition.gate_id)
    .bind(condition.metric_id)
    .bind(condition.operator.as_str())
    .bind(condition.warning_threshold.as_deref())
    .bind(condition.error_threshold.as_deref())
    .bind(condition.period)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx_core::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return StorageError::not_found("QualityGate", condition.gate_id);
        }
        query_error(e)
    })?;

    Ok(from_row(row))
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<(), StorageError> {
    let result = query("DELETE FROM quality_gate_conditions WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(query_error)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Condition", id));
    }

    Ok(())
}
