//! Queries on the `quality_gates` table.

use qualitygate_storage::{NewQualityGate, QualityGate, StorageError};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgConnection;
use time::OffsetDateTime;

use crate::error::query_error;

type GateRow = (i64, String, bool, OffsetDateTime, OffsetDateTime);

fn from_row(row: GateRow) -> QualityGate {
    QualityGate {
        id: row.0,
        name: row.1,
        built_in: row.2,
        created_at: row.3,
        updated_at: row.4,
    }
}

/// Finds the canonical gate for `name`: built-in rows first, then lowest id.
pub async fn select_by_name(
    conn: &mut PgConnection,
    name: &str,
) -> Result<Option<QualityGate>, StorageError> {
    let row: Option<GateRow> = query_as(
        r#"
        SELECT id, name, is_built_in, created_at, updated_at
        FROM quality_gates
        WHERE name = $1
        ORDER BY is_built_in DESC, id ASC
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(row.map(from_row))
}

pub async fn select_all(conn: &mut PgConnection) -> Result<Vec<QualityGate>, StorageError> {
    let rows: Vec<GateRow> = query_as(
        r#"
        SELECT id, name, is_built_in, created_at, updated_at
        FROM quality_gates
        ORDER BY id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn insert(
    conn: &mut PgConnection,
    gate: &NewQualityGate,
) -> Result<QualityGate, StorageError> {
    let row: GateRow = query_as(
        r#"
        INSERT INTO quality_gates (name, is_built_in, created_at, updated_at)
        VALUES ($1, $2, NOW(), NOW())
        RETURNING id, name, is_built_in, created_at, updated_at
        "#,
    )
    .bind(&gate.name)
    .bind(gate.built_in)
    .fetch_one(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(from_row(row))
}

/// Flags the canonical gate for `name` as built-in and demotes every other
/// gate. Rows whose flag is already right are left untouched.
///
/// Returns the number of rows changed.
pub async fn ensure_one_built_in(
    conn: &mut PgConnection,
    name: &str,
) -> Result<u64, StorageError> {
    let result = query(
        r#"
        WITH canonical AS (
            SELECT id
            FROM quality_gates
            WHERE name = $1
            ORDER BY is_built_in DESC, id ASC
            LIMIT 1
        )
        UPDATE quality_gates
        SET is_built_in = (id IN (SELECT id FROM canonical)),
            updated_at = NOW()
        WHERE is_built_in <> (id IN (SELECT id FROM canonical))
        "#,
    )
    .bind(name)
    .execute(&mut *conn)
    .await
    .map_err(query_error)?;

    Ok(result.rows_affected())
}
