use sqlx::SqlitePool;

use crate::models::SyncOperationRow;

pub struct NewSyncOperation<'a> {
    pub id: &'a str,
    pub table_name: &'a str,
    pub operation: &'a str, // INSERT|UPDATE|DELETE
    pub payload: &'a str,
}

const SQL_INSERT_OPERATION: &str = r#"
INSERT INTO sync_operations (id, table_name, operation, payload, status, retry_count)
VALUES (?1, ?2, ?3, ?4, 'pending', 0)
"#;

pub async fn insert_operation(
    pool: &SqlitePool,
    op: NewSyncOperation<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_OPERATION)
        .bind(op.id)
        .bind(op.table_name)
        .bind(op.operation)
        .bind(op.payload)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_OPERATION: &str = r#"
SELECT
  id,
  table_name,
  operation,
  payload,
  status,
  retry_count,
  last_error,
  created_at
FROM sync_operations
WHERE id = ?
"#;

pub async fn load_operation(
    pool: &SqlitePool,
    id: &str,
) -> sqlx::Result<Option<SyncOperationRow>> {
    sqlx::query_as::<_, SyncOperationRow>(SQL_LOAD_OPERATION)
        .bind(id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_BY_STATUS: &str = r#"
SELECT
  id,
  table_name,
  operation,
  payload,
  status,
  retry_count,
  last_error,
  created_at
FROM sync_operations
WHERE status = ?
ORDER BY created_at ASC
"#;

pub async fn list_by_status(
    pool: &SqlitePool,
    status: &str,
) -> sqlx::Result<Vec<SyncOperationRow>> {
    sqlx::query_as::<_, SyncOperationRow>(SQL_LIST_BY_STATUS)
        .bind(status)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_UNAPPLIED: &str = r#"
SELECT COUNT(*)
FROM sync_operations
WHERE status IN ('pending', 'failed')
"#;

pub async fn count_unapplied(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar(SQL_COUNT_UNAPPLIED).fetch_one(pool).await
}

const SQL_MARK_APPLIED: &str = r#"
UPDATE sync_operations
SET status = 'applied', last_error = NULL
WHERE id = ?
"#;

pub async fn mark_applied(pool: &SqlitePool, id: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_MARK_APPLIED).bind(id).execute(pool).await?;
    Ok(())
}

const SQL_MARK_FAILED: &str = r#"
UPDATE sync_operations
SET status = 'failed', retry_count = retry_count + 1, last_error = ?
WHERE id = ?
"#;

pub async fn mark_failed(pool: &SqlitePool, id: &str, error: &str) -> sqlx::Result<()> {
    sqlx::query(SQL_MARK_FAILED)
        .bind(error)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_DELETE_OPERATION: &str = r#"
DELETE FROM sync_operations
WHERE id = ?
"#;

pub async fn delete_operation(pool: &SqlitePool, id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_OPERATION)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
