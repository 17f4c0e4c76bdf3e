use sqlx::SqlitePool;

// Single-row table holding the locally selected user, written by the
// device during setup. Only the auth fallback reads it.
const SQL_CURRENT_USER_ID: &str = r#"
SELECT user_id FROM current_user LIMIT 1
"#;

pub async fn load_current_user_id(pool: &SqlitePool) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar(SQL_CURRENT_USER_ID)
        .fetch_optional(pool)
        .await
}
