use sqlx::SqlitePool;

use crate::models::TentRow;

const SQL_LIST_TENTS: &str = r#"
SELECT
  tent_id,
  name,
  category
FROM tents
ORDER BY name ASC
"#;

pub async fn list_tents(pool: &SqlitePool) -> sqlx::Result<Vec<TentRow>> {
    sqlx::query_as::<_, TentRow>(SQL_LIST_TENTS)
        .fetch_all(pool)
        .await
}
