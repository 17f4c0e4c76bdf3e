use sqlx::SqlitePool;

use crate::models::FestivalRow;

const SQL_LIST_FESTIVALS: &str = r#"
SELECT
  festival_id,
  name,
  location,
  start_date,
  end_date,
  timezone,
  status,
  is_active
FROM festivals
ORDER BY start_date DESC
"#;

pub async fn list_festivals(pool: &SqlitePool) -> sqlx::Result<Vec<FestivalRow>> {
    sqlx::query_as::<_, FestivalRow>(SQL_LIST_FESTIVALS)
        .fetch_all(pool)
        .await
}

const SQL_LOAD_FESTIVAL: &str = r#"
SELECT
  festival_id,
  name,
  location,
  start_date,
  end_date,
  timezone,
  status,
  is_active
FROM festivals
WHERE festival_id = ?
"#;

pub async fn load_festival(
    pool: &SqlitePool,
    festival_id: &str,
) -> sqlx::Result<Option<FestivalRow>> {
    sqlx::query_as::<_, FestivalRow>(SQL_LOAD_FESTIVAL)
        .bind(festival_id)
        .fetch_optional(pool)
        .await
}

const SQL_LOAD_ACTIVE_FESTIVAL: &str = r#"
SELECT
  festival_id,
  name,
  location,
  start_date,
  end_date,
  timezone,
  status,
  is_active
FROM festivals
WHERE is_active = 1
ORDER BY start_date DESC
LIMIT 1
"#;

pub async fn load_active_festival(pool: &SqlitePool) -> sqlx::Result<Option<FestivalRow>> {
    sqlx::query_as::<_, FestivalRow>(SQL_LOAD_ACTIVE_FESTIVAL)
        .fetch_optional(pool)
        .await
}
