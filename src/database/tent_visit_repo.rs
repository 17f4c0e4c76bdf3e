use sqlx::{SqliteConnection, SqlitePool};

use crate::models::TentVisitWithTentRow;

const SQL_LIST_FOR_USER: &str = r#"
SELECT
  v.visit_id,
  v.user_id,
  v.visited_at,
  t.name AS tent_name
FROM tent_visits v
LEFT JOIN tents t ON t.tent_id = v.tent_id
WHERE v.user_id = ? AND v.festival_id = ?
ORDER BY v.visited_at ASC
"#;

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<TentVisitWithTentRow>> {
    sqlx::query_as::<_, TentVisitWithTentRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOR_GROUP: &str = r#"
SELECT
  v.visit_id,
  v.user_id,
  v.visited_at,
  t.name AS tent_name
FROM tent_visits v
LEFT JOIN tents t ON t.tent_id = v.tent_id
JOIN group_members gm ON gm.user_id = v.user_id
WHERE gm.group_id = ? AND v.festival_id = ?
ORDER BY v.visited_at ASC
"#;

pub async fn list_for_group(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<TentVisitWithTentRow>> {
    sqlx::query_as::<_, TentVisitWithTentRow>(SQL_LIST_FOR_GROUP)
        .bind(group_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_COUNT_FOR_TENT_ON_DAY: &str = r#"
SELECT COUNT(*)
FROM tent_visits
WHERE user_id = ?
  AND festival_id = ?
  AND tent_id = ?
  AND substr(visited_at, 1, 10) = ?
"#;

pub async fn visited_tent_on_day(
    conn: &mut SqliteConnection,
    user_id: &str,
    festival_id: &str,
    tent_id: &str,
    date: &str,
) -> sqlx::Result<bool> {
    let count: i64 = sqlx::query_scalar(SQL_COUNT_FOR_TENT_ON_DAY)
        .bind(user_id)
        .bind(festival_id)
        .bind(tent_id)
        .bind(date)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

const SQL_INSERT_VISIT: &str = r#"
INSERT INTO tent_visits (visit_id, user_id, festival_id, tent_id, visited_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_visit(
    conn: &mut SqliteConnection,
    visit_id: &str,
    user_id: &str,
    festival_id: &str,
    tent_id: &str,
    visited_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_VISIT)
        .bind(visit_id)
        .bind(user_id)
        .bind(festival_id)
        .bind(tent_id)
        .bind(visited_at)
        .execute(conn)
        .await?;
    Ok(())
}

const SQL_DELETE_VISIT: &str = r#"
DELETE FROM tent_visits
WHERE visit_id = ?
"#;

pub async fn delete_visit(conn: &mut SqliteConnection, visit_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_VISIT)
        .bind(visit_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_VISITS_ON_DAY: &str = r#"
DELETE FROM tent_visits
WHERE user_id = ?
  AND festival_id = ?
  AND substr(visited_at, 1, 10) = ?
"#;

pub async fn delete_visits_on_day(
    conn: &mut SqliteConnection,
    user_id: &str,
    festival_id: &str,
    date: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_VISITS_ON_DAY)
        .bind(user_id)
        .bind(festival_id)
        .bind(date)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
