use sqlx::{SqliteConnection, SqlitePool};

use crate::models::AttendanceRow;

const SQL_LIST_FOR_USER: &str = r#"
SELECT
  attendance_id,
  user_id,
  festival_id,
  date,
  beer_count,
  created_at
FROM attendances
WHERE user_id = ? AND festival_id = ?
ORDER BY date ASC
"#;

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<AttendanceRow>> {
    sqlx::query_as::<_, AttendanceRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOR_USERS: &str = r#"
SELECT
  a.attendance_id,
  a.user_id,
  a.festival_id,
  a.date,
  a.beer_count,
  a.created_at
FROM attendances a
JOIN group_members gm ON gm.user_id = a.user_id
WHERE gm.group_id = ? AND a.festival_id = ?
ORDER BY a.date ASC
"#;

pub async fn list_for_group(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<AttendanceRow>> {
    sqlx::query_as::<_, AttendanceRow>(SQL_LIST_FOR_USERS)
        .bind(group_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_UPSERT_ATTENDANCE: &str = r#"
INSERT INTO attendances (attendance_id, user_id, festival_id, date, beer_count)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (user_id, festival_id, date)
DO UPDATE SET beer_count = excluded.beer_count
"#;

pub async fn upsert_attendance(
    conn: &mut SqliteConnection,
    attendance_id: &str,
    user_id: &str,
    festival_id: &str,
    date: &str,
    beer_count: i64,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_ATTENDANCE)
        .bind(attendance_id)
        .bind(user_id)
        .bind(festival_id)
        .bind(date)
        .bind(beer_count)
        .execute(conn)
        .await?;
    Ok(())
}

const SQL_DELETE_ATTENDANCE: &str = r#"
DELETE FROM attendances
WHERE user_id = ? AND festival_id = ? AND date = ?
"#;

pub async fn delete_attendance(
    conn: &mut SqliteConnection,
    user_id: &str,
    festival_id: &str,
    date: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_ATTENDANCE)
        .bind(user_id)
        .bind(festival_id)
        .bind(date)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
