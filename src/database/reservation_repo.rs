use sqlx::SqlitePool;

use crate::models::{ReservationRow, ReservationWithTentRow};

pub struct NewReservation<'a> {
    pub reservation_id: &'a str,
    pub user_id: &'a str,
    pub festival_id: &'a str,
    pub tent_id: &'a str,
    pub start_at: &'a str,
    pub end_at: Option<&'a str>,
    pub reminder_offset_minutes: Option<i64>,
}

const SQL_INSERT_RESERVATION: &str = r#"
INSERT INTO reservations (
  reservation_id,
  user_id,
  festival_id,
  tent_id,
  start_at,
  end_at,
  reminder_offset_minutes,
  status
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active')
"#;

pub async fn insert_reservation(
    pool: &SqlitePool,
    res: NewReservation<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_RESERVATION)
        .bind(res.reservation_id)
        .bind(res.user_id)
        .bind(res.festival_id)
        .bind(res.tent_id)
        .bind(res.start_at)
        .bind(res.end_at)
        .bind(res.reminder_offset_minutes)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_RESERVATION: &str = r#"
SELECT
  reservation_id,
  user_id,
  festival_id,
  tent_id,
  start_at,
  end_at,
  reminder_offset_minutes,
  status
FROM reservations
WHERE reservation_id = ?
"#;

pub async fn load_reservation(
    pool: &SqlitePool,
    reservation_id: &str,
) -> sqlx::Result<Option<ReservationRow>> {
    sqlx::query_as::<_, ReservationRow>(SQL_LOAD_RESERVATION)
        .bind(reservation_id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_FOR_USER: &str = r#"
SELECT
  reservation_id,
  user_id,
  festival_id,
  tent_id,
  start_at,
  end_at,
  reminder_offset_minutes,
  status
FROM reservations
WHERE user_id = ? AND festival_id = ? AND status = 'active'
ORDER BY start_at ASC
"#;

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<ReservationRow>> {
    sqlx::query_as::<_, ReservationRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_WITH_TENT_FOR_USER: &str = r#"
SELECT
  r.reservation_id,
  r.user_id,
  r.start_at,
  r.end_at,
  t.name AS tent_name
FROM reservations r
LEFT JOIN tents t ON t.tent_id = r.tent_id
WHERE r.user_id = ? AND r.festival_id = ? AND r.status = 'active'
ORDER BY r.start_at ASC
"#;

pub async fn list_with_tent_for_user(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<ReservationWithTentRow>> {
    sqlx::query_as::<_, ReservationWithTentRow>(SQL_LIST_WITH_TENT_FOR_USER)
        .bind(user_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_WITH_TENT_FOR_GROUP: &str = r#"
SELECT
  r.reservation_id,
  r.user_id,
  r.start_at,
  r.end_at,
  t.name AS tent_name
FROM reservations r
LEFT JOIN tents t ON t.tent_id = r.tent_id
JOIN group_members gm ON gm.user_id = r.user_id
WHERE gm.group_id = ? AND r.festival_id = ? AND r.status = 'active'
ORDER BY r.start_at ASC
"#;

pub async fn list_with_tent_for_group(
    pool: &SqlitePool,
    group_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<ReservationWithTentRow>> {
    sqlx::query_as::<_, ReservationWithTentRow>(SQL_LIST_WITH_TENT_FOR_GROUP)
        .bind(group_id)
        .bind(festival_id)
        .fetch_all(pool)
        .await
}

const SQL_SET_STATUS: &str = r#"
UPDATE reservations
SET status = ?
WHERE reservation_id = ?
"#;

pub async fn set_status(
    pool: &SqlitePool,
    reservation_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(reservation_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
