use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::database::{attendance_repo, festival_repo, tent_visit_repo};
use crate::models::FestivalRow;
use crate::services::achievement_service;
use crate::services::calendar_service::parse_timezone;

#[derive(Serialize)]
pub struct AttendanceSummaryView {
    pub date: String,
    pub beer_count: i64,
    pub tents_added: usize,
}

/// Upsert the day's beer count and check in the given tents, in one
/// transaction. Re-submitting a tent already visited that day is a no-op.
pub async fn add_or_update_attendance_with_tents(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    date: &str,
    beer_count: i64,
    tent_ids: &[String],
) -> sqlx::Result<AttendanceSummaryView> {
    if beer_count < 0 {
        return Err(sqlx::Error::Protocol("beer_count cannot be negative".into()));
    }

    let Some(festival) = festival_repo::load_festival(pool, festival_id).await? else {
        return Err(sqlx::Error::RowNotFound);
    };

    let date = date.trim();
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(sqlx::Error::Protocol("date must be yyyy-MM-dd".into()));
    }
    if !date_within_festival(&festival, date) {
        return Err(sqlx::Error::Protocol(
            "date falls outside the festival".into(),
        ));
    }

    let tz = parse_timezone(&festival.timezone);
    let visited_at = visit_timestamp_for(date, tz);

    let mut tx = pool.begin().await?;

    let attendance_id = Uuid::new_v4().to_string();
    attendance_repo::upsert_attendance(
        &mut tx,
        &attendance_id,
        user_id,
        festival_id,
        date,
        beer_count,
    )
    .await?;

    let mut tents_added = 0;
    for tent_id in tent_ids {
        let tent_id = tent_id.trim();
        if tent_id.is_empty() {
            continue;
        }
        let already =
            tent_visit_repo::visited_tent_on_day(&mut tx, user_id, festival_id, tent_id, date)
                .await?;
        if already {
            continue;
        }
        let visit_id = Uuid::new_v4().to_string();
        tent_visit_repo::insert_visit(
            &mut tx,
            &visit_id,
            user_id,
            festival_id,
            tent_id,
            &visited_at,
        )
        .await?;
        tents_added += 1;
    }

    tx.commit().await?;

    // Unlocks ride along with the write; a failure here never undoes it.
    if let Err(e) = achievement_service::evaluate_for_user(pool, user_id, festival_id).await {
        warn!("Achievement evaluation failed for {}: {}", user_id, e);
    }

    Ok(AttendanceSummaryView {
        date: date.to_string(),
        beer_count,
        tents_added,
    })
}

/// Remove a day's attendance together with its tent visits.
pub async fn delete_attendance_day(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    date: &str,
) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;
    let removed =
        attendance_repo::delete_attendance(&mut tx, user_id, festival_id, date.trim()).await?;
    tent_visit_repo::delete_visits_on_day(&mut tx, user_id, festival_id, date.trim()).await?;
    tx.commit().await?;
    Ok(removed > 0)
}

fn date_within_festival(festival: &FestivalRow, date: &str) -> bool {
    // ISO dates compare correctly as strings.
    festival.start_date.as_str() <= date && date <= festival.end_date.as_str()
}

// Check-ins recorded for today carry the actual local time; backfilled days
// get pinned to local noon. Either way the stored offset keeps the local
// date recoverable from the string prefix.
fn visit_timestamp_for(date: &str, tz: Tz) -> String {
    let now_local = Utc::now().with_timezone(&tz);
    if now_local.format("%Y-%m-%d").to_string() == date {
        return now_local.to_rfc3339();
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .and_then(|naive| tz.from_local_datetime(&naive).single())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| format!("{}T12:00:00Z", date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::ensure_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_festival(pool: &SqlitePool) {
        sqlx::query(
            "INSERT INTO festivals (festival_id, name, start_date, end_date, timezone, status, is_active)
             VALUES ('f1', 'Oktoberfest 2024', '2024-09-20', '2024-10-06', 'Europe/Berlin', 'active', 1)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn upsert_replaces_the_beer_count_for_the_day() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", 3, &[])
            .await
            .unwrap();
        add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", 5, &[])
            .await
            .unwrap();

        let rows = attendance_repo::list_for_user(&pool, "u1", "f1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].beer_count, 5);
    }

    #[tokio::test]
    async fn tent_checkin_is_idempotent_per_day() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        let tents = vec!["hofbraeu".to_string()];
        let first = add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", 2, &tents)
            .await
            .unwrap();
        let second = add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", 2, &tents)
            .await
            .unwrap();

        assert_eq!(first.tents_added, 1);
        assert_eq!(second.tents_added, 0);
    }

    #[tokio::test]
    async fn rejects_negative_beer_count_and_out_of_range_dates() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        assert!(
            add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", -1, &[])
                .await
                .is_err()
        );
        assert!(
            add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-08-01", 1, &[])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn delete_removes_the_day_and_its_visits() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        let tents = vec!["hofbraeu".to_string()];
        add_or_update_attendance_with_tents(&pool, "u1", "f1", "2024-09-21", 2, &tents)
            .await
            .unwrap();

        assert!(delete_attendance_day(&pool, "u1", "f1", "2024-09-21")
            .await
            .unwrap());

        let rows = attendance_repo::list_for_user(&pool, "u1", "f1").await.unwrap();
        assert!(rows.is_empty());
        let visits = tent_visit_repo::list_for_user(&pool, "u1", "f1").await.unwrap();
        assert!(visits.is_empty());
    }
}
