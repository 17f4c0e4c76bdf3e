use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{festival_repo, reservation_repo};
use crate::models::ReservationRow;
use crate::services::calendar_service::{local_date_key, parse_timestamp, parse_timezone};

pub struct NewReservationInput<'a> {
    pub tent_id: &'a str,
    pub start_at: &'a str,
    pub end_at: Option<&'a str>,
    pub reminder_offset_minutes: Option<i64>,
}

pub async fn create_reservation(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
    input: NewReservationInput<'_>,
) -> sqlx::Result<String> {
    let Some(festival) = festival_repo::load_festival(pool, festival_id).await? else {
        return Err(sqlx::Error::RowNotFound);
    };

    let tent_id = input.tent_id.trim();
    if tent_id.is_empty() {
        return Err(sqlx::Error::Protocol("tent_id is required".into()));
    }

    let Some(start) = parse_timestamp(Some(input.start_at)) else {
        return Err(sqlx::Error::Protocol("start_at is not a timestamp".into()));
    };

    // The reservation day must fall inside the festival window. Festival
    // days run local midnight to midnight, so the submitted instant is
    // converted to the festival timezone before comparing dates.
    let tz = parse_timezone(&festival.timezone);
    let start_date = local_date_key(start, tz);
    if start_date.as_str() < festival.start_date.as_str()
        || start_date.as_str() > festival.end_date.as_str()
    {
        return Err(sqlx::Error::Protocol(
            "reservation falls outside the festival".into(),
        ));
    }

    if let Some(raw_end) = input.end_at {
        let Some(end) = parse_timestamp(Some(raw_end)) else {
            return Err(sqlx::Error::Protocol("end_at is not a timestamp".into()));
        };
        if end <= start {
            return Err(sqlx::Error::Protocol("end_at must be after start_at".into()));
        }
    }

    if input.reminder_offset_minutes.is_some_and(|m| m < 0) {
        return Err(sqlx::Error::Protocol(
            "reminder offset cannot be negative".into(),
        ));
    }

    let reservation_id = Uuid::new_v4().to_string();
    reservation_repo::insert_reservation(
        pool,
        reservation_repo::NewReservation {
            reservation_id: &reservation_id,
            user_id,
            festival_id,
            tent_id,
            start_at: input.start_at.trim(),
            end_at: input.end_at.map(str::trim),
            reminder_offset_minutes: input.reminder_offset_minutes,
        },
    )
    .await?;

    Ok(reservation_id)
}

/// Only the owner may cancel; cancelling flips the status, it never deletes.
pub async fn cancel_reservation(
    pool: &SqlitePool,
    user_id: &str,
    reservation_id: &str,
) -> sqlx::Result<()> {
    let Some(reservation) = reservation_repo::load_reservation(pool, reservation_id).await? else {
        return Err(sqlx::Error::RowNotFound);
    };
    if reservation.user_id != user_id {
        return Err(sqlx::Error::Protocol("not your reservation".into()));
    }
    reservation_repo::set_status(pool, reservation_id, "cancelled").await?;
    Ok(())
}

pub async fn list_reservations(
    pool: &SqlitePool,
    user_id: &str,
    festival_id: &str,
) -> sqlx::Result<Vec<ReservationRow>> {
    reservation_repo::list_for_user(pool, user_id, festival_id).await
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
        sqlx::query(
            "INSERT INTO festivals (festival_id, name, start_date, end_date, timezone, status, is_active)
             VALUES ('f1', 'Oktoberfest 2024', '2024-09-20', '2024-10-06', 'Europe/Berlin', 'active', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn create_validates_the_time_window() {
        let pool = test_pool().await;

        // End before start.
        let bad = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-09-21T18:00:00+02:00",
                end_at: Some("2024-09-21T17:00:00+02:00"),
                reminder_offset_minutes: None,
            },
        )
        .await;
        assert!(bad.is_err());

        // Outside the festival window.
        let outside = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-08-01T18:00:00+02:00",
                end_at: None,
                reminder_offset_minutes: None,
            },
        )
        .await;
        assert!(outside.is_err());

        let ok = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-09-21T18:00:00+02:00",
                end_at: Some("2024-09-21T21:00:00+02:00"),
                reminder_offset_minutes: Some(30),
            },
        )
        .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn window_check_uses_the_festival_local_date() {
        let pool = test_pool().await;

        // 22:30Z on the last festival day is already Oct 7 in Berlin,
        // one day past the festival.
        let after = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-10-06T22:30:00Z",
                end_at: None,
                reminder_offset_minutes: None,
            },
        )
        .await;
        assert!(after.is_err());

        // 23:00Z the evening before the festival is already Sept 20 in
        // Berlin, the first festival day.
        let first_day = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-09-19T23:00:00Z",
                end_at: None,
                reminder_offset_minutes: None,
            },
        )
        .await;
        assert!(first_day.is_ok());
    }

    #[tokio::test]
    async fn cancel_is_owner_only_and_flips_status() {
        let pool = test_pool().await;
        let id = create_reservation(
            &pool,
            "u1",
            "f1",
            NewReservationInput {
                tent_id: "hofbraeu",
                start_at: "2024-09-21T18:00:00+02:00",
                end_at: None,
                reminder_offset_minutes: None,
            },
        )
        .await
        .unwrap();

        assert!(cancel_reservation(&pool, "u2", &id).await.is_err());
        cancel_reservation(&pool, "u1", &id).await.unwrap();

        // Cancelled reservations drop out of the active list.
        let active = list_reservations(&pool, "u1", "f1").await.unwrap();
        assert!(active.is_empty());
    }
}
