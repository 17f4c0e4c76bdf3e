use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::database::{festival_repo, sync_queue_repo, tent_visit_repo};
use crate::models::SyncOperationRow;
use crate::services::calendar_service::parse_timezone;
use crate::services::{attendance_service, reservation_service};

#[derive(Debug, Clone, Serialize)]
pub struct FailedOperationView {
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub last_error: Option<String>,
    pub retry_count: i64,
}

#[derive(Serialize)]
pub struct SyncStatusView {
    pub failed: Vec<FailedOperationView>,
    pub pending_count: i64,
}

pub async fn enqueue_operation(
    pool: &SqlitePool,
    table_name: &str,
    operation: &str,
    payload: &serde_json::Value,
) -> sqlx::Result<String> {
    let operation = operation.trim().to_uppercase();
    if operation != "INSERT" && operation != "UPDATE" && operation != "DELETE" {
        return Err(sqlx::Error::Protocol("unknown operation".into()));
    }

    let id = Uuid::new_v4().to_string();
    sync_queue_repo::insert_operation(
        pool,
        sync_queue_repo::NewSyncOperation {
            id: &id,
            table_name: table_name.trim(),
            operation: &operation,
            payload: &payload.to_string(),
        },
    )
    .await?;
    Ok(id)
}

pub async fn list_failed(pool: &SqlitePool) -> sqlx::Result<Vec<FailedOperationView>> {
    let rows = sync_queue_repo::list_by_status(pool, "failed").await?;
    Ok(rows.into_iter().map(failed_view).collect())
}

pub async fn pending_count(pool: &SqlitePool) -> sqlx::Result<i64> {
    sync_queue_repo::count_unapplied(pool).await
}

/// Retry one operation, then run a full sync pass, then report the fresh
/// failed list and pending count. The order matters: the caller must never
/// see a retried operation next to a stale pending count.
pub async fn retry_operation(pool: &SqlitePool, id: &str) -> sqlx::Result<SyncStatusView> {
    let Some(op) = sync_queue_repo::load_operation(pool, id).await? else {
        return Err(sqlx::Error::RowNotFound);
    };

    attempt(pool, &op).await?;
    sync_pass(pool).await?;
    status(pool).await
}

/// Retry every currently-failed operation once. The snapshot is taken up
/// front: an operation failing again mid-pass is not re-attempted, and one
/// failure never aborts the rest.
pub async fn retry_all(pool: &SqlitePool) -> sqlx::Result<SyncStatusView> {
    let snapshot = sync_queue_repo::list_by_status(pool, "failed").await?;
    for op in &snapshot {
        if let Err(e) = attempt(pool, op).await {
            warn!("Retry of sync operation {} errored: {}", op.id, e);
        }
    }
    sync_pass(pool).await?;
    status(pool).await
}

/// Drop every currently-failed operation. Same snapshot semantics as
/// retry_all.
pub async fn dismiss_all(pool: &SqlitePool) -> sqlx::Result<SyncStatusView> {
    let snapshot = sync_queue_repo::list_by_status(pool, "failed").await?;
    for op in &snapshot {
        if let Err(e) = sync_queue_repo::delete_operation(pool, &op.id).await {
            warn!("Dismiss of sync operation {} errored: {}", op.id, e);
        }
    }
    status(pool).await
}

/// Apply all pending operations in queue order.
pub async fn sync_pass(pool: &SqlitePool) -> sqlx::Result<()> {
    let pending = sync_queue_repo::list_by_status(pool, "pending").await?;
    for op in &pending {
        attempt(pool, op).await?;
    }
    Ok(())
}

async fn status(pool: &SqlitePool) -> sqlx::Result<SyncStatusView> {
    let failed = list_failed(pool).await?;
    let pending_count = pending_count(pool).await?;
    Ok(SyncStatusView {
        failed,
        pending_count,
    })
}

// Bookkeeping errors propagate; application errors land on the row.
async fn attempt(pool: &SqlitePool, op: &SyncOperationRow) -> sqlx::Result<()> {
    match apply_operation(pool, op).await {
        Ok(()) => sync_queue_repo::mark_applied(pool, &op.id).await,
        Err(reason) => sync_queue_repo::mark_failed(pool, &op.id, &reason).await,
    }
}

#[derive(Deserialize)]
struct AttendancePayload {
    user_id: String,
    festival_id: String,
    date: String,
    #[serde(default)]
    beer_count: i64,
    #[serde(default)]
    tent_ids: Vec<String>,
}

#[derive(Deserialize)]
struct TentVisitPayload {
    #[serde(default)]
    visit_id: Option<String>,
    user_id: Option<String>,
    festival_id: Option<String>,
    tent_id: Option<String>,
    visited_at: Option<String>,
}

#[derive(Deserialize)]
struct ReservationPayload {
    #[serde(default)]
    reservation_id: Option<String>,
    user_id: String,
    #[serde(default)]
    festival_id: Option<String>,
    #[serde(default)]
    tent_id: Option<String>,
    #[serde(default)]
    start_at: Option<String>,
    #[serde(default)]
    end_at: Option<String>,
    #[serde(default)]
    reminder_offset_minutes: Option<i64>,
}

async fn apply_operation(pool: &SqlitePool, op: &SyncOperationRow) -> Result<(), String> {
    match op.table_name.as_str() {
        "attendances" => apply_attendance(pool, op).await,
        "tent_visits" => apply_tent_visit(pool, op).await,
        "reservations" => apply_reservation(pool, op).await,
        other => Err(format!("unknown table '{}'", other)),
    }
}

async fn apply_attendance(pool: &SqlitePool, op: &SyncOperationRow) -> Result<(), String> {
    let payload: AttendancePayload =
        serde_json::from_str(&op.payload).map_err(|e| format!("bad payload: {}", e))?;

    match op.operation.as_str() {
        "INSERT" | "UPDATE" => attendance_service::add_or_update_attendance_with_tents(
            pool,
            &payload.user_id,
            &payload.festival_id,
            &payload.date,
            payload.beer_count,
            &payload.tent_ids,
        )
        .await
        .map(|_| ())
        .map_err(|e| e.to_string()),
        "DELETE" => attendance_service::delete_attendance_day(
            pool,
            &payload.user_id,
            &payload.festival_id,
            &payload.date,
        )
        .await
        .map(|_| ())
        .map_err(|e| e.to_string()),
        other => Err(format!("unknown operation '{}'", other)),
    }
}

async fn apply_tent_visit(pool: &SqlitePool, op: &SyncOperationRow) -> Result<(), String> {
    let payload: TentVisitPayload =
        serde_json::from_str(&op.payload).map_err(|e| format!("bad payload: {}", e))?;

    match op.operation.as_str() {
        "INSERT" => {
            let (Some(user_id), Some(festival_id), Some(tent_id)) = (
                payload.user_id.as_deref(),
                payload.festival_id.as_deref(),
                payload.tent_id.as_deref(),
            ) else {
                return Err("tent visit payload is incomplete".to_string());
            };
            let visit_id = payload
                .visit_id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            // Visits are stored with the festival's offset so the
            // SQL-side substr(visited_at, 1, 10) checks see the
            // festival-local date.
            let visited_at = match payload.visited_at {
                Some(at) => at,
                None => {
                    let festival = festival_repo::load_festival(pool, festival_id)
                        .await
                        .map_err(|e| e.to_string())?
                        .ok_or_else(|| format!("unknown festival '{}'", festival_id))?;
                    let tz = parse_timezone(&festival.timezone);
                    chrono::Utc::now().with_timezone(&tz).to_rfc3339()
                }
            };
            let mut conn = pool.acquire().await.map_err(|e| e.to_string())?;
            tent_visit_repo::insert_visit(
                &mut conn,
                &visit_id,
                user_id,
                festival_id,
                tent_id,
                &visited_at,
            )
            .await
            .map_err(|e| e.to_string())
        }
        "DELETE" => {
            let Some(visit_id) = payload.visit_id.as_deref() else {
                return Err("visit_id is required for delete".to_string());
            };
            let mut conn = pool.acquire().await.map_err(|e| e.to_string())?;
            tent_visit_repo::delete_visit(&mut conn, visit_id)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        other => Err(format!("unsupported operation '{}' for tent_visits", other)),
    }
}

async fn apply_reservation(pool: &SqlitePool, op: &SyncOperationRow) -> Result<(), String> {
    let payload: ReservationPayload =
        serde_json::from_str(&op.payload).map_err(|e| format!("bad payload: {}", e))?;

    match op.operation.as_str() {
        "INSERT" => {
            let (Some(festival_id), Some(tent_id), Some(start_at)) = (
                payload.festival_id.as_deref(),
                payload.tent_id.as_deref(),
                payload.start_at.as_deref(),
            ) else {
                return Err("reservation payload is incomplete".to_string());
            };
            reservation_service::create_reservation(
                pool,
                &payload.user_id,
                festival_id,
                reservation_service::NewReservationInput {
                    tent_id,
                    start_at,
                    end_at: payload.end_at.as_deref(),
                    reminder_offset_minutes: payload.reminder_offset_minutes,
                },
            )
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
        }
        "UPDATE" | "DELETE" => {
            let Some(reservation_id) = payload.reservation_id.as_deref() else {
                return Err("reservation_id is required".to_string());
            };
            reservation_service::cancel_reservation(pool, &payload.user_id, reservation_id)
                .await
                .map_err(|e| e.to_string())
        }
        other => Err(format!("unknown operation '{}'", other)),
    }
}

fn failed_view(row: SyncOperationRow) -> FailedOperationView {
    FailedOperationView {
        id: row.id,
        table_name: row.table_name,
        operation: row.operation,
        last_error: row.last_error,
        retry_count: row.retry_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use serde_json::json;
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

    fn attendance_payload(date: &str) -> serde_json::Value {
        json!({
            "user_id": "u1",
            "festival_id": "f1",
            "date": date,
            "beer_count": 2,
            "tent_ids": [],
        })
    }

    #[tokio::test]
    async fn sync_pass_applies_pending_operations() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        enqueue_operation(&pool, "attendances", "INSERT", &attendance_payload("2024-09-21"))
            .await
            .unwrap();

        sync_pass(&pool).await.unwrap();

        assert_eq!(pending_count(&pool).await.unwrap(), 0);
        assert!(list_failed(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_operations_carry_the_error_and_retry_count() {
        let pool = test_pool().await;
        // No festival seeded: the attendance apply fails.

        enqueue_operation(&pool, "attendances", "INSERT", &attendance_payload("2024-09-21"))
            .await
            .unwrap();
        sync_pass(&pool).await.unwrap();

        let failed = list_failed(&pool).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].retry_count, 1);
        assert!(failed[0].last_error.is_some());
        assert_eq!(pending_count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn retry_refreshes_list_and_count_after_the_sync_pass() {
        let pool = test_pool().await;

        let id = enqueue_operation(
            &pool,
            "attendances",
            "INSERT",
            &attendance_payload("2024-09-21"),
        )
        .await
        .unwrap();
        sync_pass(&pool).await.unwrap();
        assert_eq!(list_failed(&pool).await.unwrap().len(), 1);

        // The festival appearing fixes the underlying failure.
        seed_festival(&pool).await;

        let status = retry_operation(&pool, &id).await.unwrap();
        assert!(status.failed.is_empty());
        assert_eq!(status.pending_count, 0);
    }

    #[tokio::test]
    async fn retry_all_attempts_every_operation_despite_failures() {
        let pool = test_pool().await;

        // Three failures: two fixable attendance writes around one
        // permanently broken unknown-table operation.
        let ok_a = enqueue_operation(
            &pool,
            "attendances",
            "INSERT",
            &attendance_payload("2024-09-21"),
        )
        .await
        .unwrap();
        let broken = enqueue_operation(&pool, "nonsense", "INSERT", &json!({}))
            .await
            .unwrap();
        let ok_b = enqueue_operation(
            &pool,
            "attendances",
            "INSERT",
            &attendance_payload("2024-09-22"),
        )
        .await
        .unwrap();

        sync_pass(&pool).await.unwrap();
        assert_eq!(list_failed(&pool).await.unwrap().len(), 3);

        seed_festival(&pool).await;
        let status = retry_all(&pool).await.unwrap();

        // The broken one was attempted (retry_count went up) but the two
        // fixable ones around it still succeeded.
        assert_eq!(status.failed.len(), 1);
        assert_eq!(status.failed[0].id, broken);
        assert_eq!(status.failed[0].retry_count, 2);
        assert_eq!(status.pending_count, 1);

        let applied_a = sync_queue_repo::load_operation(&pool, &ok_a).await.unwrap().unwrap();
        let applied_b = sync_queue_repo::load_operation(&pool, &ok_b).await.unwrap().unwrap();
        assert_eq!(applied_a.status, "applied");
        assert_eq!(applied_b.status, "applied");
    }

    #[tokio::test]
    async fn synced_visit_without_timestamp_lands_on_the_festival_local_day() {
        let pool = test_pool().await;
        seed_festival(&pool).await;

        enqueue_operation(
            &pool,
            "tent_visits",
            "INSERT",
            &json!({
                "user_id": "u1",
                "festival_id": "f1",
                "tent_id": "hofbraeu",
            }),
        )
        .await
        .unwrap();
        sync_pass(&pool).await.unwrap();
        assert!(list_failed(&pool).await.unwrap().is_empty());

        let visited_at: String =
            sqlx::query_scalar("SELECT visited_at FROM tent_visits WHERE user_id = 'u1'")
                .fetch_one(&pool)
                .await
                .unwrap();

        // Stored with the festival's offset, never a bare Z instant, so
        // the string prefix is the Berlin-local date.
        assert!(!visited_at.ends_with('Z'), "got {}", visited_at);
        let berlin: chrono_tz::Tz = "Europe/Berlin".parse().unwrap();
        let local_today = chrono::Utc::now()
            .with_timezone(&berlin)
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(&visited_at[..10], local_today);
    }

    #[tokio::test]
    async fn dismiss_all_clears_the_failed_set() {
        let pool = test_pool().await;

        enqueue_operation(&pool, "nonsense", "INSERT", &json!({}))
            .await
            .unwrap();
        sync_pass(&pool).await.unwrap();
        assert_eq!(list_failed(&pool).await.unwrap().len(), 1);

        let status = dismiss_all(&pool).await.unwrap();
        assert!(status.failed.is_empty());
        assert_eq!(status.pending_count, 0);
    }

    #[tokio::test]
    async fn rejects_unknown_operations_at_enqueue() {
        let pool = test_pool().await;
        assert!(enqueue_operation(&pool, "attendances", "MERGE", &json!({}))
            .await
            .is_err());
    }
}
