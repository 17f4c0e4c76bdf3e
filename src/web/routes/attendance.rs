use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::attendance_repo;
use crate::services::attendance_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct UpsertAttendanceRequest {
    pub date: String,
    #[serde(default)]
    pub beer_count: i64,
    #[serde(default)]
    pub tent_ids: Vec<String>,
}

pub async fn list_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match attendance_repo::list_for_user(&pool, &auth_user.id, &festival_id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            warn!("Cannot list attendance: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn upsert_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<UpsertAttendanceRequest>,
) -> Response {
    match attendance_service::add_or_update_attendance_with_tents(
        &pool,
        &auth_user.id,
        &festival_id,
        &body.date,
        body.beer_count,
        &body.tent_ids,
    )
    .await
    {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            warn!("Cannot save attendance: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn delete_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((festival_id, date)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
) -> Response {
    match attendance_service::delete_attendance_day(&pool, &auth_user.id, &festival_id, &date).await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot delete attendance: {}", e);
            status_for(&e).into_response()
        }
    }
}
