use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::{calendar_service, group_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

pub async fn personal_calendar_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match calendar_service::load_personal_calendar(&pool, &auth_user.id, &festival_id).await {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot build personal calendar: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn group_calendar_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(group_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    // The group's festival decides the timezone and date window.
    let group = match group_service::load_group(&pool, &group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot load group {}: {}", group_id, e);
            return status_for(&e).into_response();
        }
    };

    match calendar_service::load_group_calendar(&pool, &group_id, &group.festival_id).await {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot build group calendar: {}", e);
            status_for(&e).into_response()
        }
    }
}
