use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::reservation_service::{self, NewReservationInput};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub tent_id: String,
    pub start_at: String,
    pub end_at: Option<String>,
    pub reminder_offset_minutes: Option<i64>,
}

pub async fn list_reservations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match reservation_service::list_reservations(&pool, &auth_user.id, &festival_id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            warn!("Cannot list reservations: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn create_reservation_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateReservationRequest>,
) -> Response {
    let input = NewReservationInput {
        tent_id: &body.tent_id,
        start_at: &body.start_at,
        end_at: body.end_at.as_deref(),
        reminder_offset_minutes: body.reminder_offset_minutes,
    };

    match reservation_service::create_reservation(&pool, &auth_user.id, &festival_id, input).await {
        Ok(reservation_id) => (
            StatusCode::CREATED,
            Json(json!({ "reservation_id": reservation_id })),
        )
            .into_response(),
        Err(e) => {
            warn!("Cannot create reservation: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn cancel_reservation_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(reservation_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match reservation_service::cancel_reservation(&pool, &auth_user.id, &reservation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("Cannot cancel reservation {}: {}", reservation_id, e);
            status_for(&e).into_response()
        }
    }
}
