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

use crate::services::sync_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct EnqueueOperationRequest {
    pub table_name: String,
    pub operation: String,
    pub payload: serde_json::Value,
}

pub async fn enqueue_operation_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<EnqueueOperationRequest>,
) -> Response {
    match sync_service::enqueue_operation(&pool, &body.table_name, &body.operation, &body.payload)
        .await
    {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "operation_id": id }))).into_response(),
        Err(e) => {
            warn!("Cannot enqueue operation: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn failed_operations_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Response {
    match sync_service::list_failed(&pool).await {
        Ok(failed) => Json(failed).into_response(),
        Err(e) => {
            warn!("Cannot list failed operations: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn pending_count_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Response {
    match sync_service::pending_count(&pool).await {
        Ok(count) => Json(json!({ "pending_count": count })).into_response(),
        Err(e) => {
            warn!("Cannot count pending operations: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn retry_operation_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(operation_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match sync_service::retry_operation(&pool, &operation_id).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!("Cannot retry operation {}: {}", operation_id, e);
            status_for(&e).into_response()
        }
    }
}

pub async fn retry_all_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Response {
    match sync_service::retry_all(&pool).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!("Cannot retry failed operations: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn dismiss_all_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Response {
    match sync_service::dismiss_all(&pool).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!("Cannot dismiss failed operations: {}", e);
            status_for(&e).into_response()
        }
    }
}
