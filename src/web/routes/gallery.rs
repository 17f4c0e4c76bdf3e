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

use crate::services::{gallery_service, group_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct UploadPhotoRequest {
    pub picture_url: String,
}

pub async fn upload_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<UploadPhotoRequest>,
) -> Response {
    match gallery_service::record_photo(&pool, &auth_user.id, &festival_id, &body.picture_url).await
    {
        Ok(photo_id) => (StatusCode::CREATED, Json(json!({ "photo_id": photo_id }))).into_response(),
        Err(e) => {
            warn!("Cannot record photo: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn group_gallery_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(group_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let group = match group_service::load_group(&pool, &group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot load group {}: {}", group_id, e);
            return status_for(&e).into_response();
        }
    };

    // Only members may see the group's photos.
    match crate::database::group_repo::is_member(&pool, &group_id, &auth_user.id).await {
        Ok(true) => {}
        Ok(false) => return StatusCode::FORBIDDEN.into_response(),
        Err(e) => {
            warn!("Cannot check membership: {}", e);
            return status_for(&e).into_response();
        }
    }

    match gallery_service::load_group_gallery(&pool, &group_id, &group.festival_id).await {
        Ok(days) => Json(days).into_response(),
        Err(e) => {
            warn!("Cannot build group gallery: {}", e);
            status_for(&e).into_response()
        }
    }
}
