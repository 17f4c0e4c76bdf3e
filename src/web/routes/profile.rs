use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::profile_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub custom_beer_cost: Option<f64>,
}

pub async fn profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Response {
    match profile_service::load_profile(&pool, &auth_user.id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            warn!("Cannot load profile: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn update_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<UpdateProfileRequest>,
) -> Response {
    match profile_service::update_profile(
        &pool,
        &auth_user.id,
        body.username.as_deref(),
        body.full_name.as_deref(),
        body.avatar_url.as_deref(),
        body.custom_beer_cost,
    )
    .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            warn!("Cannot update profile: {}", e);
            status_for(&e).into_response()
        }
    }
}
