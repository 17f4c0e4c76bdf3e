use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::{achievement_service, leaderboard_service, profile_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

pub async fn list_achievements_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match achievement_service::list_with_unlock_state(&pool, &auth_user.id, &festival_id).await {
        Ok(views) => Json(views).into_response(),
        Err(e) => {
            warn!("Cannot list achievements: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn festival_stats_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(festival_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    // The per-beer cost is a profile setting, so fetch it first.
    let custom_beer_cost = match profile_service::load_profile(&pool, &auth_user.id).await {
        Ok(profile) => profile.custom_beer_cost,
        Err(e) => {
            warn!("Cannot load profile for stats: {}", e);
            return status_for(&e).into_response();
        }
    };

    match leaderboard_service::load_user_stats_with_positions(
        &pool,
        &auth_user.id,
        &festival_id,
        custom_beer_cost,
    )
    .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            warn!("Cannot build festival stats: {}", e);
            status_for(&e).into_response()
        }
    }
}
