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

use crate::services::{group_service, leaderboard_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::status_for;

#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub festival_id: String,
    pub name: String,
    pub password: Option<String>,
    #[serde(default = "default_criteria")]
    pub winning_criteria: String,
    pub description: Option<String>,
}

fn default_criteria() -> String {
    "total_beers".to_string()
}

#[derive(Deserialize)]
pub struct JoinGroupRequest {
    pub festival_id: String,
    pub name: String,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCriteriaRequest {
    pub winning_criteria: String,
}

pub async fn create_group_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateGroupRequest>,
) -> Response {
    match group_service::create_group_with_member(
        &pool,
        &auth_user.id,
        &body.festival_id,
        &body.name,
        body.password.as_deref(),
        &body.winning_criteria,
        body.description.as_deref(),
    )
    .await
    {
        Ok(group_id) => (StatusCode::CREATED, Json(json!({ "group_id": group_id }))).into_response(),
        Err(e) => {
            warn!("Cannot create group: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn join_group_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<JoinGroupRequest>,
) -> Response {
    match group_service::join_group(
        &pool,
        &auth_user.id,
        &body.festival_id,
        &body.name,
        body.password.as_deref(),
    )
    .await
    {
        Ok(group_id) => Json(json!({ "group_id": group_id })).into_response(),
        Err(e) => {
            warn!("Cannot join group: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn group_detail_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(group_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match group_service::load_group_detail(&pool, &group_id).await {
        Ok(Some(view)) => Json(view).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot load group {}: {}", group_id, e);
            status_for(&e).into_response()
        }
    }
}

pub async fn leave_group_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(group_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match group_service::leave_group(&pool, &auth_user.id, &group_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot leave group {}: {}", group_id, e);
            status_for(&e).into_response()
        }
    }
}

pub async fn leaderboard_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
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

    match leaderboard_service::load_leaderboard_for_group(&pool, &group).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            warn!("Cannot build leaderboard: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn update_criteria_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(group_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<UpdateCriteriaRequest>,
) -> Response {
    match group_service::update_winning_criteria(
        &pool,
        &auth_user.id,
        &group_id,
        &body.winning_criteria,
    )
    .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("Cannot update winning criteria: {}", e);
            status_for(&e).into_response()
        }
    }
}
