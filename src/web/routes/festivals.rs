use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::{festival_repo, tent_repo};
use crate::web::routes::status_for;

pub async fn list_festivals_handler(State(pool): State<SqlitePool>) -> Response {
    match festival_repo::list_festivals(&pool).await {
        Ok(festivals) => Json(festivals).into_response(),
        Err(e) => {
            warn!("Cannot list festivals: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn list_tents_handler(State(pool): State<SqlitePool>) -> Response {
    match tent_repo::list_tents(&pool).await {
        Ok(tents) => Json(tents).into_response(),
        Err(e) => {
            warn!("Cannot list tents: {}", e);
            status_for(&e).into_response()
        }
    }
}

pub async fn active_festival_handler(State(pool): State<SqlitePool>) -> Response {
    match festival_repo::load_active_festival(&pool).await {
        Ok(Some(festival)) => Json(festival).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Cannot load active festival: {}", e);
            status_for(&e).into_response()
        }
    }
}
