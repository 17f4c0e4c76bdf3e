pub mod achievements;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod festivals;
pub mod gallery;
pub mod groups;
pub mod photos;
pub mod profile;
pub mod reservations;
pub mod sync;

use axum::http::StatusCode;

// Protocol errors are rule violations surfaced by the services;
// everything else is a genuine server failure.
pub(crate) fn status_for(e: &sqlx::Error) -> StatusCode {
    match e {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Protocol(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
