use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use sqlx::SqlitePool;
use tracing::{error, warn};

use crate::database::photo_repo;

/// Streams a stored photo through the backend so clients never talk to the
/// storage service directly.
pub async fn photo_proxy(
    Path(photo_id): Path<String>,
    State(pool): State<SqlitePool>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let picture_url = match photo_repo::load_picture_url(&pool, &photo_id).await {
        Ok(Some(url)) => url,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!("Cannot load photo {}: {}", photo_id, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Absolute URLs go out as-is; relative paths resolve against storage.
    let base_url =
        std::env::var("STORAGE_API_URL").unwrap_or_else(|_| "http://localhost:8004".to_string());
    let content_url = if picture_url.starts_with("http://") || picture_url.starts_with("https://") {
        picture_url
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            picture_url.trim_start_matches('/')
        )
    };

    let token = headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .unwrap_or("")
        .split("; ")
        .find_map(|cookie| cookie.strip_prefix("access_token=").map(str::to_string));

    let client = reqwest::Client::new();
    let mut request = client.get(&content_url);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let content_resp = request.send().await.map_err(|e| {
        error!("Content request failed: {}", e);
        StatusCode::BAD_GATEWAY
    })?;

    if !content_resp.status().is_success() {
        warn!("Storage returned {} for {}", content_resp.status(), photo_id);
        return Err(StatusCode::NOT_FOUND);
    }

    let content_type = content_resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let bytes = content_resp.bytes().await.map_err(|e| {
        error!("Cannot read content body: {}", e);
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Cache-Control", "public, max-age=3600")
        .body(axum::body::Body::from(bytes))
        .unwrap())
}
