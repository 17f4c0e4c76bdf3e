use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize, Serialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct AuthServiceResponse {
    #[serde(rename = "success")]
    _success: bool,
    data: AuthResponse,
}

pub async fn login_handler(Json(body): Json<LoginRequest>) -> Result<Response, StatusCode> {
    let client = reqwest::Client::new();
    let base_url =
        std::env::var("AUTH_API_URL").unwrap_or_else(|_| "http://localhost:8001".to_string());

    let response = client
        .post(format!("{}/api/v1/auth/login", base_url.trim_end_matches('/')))
        .json(&json!({
            "email": body.email,
            "password": body.password,
        }))
        .send()
        .await
        .map_err(|e| {
            error!("Request to auth service failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;

    if !response.status().is_success() {
        error!("Auth service error: {}", response.status());
        return Err(StatusCode::UNAUTHORIZED);
    }

    let auth_resp = match response.json::<AuthServiceResponse>().await {
        Ok(wrapper) => wrapper.data,
        Err(e) => {
            error!("Cannot parse auth response: {}", e);
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    let mut access_cookie = Cookie::new("access_token", auth_resp.access_token.clone());
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(cookie::SameSite::Lax);

    let mut refresh_cookie = Cookie::new("refresh_token", auth_resp.refresh_token.clone());
    refresh_cookie.set_path("/");
    refresh_cookie.set_http_only(true);
    refresh_cookie.set_same_site(cookie::SameSite::Lax);

    let mut response = Json(json!({ "ok": true })).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().unwrap(),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie.to_string().parse().unwrap(),
    );

    Ok(response)
}

pub async fn logout_handler() -> Response {
    // Clear cookies
    let mut access_cookie = Cookie::new("access_token", "");
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(cookie::SameSite::Lax);

    let mut refresh_cookie = Cookie::new("refresh_token", "");
    refresh_cookie.set_path("/");
    refresh_cookie.set_http_only(true);
    refresh_cookie.set_same_site(cookie::SameSite::Lax);

    let mut response = Json(json!({ "ok": true })).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        access_cookie.to_string().parse().unwrap(),
    );
    response.headers_mut().append(
        header::SET_COOKIE,
        refresh_cookie.to_string().parse().unwrap(),
    );

    response
}
