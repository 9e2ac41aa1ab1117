use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};
use tracing::info;

use crate::api::dtos::requests::LoginRequest;
use crate::api::dtos::responses::LoginResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_repo
        .find_by_username(&payload.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|_| AppError::Internal)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)?;

    let (access_token, csrf_token) = state.auth_service.issue_tokens(&user)?;

    let cookie = Cookie::build(("access_token", access_token))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);

    info!("User logged in: {}", user.id);

    Ok(Json(LoginResponse {
        csrf_token,
        user_id: user.id,
        display_name: user.display_name,
        role: user.role,
    }))
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    let mut cookie = Cookie::new("access_token", "");
    cookie.set_path("/");
    cookies.remove(cookie);
    Json(serde_json::json!({ "status": "logged_out" }))
}
