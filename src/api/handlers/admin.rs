use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::GenerateSessionsRequest;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::now_local;
use crate::domain::models::user::ROLE_ADMIN;
use crate::error::AppError;
use crate::state::AppState;

/// Manual trigger for the session generator; the same entry point the
/// periodic worker uses. Safe to invoke repeatedly.
pub async fn generate_sessions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<GenerateSessionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_ADMIN)?;

    let weeks = payload.weeks_ahead.unwrap_or(state.config.generation_weeks_ahead);
    if !(1..=52).contains(&weeks) {
        return Err(AppError::Validation("weeks_ahead must be between 1 and 52".into()));
    }

    let report = state.generator.generate_all(now_local(), weeks).await?;
    info!("Manual generation run: {} sessions created", report.total_generated);
    Ok(Json(report))
}
