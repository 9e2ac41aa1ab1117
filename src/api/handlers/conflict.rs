use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::now_local;
use crate::domain::models::availability::AvailabilityAddition;
use crate::domain::models::session::{SessionType, TrainingSession};
use crate::domain::services::conflicts::{find_conflicts, session_outside_availability};
use crate::error::AppError;
use crate::state::AppState;

/// Scheduled sessions that no longer fit the coach's current weekly
/// template (the coach edited their schedule after the sessions existed).
pub async fn list_conflicts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(coach_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_self_or_admin(&coach_id)?;

    let sessions = state.session_repo.list_scheduled_for_coach(&coach_id).await?;
    if sessions.is_empty() {
        return Ok(Json(Vec::<TrainingSession>::new()));
    }
    let weekly = state.availability_repo.weekly_for_coach(&coach_id).await?;
    let range_start = sessions.iter().map(|s| s.start_time).min().unwrap();
    let range_end = sessions.iter().map(|s| s.end_time).max().unwrap();
    let additions = state
        .availability_repo
        .additions_in_range(&coach_id, range_start, range_end)
        .await?;

    Ok(Json(find_conflicts(sessions, &weekly, &additions)))
}

/// Resolution 1: absorb the session back into allowed availability by
/// creating an addition covering exactly its interval.
pub async fn resolve_keep_exception(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .session_repo
        .find_by_id(&session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    user.require_self_or_admin(&session.coach_id)?;

    let weekly = state.availability_repo.weekly_for_coach(&session.coach_id).await?;
    let additions = state
        .availability_repo
        .additions_in_range(&session.coach_id, session.start_time, session.end_time)
        .await?;
    if !session_outside_availability(&session, &weekly, &additions) {
        return Err(AppError::Conflict("Session does not conflict with availability".into()));
    }

    let mut addition = AvailabilityAddition::new(
        session.coach_id.clone(),
        session.start_time,
        session.end_time,
    );
    addition.is_individual = session.session_type == SessionType::OneToOne;
    addition.is_group = session.session_type == SessionType::Group;
    addition.room_id = Some(session.room_id.clone());
    addition.reason = Some("Kept existing session as exception".into());

    let created = state.availability_repo.create_addition(&addition).await?;
    info!("Conflict on session {} resolved as exception {}", session_id, created.id);
    Ok(Json(created))
}

/// Resolution 2: cancel the session, cascading to its bookings.
pub async fn resolve_cancel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .session_repo
        .find_by_id(&session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    user.require_self_or_admin(&session.coach_id)?;

    state.session_repo.cancel_with_bookings(&session_id, now_local()).await?;
    info!("Conflict on session {} resolved by cancellation", session_id);
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}
