use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Months;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateSessionBatchRequest, CreateSessionRequest, SessionsQuery};
use crate::api::dtos::responses::BatchCreatedResponse;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::{at_minutes, day_bounds, now_local, parse_date, parse_minutes};
use crate::domain::models::room::CoachProfile;
use crate::domain::models::session::{NewSessionParams, SessionStatus, SessionType, TrainingSession};
use crate::domain::models::user::ROLE_COACH;
use crate::domain::services::generator::{expand_weekday_occurrences, AvailabilityPolicy, BatchSpec};
use crate::error::AppError;
use crate::state::AppState;

fn parse_session_type(raw: Option<&str>) -> Result<SessionType, AppError> {
    match raw.unwrap_or("ONE_TO_ONE") {
        "ONE_TO_ONE" => Ok(SessionType::OneToOne),
        "GROUP" => Ok(SessionType::Group),
        _ => Err(AppError::Validation("Invalid session_type".into())),
    }
}

fn resolve_capacity(
    session_type: SessionType,
    requested: Option<i32>,
    profile: Option<&CoachProfile>,
) -> Result<i32, AppError> {
    let capacity = match session_type {
        SessionType::OneToOne => 1,
        SessionType::Group => requested.unwrap_or_else(|| profile.map_or(8, |p| p.group_capacity)),
    };
    if capacity < 1 {
        return Err(AppError::Validation("Capacity must be at least 1".into()));
    }
    Ok(capacity)
}

fn resolve_room(
    requested: Option<String>,
    profile: Option<&CoachProfile>,
) -> Result<String, AppError> {
    requested
        .or_else(|| profile.and_then(|p| p.default_room_id.clone()))
        .ok_or(AppError::Configuration("Coach has no default room configured".into()))
}

/// A coach authoring a one-off session directly. Trusted input: no
/// availability validation beyond the `(coach, start)` uniqueness.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_COACH)?;

    let date = parse_date(&payload.date)?;
    let start_min = parse_minutes(&payload.start_time)?;
    let end_min = parse_minutes(&payload.end_time)?;
    if end_min <= start_min {
        return Err(AppError::Validation("End time must be after start time".into()));
    }
    let start = at_minutes(date, start_min);
    if start <= now_local() {
        return Err(AppError::Validation("Session must start in the future".into()));
    }

    let session_type = parse_session_type(payload.session_type.as_deref())?;
    let profile = state.profile_repo.find(&user.id).await?;
    let capacity = resolve_capacity(session_type, payload.capacity, profile.as_ref())?;
    let room_id = resolve_room(payload.room_id, profile.as_ref())?;

    let session = TrainingSession::new(NewSessionParams {
        coach_id: user.id.clone(),
        room_id,
        recurring_booking_id: None,
        title: payload.title,
        description: payload.description,
        session_type,
        capacity,
        start_time: start,
        end_time: at_minutes(date, end_min),
        is_recurring: false,
    });

    let created = state.session_repo.create(&session).await?;
    info!("Coach {} created session {}", user.id, created.id);
    Ok(Json(created))
}

/// A coach authoring a weekly series (group classes or 1:1 batches) in one
/// go. Deliberately runs under the `Trust` policy: the coach's own input is
/// not validated against blocks or the weekly template.
pub async fn create_session_batch(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateSessionBatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_COACH)?;

    if payload.weekdays.is_empty() {
        return Err(AppError::Validation("Select at least one weekday".into()));
    }
    if payload.weekdays.iter().any(|d| !(0..=6).contains(d)) {
        return Err(AppError::Validation("day_of_week must be between 0 and 6".into()));
    }

    let start_date = parse_date(&payload.start_date)?;
    let end_date = match &payload.end_date {
        Some(d) => parse_date(d)?,
        None => start_date
            .checked_add_months(Months::new(3))
            .ok_or(AppError::Validation("Invalid date range".into()))?,
    };
    if end_date < start_date {
        return Err(AppError::Validation("End date must not be before start date".into()));
    }

    let start_min = parse_minutes(&payload.start_time)?;
    let end_min = parse_minutes(&payload.end_time)?;
    if end_min <= start_min {
        return Err(AppError::Validation("End time must be after start time".into()));
    }

    let session_type = parse_session_type(payload.session_type.as_deref())?;
    let profile = state.profile_repo.find(&user.id).await?;
    let capacity = resolve_capacity(session_type, payload.capacity, profile.as_ref())?;
    let room_id = resolve_room(payload.room_id, profile.as_ref())?;

    let occurrences = expand_weekday_occurrences(
        &payload.weekdays,
        start_date,
        end_date,
        payload.frequency_weeks.unwrap_or(1),
    );

    let spec = BatchSpec {
        coach_id: user.id.clone(),
        room_id,
        recurring_booking_id: None,
        title: payload.title,
        description: payload.description,
        session_type,
        capacity,
        start_min,
        end_min,
        is_recurring: true,
    };
    let created = state
        .generator
        .materialize_occurrences(&spec, &occurrences, AvailabilityPolicy::Trust, now_local())
        .await?;

    info!("Coach {} batch-created {} sessions", user.id, created);
    Ok(Json(BatchCreatedResponse { created }))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<SessionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, _) = day_bounds(parse_date(&query.start)?);
    let (_, end) = day_bounds(parse_date(&query.end)?);

    let sessions = state
        .session_repo
        .list_in_range(query.coach_id.as_deref(), start, end, query.include_cancelled)
        .await?;
    Ok(Json(sessions))
}

async fn owned_scheduled_session(
    state: &AppState,
    user: &AuthUser,
    session_id: &str,
) -> Result<TrainingSession, AppError> {
    let session = state
        .session_repo
        .find_by_id(session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    user.require_self_or_admin(&session.coach_id)?;

    if !session.status.can_transition_to(SessionStatus::Cancelled) {
        return Err(AppError::Conflict(format!(
            "Session is already {}",
            session.status.as_str()
        )));
    }
    Ok(session)
}

/// Coach cancels a session; all confirmed bookings cascade to
/// CANCELLED_BY_COACH.
pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    owned_scheduled_session(&state, &user, &session_id).await?;

    state.session_repo.cancel_with_bookings(&session_id, now_local()).await?;
    info!("Session cancelled: {}", session_id);
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

/// Coach explicitly marks a started session as attended.
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = owned_scheduled_session(&state, &user, &session_id).await?;
    if session.start_time > now_local() {
        return Err(AppError::Validation("Session has not started yet".into()));
    }

    state.session_repo.set_status(&session_id, SessionStatus::Completed).await?;
    Ok(Json(serde_json::json!({ "status": "completed" })))
}

/// Coach marks a past session where the member did not attend.
pub async fn no_show_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = owned_scheduled_session(&state, &user, &session_id).await?;
    if session.start_time > now_local() {
        return Err(AppError::Validation("Session has not started yet".into()));
    }

    state.session_repo.set_status(&session_id, SessionStatus::NoShow).await?;
    Ok(Json(serde_json::json!({ "status": "no_show" })))
}
