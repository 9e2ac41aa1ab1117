use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::CreateRecurringRequest;
use crate::api::dtos::responses::RecurringCancelledResponse;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::{now_local, parse_date, parse_minutes};
use crate::domain::models::recurring::{NewRecurringParams, RecurringBooking};
use crate::domain::models::user::{ROLE_COACH, ROLE_MEMBER};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a standing weekly reservation and immediately materializes its
/// sessions up to the horizon; the periodic generator keeps extending it.
pub async fn create_recurring(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateRecurringRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (coach_id, member_id) = if user.has_role(ROLE_COACH) {
        let member_id = payload
            .member_id
            .clone()
            .ok_or(AppError::Validation("member_id is required".into()))?;
        let coach_id = payload.coach_id.clone().unwrap_or_else(|| user.id.clone());
        user.require_self_or_admin(&coach_id)?;
        (coach_id, member_id)
    } else {
        user.require_role(ROLE_MEMBER)?;
        let coach_id = payload
            .coach_id
            .clone()
            .ok_or(AppError::Validation("coach_id is required".into()))?;
        (coach_id, user.id.clone())
    };

    if !(0..=6).contains(&payload.day_of_week) {
        return Err(AppError::Validation("day_of_week must be between 0 and 6".into()));
    }
    let start_min = parse_minutes(&payload.start_time)?;
    let end_min = parse_minutes(&payload.end_time)?;
    if end_min <= start_min {
        return Err(AppError::Validation("End time must be after start time".into()));
    }
    let start_date = parse_date(&payload.start_date)?;
    let end_date = payload.end_date.as_deref().map(parse_date).transpose()?;
    if let Some(end) = end_date {
        if end < start_date {
            return Err(AppError::Validation("End date must not be before start date".into()));
        }
    }

    let coach = state
        .user_repo
        .find_by_id(&coach_id)
        .await?
        .ok_or(AppError::NotFound("Coach not found".into()))?;
    if coach.role != ROLE_COACH {
        return Err(AppError::Validation("User is not a coach".into()));
    }
    state
        .user_repo
        .find_by_id(&member_id)
        .await?
        .ok_or(AppError::NotFound("Member not found".into()))?;

    let booking = RecurringBooking::new(NewRecurringParams {
        coach_id,
        member_id,
        day_of_week: payload.day_of_week,
        start_min,
        end_min,
        start_date,
        end_date,
    });
    let created = state.recurring_repo.create(&booking).await?;

    let now = now_local();
    let horizon = now.date() + Duration::weeks(state.config.generation_weeks_ahead);
    let generated = state.generator.generate_for_booking(&created, now, horizon).await?;

    info!(
        "Recurring booking {} created, {} sessions materialized",
        created.id, generated
    );
    Ok(Json(serde_json::json!({
        "booking": created,
        "generated_sessions": generated,
    })))
}

/// Cancels the standing reservation. Only future generated sessions are
/// cancelled; held sessions stay as history.
pub async fn cancel_recurring(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .recurring_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Recurring booking not found".into()))?;

    if user.id != booking.member_id {
        user.require_self_or_admin(&booking.coach_id)?;
    }

    let cancelled = state.recurring_repo.cancel_future_only(&booking_id, now_local()).await?;
    info!(
        "Recurring booking {} cancelled, {} future sessions cancelled",
        booking_id, cancelled
    );
    Ok(Json(RecurringCancelledResponse { cancelled_sessions: cancelled }))
}
