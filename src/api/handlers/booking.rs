use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::requests::CreateBookingRequest;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::{at_minutes, day_bounds, now_local, parse_date, parse_minutes};
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::session::{NewSessionParams, SessionType, TrainingSession};
use crate::domain::models::user::{ROLE_COACH, ROLE_MEMBER};
use crate::domain::services::projector::{project_available_slots, CoachSchedule};
use crate::domain::services::slots::{weekday_index, DEFAULT_SLOT_MIN};
use crate::error::AppError;
use crate::state::AppState;

/// Books a projected free 1:1 slot. The availability is recomputed for the
/// requested day at booking time, and session + booking are created in one
/// transaction; a racing request for the same slot loses on the
/// `(coach, start)` uniqueness and gets a conflict.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_MEMBER)?;

    let date = parse_date(&payload.date)?;
    let slot_min = parse_minutes(&payload.time)?;
    let start = at_minutes(date, slot_min);
    let now = now_local();

    if start <= now {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let coach = state
        .user_repo
        .find_by_id(&payload.coach_id)
        .await?
        .ok_or(AppError::NotFound("Coach not found".into()))?;
    if coach.role != ROLE_COACH {
        return Err(AppError::Validation("User is not a coach".into()));
    }

    let (day_start, day_end) = day_bounds(date);
    let weekly = state.availability_repo.weekly_for_coach(&coach.id).await?;
    let blocks = state
        .availability_repo
        .blocks_in_range(&coach.id, day_start, day_end)
        .await?;
    let sessions = state
        .session_repo
        .list_in_range(Some(&coach.id), day_start, day_end, true)
        .await?;
    let profile = state.profile_repo.find(&coach.id).await?;
    let default_duration = profile
        .as_ref()
        .map_or(DEFAULT_SLOT_MIN, |p| p.slot_duration_min);

    let schedule = CoachSchedule {
        coach_id: &coach.id,
        coach_name: &coach.display_name,
        weekly: &weekly,
        blocks: &blocks,
        sessions: &sessions,
        default_duration_min: default_duration,
    };
    let slots = project_available_slots(&[schedule], date, date, now);

    let slot = slots
        .iter()
        .find(|s| s.start_time == start)
        .ok_or_else(|| {
            warn!("Booking rejected: slot {} not available for coach {}", start, coach.id);
            AppError::Conflict("Selected time slot is not available".into())
        })?;

    let end_min = slot_min + (slot.end_time - slot.start_time).num_minutes() as i32;
    let room_id = weekly
        .iter()
        .find(|r| {
            r.day_of_week == weekday_index(date)
                && r.is_individual
                && r.start_min <= slot_min
                && end_min <= r.end_min
        })
        .and_then(|r| r.room_id.clone())
        .or_else(|| profile.as_ref().and_then(|p| p.default_room_id.clone()))
        .ok_or(AppError::Configuration("Coach has no room configured for this slot".into()))?;

    let session = TrainingSession::new(NewSessionParams {
        coach_id: coach.id.clone(),
        room_id,
        recurring_booking_id: None,
        title: None,
        description: None,
        session_type: SessionType::OneToOne,
        capacity: 1,
        start_time: slot.start_time,
        end_time: slot.end_time,
        is_recurring: false,
    });
    let booking = Booking::new(session.id.clone(), user.id.clone());

    let created = state
        .booking_repo
        .create_session_with_booking(&session, &booking)
        .await?;

    info!("Booking confirmed: {} (session {})", created.id, session.id);
    Ok(Json(created))
}

/// Joins an existing session, typically a group class. Capacity is
/// re-checked inside the insert transaction.
pub async fn book_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(ROLE_MEMBER)?;

    let session = state
        .session_repo
        .find_by_id(&session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    if session.start_time <= now_local() {
        return Err(AppError::Validation("Cannot book a session that has already started".into()));
    }

    let booking = Booking::new(session.id.clone(), user.id.clone());
    let created = state.booking_repo.create_for_session(&booking).await?;

    info!("Member {} joined session {}", user.id, session_id);
    Ok(Json(created))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let session = state
        .session_repo
        .find_by_id(&booking.session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    let now = now_local();
    let status = if user.id == booking.member_id {
        if session.start_time <= now {
            return Err(AppError::Validation("Only upcoming bookings can be cancelled".into()));
        }
        BookingStatus::CancelledByMember
    } else {
        user.require_self_or_admin(&session.coach_id)?;
        BookingStatus::CancelledByCoach
    };

    let cancelled = state.booking_repo.cancel(&booking_id, status, now).await?;
    info!("Booking cancelled: {}", booking_id);
    Ok(Json(cancelled))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_member(&user.id).await?;
    Ok(Json(bookings))
}
