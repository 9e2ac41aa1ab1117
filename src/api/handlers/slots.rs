use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::SlotsQuery;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::common::{day_bounds, now_local, parse_date};
use crate::domain::models::user::{User, ROLE_COACH};
use crate::domain::services::projector::{project_available_slots, CoachSchedule};
use crate::domain::services::slots::DEFAULT_SLOT_MIN;
use crate::error::AppError;
use crate::state::AppState;

/// The member-facing booking view: bookable 1:1 slots over a date range,
/// across one or all coaches.
pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let start_date = parse_date(&query.start)?;
    let end_date = parse_date(&query.end)?;
    if end_date < start_date {
        return Err(AppError::Validation("End date must not be before start date".into()));
    }

    let coaches: Vec<User> = match &query.coach_id {
        Some(coach_id) => {
            let coach = state
                .user_repo
                .find_by_id(coach_id)
                .await?
                .ok_or(AppError::NotFound("Coach not found".into()))?;
            if coach.role != ROLE_COACH {
                return Err(AppError::Validation("User is not a coach".into()));
            }
            vec![coach]
        }
        None => state.user_repo.list_coaches().await?,
    };

    let (range_start, _) = day_bounds(start_date);
    let (_, range_end) = day_bounds(end_date);

    // Load per coach, then hand the pure projector a complete picture.
    let mut loaded = Vec::with_capacity(coaches.len());
    for coach in &coaches {
        let weekly = state.availability_repo.weekly_for_coach(&coach.id).await?;
        let blocks = state
            .availability_repo
            .blocks_in_range(&coach.id, range_start, range_end)
            .await?;
        let sessions = state
            .session_repo
            .list_in_range(Some(&coach.id), range_start, range_end, true)
            .await?;
        let default_duration = state
            .profile_repo
            .find(&coach.id)
            .await?
            .map_or(DEFAULT_SLOT_MIN, |p| p.slot_duration_min);
        loaded.push((coach, weekly, blocks, sessions, default_duration));
    }

    let schedules: Vec<CoachSchedule<'_>> = loaded
        .iter()
        .map(|(coach, weekly, blocks, sessions, default_duration)| CoachSchedule {
            coach_id: &coach.id,
            coach_name: &coach.display_name,
            weekly,
            blocks,
            sessions,
            default_duration_min: *default_duration,
        })
        .collect();

    let slots = project_available_slots(&schedules, start_date, end_date, now_local());
    Ok(Json(slots))
}
